//! Provider: handler registration and dispatch.
//!
//! - [`data_source_router`], [`data_source_trunk`] - read-only lookups
//! - [`resource_subnetpool`] - managed subnet pools
//! - [`helpers`] - region, tags and flattening shared by handlers
//! - [`wait`] - polling until a remote object reaches a state

mod data_source_router;
mod data_source_trunk;
pub mod helpers;
mod resource_subnetpool;
pub mod wait;

pub use data_source_router::RouterDataSource;
pub use data_source_trunk::TrunkDataSource;
pub use resource_subnetpool::{SubnetPoolResource, Timeouts};

use crate::config::Config;
use crate::diag::Diagnostics;
use crate::diag_error;
use crate::schema::{ResourceData, Schema};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub const ROUTER_DATA_SOURCE: &str = "openstack_networking_router_v2";
pub const TRUNK_DATA_SOURCE: &str = "openstack_networking_trunk_v2";
pub const SUBNETPOOL_RESOURCE: &str = "openstack_networking_subnetpool_v2";

/// State produced by a handler.
pub type State = Map<String, Value>;

/// Read-only lookup.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn schema(&self) -> Schema;

    async fn read(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics>;
}

/// Managed remote object.
#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> Schema;

    async fn create(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics>;

    /// Refresh state; clears the id when the object no longer exists.
    async fn read(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics>;

    async fn update(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics>;

    async fn delete(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics>;

    /// Populate state from an id alone.
    async fn import(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        self.read(d, config).await
    }
}

pub struct Provider {
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Default for Provider {
    fn default() -> Self {
        Provider::new()
    }
}

impl Provider {
    pub fn new() -> Provider {
        Provider {
            data_sources: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
        .with_data_source(ROUTER_DATA_SOURCE, RouterDataSource)
        .with_data_source(TRUNK_DATA_SOURCE, TrunkDataSource)
        .with_resource(SUBNETPOOL_RESOURCE, SubnetPoolResource::default())
    }

    /// Register or replace a data source.
    pub fn with_data_source(mut self, name: &'static str, ds: impl DataSource + 'static) -> Provider {
        self.data_sources.insert(name, Box::new(ds));
        self
    }

    /// Register or replace a resource.
    pub fn with_resource(mut self, name: &'static str, resource: impl Resource + 'static) -> Provider {
        self.resources.insert(name, Box::new(resource));
        self
    }

    pub fn data_source_names(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    pub fn resource_names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Schema of a data source or resource by name.
    pub fn schema(&self, name: &str) -> Option<Schema> {
        self.data_sources
            .get(name)
            .map(|ds| ds.schema())
            .or_else(|| self.resources.get(name).map(|r| r.schema()))
    }

    /// Every schema, grouped by kind.
    pub fn schemas(&self) -> Value {
        let describe = |schemas: Vec<(&str, Schema)>| -> Map<String, Value> {
            schemas
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema.describe()))
                .collect()
        };
        json!({
            "data_sources": describe(self.data_sources.iter().map(|(n, ds)| (*n, ds.schema())).collect()),
            "resources": describe(self.resources.iter().map(|(n, r)| (*n, r.schema())).collect()),
        })
    }

    fn data_source(&self, name: &str) -> Result<&dyn DataSource, Diagnostics> {
        self.data_sources
            .get(name)
            .map(|ds| ds.as_ref())
            .ok_or_else(|| diag_error!("Unknown data source \"{name}\""))
    }

    fn resource(&self, name: &str) -> Result<&dyn Resource, Diagnostics> {
        self.resources
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| diag_error!("Unknown resource \"{name}\""))
    }

    /// Validate `attrs` and run a data source read.
    pub async fn read_data_source(
        &self,
        name: &str,
        config: &Config,
        attrs: Map<String, Value>,
    ) -> Result<State, Diagnostics> {
        let ds = self.data_source(name)?;
        let schema = ds.schema();
        schema.validate_config(&attrs).into_result()?;

        let mut d = ResourceData::new(schema, attrs);
        ds.read(&mut d, config).await?;
        log::info!("Read {name} {}", d.id());
        Ok(d.state())
    }

    /// Create the resource, or update it in place when `prior` state is given.
    ///
    /// A change to a force-new attribute of an existing resource is rejected;
    /// destroy it first.
    pub async fn apply(
        &self,
        name: &str,
        config: &Config,
        attrs: Map<String, Value>,
        prior: Option<State>,
    ) -> Result<State, Diagnostics> {
        let resource = self.resource(name)?;
        let schema = resource.schema();
        schema.validate_config(&attrs).into_result()?;

        let existing = prior.filter(|p| p.get("id").and_then(Value::as_str).is_some_and(|id| !id.is_empty()));
        let Some(prior) = existing else {
            let mut d = ResourceData::new(schema, attrs);
            resource.create(&mut d, config).await?;
            return Ok(d.state());
        };

        let mut d = ResourceData::from_state(schema, prior, attrs);
        let mut diags = Diagnostics::new();
        for (attr_name, attr) in d.schema().iter() {
            if attr.force_new && d.has_change(attr_name) {
                diags.attribute_error(
                    attr_name,
                    format!("Changing this attribute requires replacing {name} {}", d.id()),
                );
            }
        }
        diags.into_result()?;

        resource.update(&mut d, config).await?;
        if d.id().is_empty() {
            return Err(diag_error!("{name} vanished during update"));
        }
        Ok(d.state())
    }

    /// Refresh existing state; `None` when the object is gone.
    pub async fn read_resource(
        &self,
        name: &str,
        config: &Config,
        state: State,
    ) -> Result<Option<State>, Diagnostics> {
        let resource = self.resource(name)?;
        let mut d = ResourceData::from_prior(resource.schema(), state);
        resource.read(&mut d, config).await?;
        if d.id().is_empty() {
            return Ok(None);
        }
        Ok(Some(d.state()))
    }

    pub async fn destroy(&self, name: &str, config: &Config, state: State) -> Result<(), Diagnostics> {
        let resource = self.resource(name)?;
        let mut d = ResourceData::from_prior(resource.schema(), state);
        if d.id().is_empty() {
            return Err(diag_error!("No id in state for {name}"));
        }
        resource.delete(&mut d, config).await
    }

    pub async fn import(&self, name: &str, config: &Config, id: &str) -> Result<State, Diagnostics> {
        let resource = self.resource(name)?;
        let mut d = ResourceData::from_id(resource.schema(), id);
        resource.import(&mut d, config).await?;
        if d.id().is_empty() {
            return Err(Diagnostics::error_with_detail(
                "Cannot import non-existent remote object",
                format!("The {name} {id} does not exist"),
            ));
        }
        Ok(d.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_names() {
        let provider = Provider::new();
        assert_eq!(
            provider.data_source_names(),
            vec![ROUTER_DATA_SOURCE, TRUNK_DATA_SOURCE]
        );
        assert_eq!(provider.resource_names(), vec![SUBNETPOOL_RESOURCE]);
        assert!(provider.schema("openstack_networking_port_v2").is_none());
    }

    #[test]
    fn test_schemas() {
        let schemas = Provider::new().schemas();
        let router = &schemas["data_sources"][ROUTER_DATA_SOURCE];
        assert_eq!(router["external_fixed_ip"]["block"]["subnet_id"]["computed"], true);
        let pool = &schemas["resources"][SUBNETPOOL_RESOURCE];
        assert_eq!(pool["prefixes"]["required"], true);
        assert_eq!(pool["value_specs"]["force_new"], true);
    }

    #[test]
    fn test_force_new_attributes() {
        let schema = Provider::new().schema(SUBNETPOOL_RESOURCE).unwrap();
        let force_new: Vec<&str> = schema
            .iter()
            .filter(|(_, a)| a.force_new)
            .map(|(n, _)| n)
            .collect();
        assert_eq!(force_new, vec!["project_id", "region", "shared", "value_specs"]);
    }
}
