//! `openstack_networking_subnetpool_v2` resource.

use super::helpers::{
    check_deleted, get_region, networking_v2_attributes_tags, networking_v2_read_attributes_tags,
};
use super::wait::{StateChangeConf, DEFAULT_TIMEOUT};
use super::Resource;
use crate::config::Config;
use crate::diag::Diagnostics;
use crate::diag_error;
use crate::models::{max_prefix_len, Cidr, SubnetPool};
use crate::openstack::subnetpools::{self, CreateOpts, UpdateOpts};
use crate::openstack::{tags, ApiError, NetworkingClient};
use crate::schema::{validate_cidr, Attribute, AttributeType, ResourceData, Schema, SetError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

const RESOURCE_NAME: &str = "openstack_networking_subnetpool_v2";

/// How long create, update and delete may take, and how often to poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
    pub delay: Duration,
    pub min_timeout: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            create: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
            delay: Duration::from_secs(5),
            min_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Default)]
pub struct SubnetPoolResource {
    timeouts: Timeouts,
}

impl SubnetPoolResource {
    pub fn with_timeouts(timeouts: Timeouts) -> SubnetPoolResource {
        SubnetPoolResource { timeouts }
    }

    fn state_change(&self, pending: Vec<&'static str>, target: Vec<&'static str>, timeout: Duration) -> StateChangeConf {
        StateChangeConf {
            pending,
            target,
            timeout,
            delay: self.timeouts.delay,
            min_timeout: self.timeouts.min_timeout,
        }
    }
}

/// `ACTIVE` while the pool can be read, `DELETED` once it is gone.
async fn subnetpool_state(
    client: &NetworkingClient,
    id: &str,
) -> Result<(Option<SubnetPool>, String), ApiError> {
    match subnetpools::get(client, id).await {
        Ok(pool) => Ok((Some(pool), "ACTIVE".to_string())),
        Err(e) if e.is_not_found() => {
            log::debug!("{RESOURCE_NAME} {id} is gone");
            Ok((None, "DELETED".to_string()))
        }
        Err(e) => Err(e),
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn optional_int(d: &ResourceData, key: &str) -> Option<i64> {
    d.get_ok(key).and_then(|v| v.as_i64())
}

/// Prefixes share one IP version and the configured lengths fit it.
fn check_prefix_lengths(d: &ResourceData) -> Result<(), Diagnostics> {
    let mut diags = Diagnostics::new();
    let mut version = None;
    for prefix in d.get_string_list("prefixes") {
        let cidr = match Cidr::new(&prefix) {
            Ok(cidr) => cidr,
            Err(e) => {
                diags.attribute_error("prefixes", e.to_string());
                continue;
            }
        };
        match version {
            None => version = Some(cidr.ip_version()),
            Some(v) if v != cidr.ip_version() => {
                diags.attribute_error("prefixes", "Prefixes must all be of the same IP version");
            }
            Some(_) => {}
        }
    }

    if let Some(max_len) = version.and_then(|v| max_prefix_len(v).ok()) {
        for key in ["default_prefixlen", "min_prefixlen", "max_prefixlen"] {
            if let Some(len) = optional_int(d, key) {
                if len < 0 || len > i64::from(max_len) {
                    diags.attribute_error(key, format!("{len} is outside the range 0..={max_len}"));
                }
            }
        }
    }
    if let (Some(min), Some(max)) = (optional_int(d, "min_prefixlen"), optional_int(d, "max_prefixlen")) {
        if min > max {
            diags.attribute_error("min_prefixlen", format!("{min} is greater than max_prefixlen {max}"));
        }
    }
    diags.into_result()
}

fn set_subnetpool_attributes(
    d: &mut ResourceData,
    pool: &SubnetPool,
    region: &str,
) -> Result<(), SetError> {
    d.set("name", &pool.name)?;
    d.set("description", &pool.description)?;
    d.set("default_quota", pool.default_quota)?;
    d.set("project_id", &pool.project_id)?;
    d.set("created_at", format_timestamp(pool.created_at))?;
    d.set("updated_at", format_timestamp(pool.updated_at))?;
    d.set("prefixes", &pool.prefixes)?;
    d.set("default_prefixlen", pool.default_prefix_len)?;
    d.set("min_prefixlen", pool.min_prefix_len)?;
    d.set("max_prefixlen", pool.max_prefix_len)?;
    d.set("address_scope_id", &pool.address_scope_id)?;
    d.set("ip_version", pool.ip_version)?;
    d.set("shared", pool.shared)?;
    d.set("is_default", pool.is_default)?;
    d.set("revision_number", pool.revision_number)?;
    d.set("region", region)?;
    networking_v2_read_attributes_tags(d, &pool.tags)
}

#[async_trait]
impl Resource for SubnetPoolResource {
    fn schema(&self) -> Schema {
        Schema::new()
            .attribute("region", Attribute::string().optional().computed().force_new())
            .attribute("name", Attribute::string().optional())
            .attribute("description", Attribute::string().optional())
            .attribute("default_quota", Attribute::int().optional())
            .attribute("project_id", Attribute::string().optional().computed().force_new())
            .attribute("created_at", Attribute::string().computed())
            .attribute("updated_at", Attribute::string().computed())
            .attribute(
                "prefixes",
                Attribute::list(AttributeType::String)
                    .required()
                    .with_validation(validate_cidr),
            )
            .attribute("default_prefixlen", Attribute::int().optional().computed())
            .attribute("min_prefixlen", Attribute::int().optional().computed())
            .attribute("max_prefixlen", Attribute::int().optional().computed())
            .attribute("address_scope_id", Attribute::string().optional())
            .attribute("ip_version", Attribute::int().computed())
            .attribute("shared", Attribute::bool().optional().computed().force_new())
            .attribute("is_default", Attribute::bool().optional())
            .attribute("revision_number", Attribute::int().computed())
            .attribute(
                "value_specs",
                Attribute::map(AttributeType::String).optional().force_new(),
            )
            .attribute("tags", Attribute::set(AttributeType::String).optional())
            .attribute("all_tags", Attribute::set(AttributeType::String).computed())
    }

    async fn create(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        check_prefix_lengths(d)?;
        let region = get_region(d, config);
        let client = config
            .networking_v2_client(&region)
            .await
            .map_err(|e| diag_error!("Error creating OpenStack networking client: {e}"))?;

        let opts = CreateOpts {
            name: d.get_string("name"),
            description: d.get_string("description"),
            default_quota: optional_int(d, "default_quota"),
            project_id: d.get_string("project_id"),
            prefixes: d.get_string_list("prefixes"),
            default_prefix_len: optional_int(d, "default_prefixlen"),
            min_prefix_len: optional_int(d, "min_prefixlen"),
            max_prefix_len: optional_int(d, "max_prefixlen"),
            address_scope_id: d.get_string("address_scope_id"),
            shared: d.get_bool("shared"),
            is_default: d.get_bool("is_default"),
            value_specs: d.get_string_map("value_specs"),
        };
        log::debug!("{RESOURCE_NAME} create options: {opts:?}");

        let pool = subnetpools::create(&client, &opts)
            .await
            .map_err(|e| diag_error!("Error creating {RESOURCE_NAME}: {e}"))?;

        log::debug!("Waiting for {RESOURCE_NAME} {} to become available", pool.id);
        self.state_change(vec![], vec!["ACTIVE"], self.timeouts.create)
            .wait_for_state(|| subnetpool_state(&client, &pool.id))
            .await
            .map_err(|e| {
                diag_error!("Error waiting for {RESOURCE_NAME} {} to become available: {e}", pool.id)
            })?;

        d.set_id(pool.id.clone());

        let tags = networking_v2_attributes_tags(d);
        if !tags.is_empty() {
            tags::replace_all(&client, "subnetpools", &pool.id, &tags)
                .await
                .map_err(|e| diag_error!("Error setting tags on {RESOURCE_NAME} {}: {e}", pool.id))?;
            log::debug!("Set tags {tags:?} on {RESOURCE_NAME} {}", pool.id);
        }

        log::info!("Created {RESOURCE_NAME} {}", pool.id);
        self.read(d, config).await
    }

    async fn read(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        let region = get_region(d, config);
        let client = config
            .networking_v2_client(&region)
            .await
            .map_err(|e| diag_error!("Error creating OpenStack networking client: {e}"))?;
        let id = d.id().to_string();

        let pool = match subnetpools::get(&client, &id).await {
            Ok(pool) => pool,
            Err(e) => return check_deleted(d, e, &format!("Error getting {RESOURCE_NAME} {id}")),
        };
        log::debug!("Retrieved {RESOURCE_NAME} {id}: {pool:?}");

        set_subnetpool_attributes(d, &pool, &region)
            .map_err(|e| diag_error!("Unable to set attributes of {RESOURCE_NAME} {id}: {e}"))
    }

    async fn update(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        check_prefix_lengths(d)?;
        let region = get_region(d, config);
        let client = config
            .networking_v2_client(&region)
            .await
            .map_err(|e| diag_error!("Error creating OpenStack networking client: {e}"))?;
        let id = d.id().to_string();

        let mut opts = UpdateOpts::default();
        if d.has_change("name") {
            opts.name = Some(d.get_string("name"));
        }
        if d.has_change("description") {
            opts.description = Some(d.get_string("description"));
        }
        if d.has_change("default_quota") {
            opts.default_quota = Some(d.get_int("default_quota"));
        }
        if d.has_change("prefixes") {
            opts.prefixes = Some(d.get_string_list("prefixes"));
        }
        if d.has_change("default_prefixlen") {
            opts.default_prefix_len = Some(d.get_int("default_prefixlen"));
        }
        if d.has_change("min_prefixlen") {
            opts.min_prefix_len = Some(d.get_int("min_prefixlen"));
        }
        if d.has_change("max_prefixlen") {
            opts.max_prefix_len = Some(d.get_int("max_prefixlen"));
        }
        if d.has_change("address_scope_id") {
            let scope = d.get_string("address_scope_id");
            opts.address_scope_id = Some((!scope.is_empty()).then_some(scope));
        }
        if d.has_change("is_default") {
            opts.is_default = Some(d.get_bool("is_default"));
        }

        if !opts.is_empty() {
            log::debug!("{RESOURCE_NAME} {id} update options: {opts:?}");
            tokio::time::timeout(self.timeouts.update, subnetpools::update(&client, &id, &opts))
                .await
                .map_err(|_| {
                    diag_error!(
                        "Error updating {RESOURCE_NAME} {id}: no response within {:?}",
                        self.timeouts.update
                    )
                })?
                .map_err(|e| diag_error!("Error updating {RESOURCE_NAME} {id}: {e}"))?;
        }

        if d.has_change("tags") {
            let tags = networking_v2_attributes_tags(d);
            tags::replace_all(&client, "subnetpools", &id, &tags)
                .await
                .map_err(|e| diag_error!("Error setting tags on {RESOURCE_NAME} {id}: {e}"))?;
            log::debug!("Set tags {tags:?} on {RESOURCE_NAME} {id}");
        }

        self.read(d, config).await
    }

    async fn delete(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        let region = get_region(d, config);
        let client = config
            .networking_v2_client(&region)
            .await
            .map_err(|e| diag_error!("Error creating OpenStack networking client: {e}"))?;
        let id = d.id().to_string();

        if let Err(e) = subnetpools::delete(&client, &id).await {
            return check_deleted(d, e, &format!("Error deleting {RESOURCE_NAME} {id}"));
        }

        self.state_change(vec!["ACTIVE"], vec!["DELETED"], self.timeouts.delete)
            .wait_for_state(|| subnetpool_state(&client, &id))
            .await
            .map_err(|e| diag_error!("Error waiting for {RESOURCE_NAME} {id} to Delete: {e}"))?;

        log::info!("Deleted {RESOURCE_NAME} {id}");
        d.set_id("");
        Ok(())
    }
}
