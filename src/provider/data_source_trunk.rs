//! `openstack_networking_trunk_v2` data source.

use super::helpers::{flatten_trunk_subports, get_region, networking_v2_tags_filter};
use super::DataSource;
use crate::config::Config;
use crate::diag::Diagnostics;
use crate::diag_error;
use crate::openstack::trunks;
use crate::schema::{Attribute, AttributeType, ResourceData, Schema, SetError};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct TrunkDataSource;

fn sub_port_block() -> Schema {
    Schema::new()
        .attribute("port_id", Attribute::string().computed())
        .attribute("segmentation_type", Attribute::string().computed())
        .attribute("segmentation_id", Attribute::int().computed())
}

#[async_trait]
impl DataSource for TrunkDataSource {
    fn schema(&self) -> Schema {
        Schema::new()
            .attribute("region", Attribute::string().optional().computed())
            .attribute("name", Attribute::string().optional())
            .attribute("description", Attribute::string().optional())
            .attribute("trunk_id", Attribute::string().optional())
            .attribute("port_id", Attribute::string().optional())
            .attribute("admin_state_up", Attribute::bool().optional())
            .attribute("status", Attribute::string().optional())
            .attribute("project_id", Attribute::string().optional().computed())
            .attribute("sub_port", Attribute::block_list(sub_port_block()).computed())
            .attribute("tags", Attribute::set(AttributeType::String).optional())
            .attribute("all_tags", Attribute::set(AttributeType::String).computed())
    }

    async fn read(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        let region = get_region(d, config);
        let client = config
            .networking_v2_client(&region)
            .await
            .map_err(|e| diag_error!("Error creating OpenStack networking client: {e}"))?;

        let opts = trunks::ListOpts {
            name: d.get_string("name"),
            description: d.get_string("description"),
            id: d.get_string("trunk_id"),
            port_id: d.get_string("port_id"),
            // only `true` narrows the listing
            admin_state_up: d.get_ok("admin_state_up").and_then(|v| v.as_bool()),
            project_id: d.get_string("project_id"),
            status: d.get_string("status"),
            tags: networking_v2_tags_filter(d),
        };

        let pages = trunks::list(&client, &opts)
            .await
            .map_err(|e| diag_error!("Unable to retrieve trunks: {e}"))?;
        let all_trunks = trunks::extract_trunks(pages)
            .map_err(|e| diag_error!("Unable to extract trunks: {e}"))?;

        match all_trunks.len() {
            0 => {
                return Err(Diagnostics::error_with_detail(
                    "No Trunk found",
                    "Your query returned no results. Please change your search criteria and try again.",
                ))
            }
            1 => {}
            _ => {
                return Err(Diagnostics::error_with_detail(
                    "More than one Trunk found",
                    "Your query returned more than one result. Please try a more specific search criteria.",
                ))
            }
        }
        let trunk = &all_trunks[0];

        log::debug!("Retrieved Trunk {}: {:?}", trunk.id, trunk);
        d.set_id(trunk.id.clone());

        let set = |d: &mut ResourceData| -> Result<(), SetError> {
            d.set("region", &region)?;
            d.set("name", &trunk.name)?;
            d.set("description", &trunk.description)?;
            d.set("port_id", &trunk.port_id)?;
            d.set("admin_state_up", trunk.admin_state_up)?;
            d.set("status", &trunk.status)?;
            d.set("project_id", &trunk.project_id)?;
            d.set("all_tags", &trunk.tags)
        };
        set(d).map_err(|e| diag_error!("Unable to set attributes of trunk {}: {e}", trunk.id))?;

        d.set("sub_port", flatten_trunk_subports(&trunk.subports))
            .map_err(|e| diag_error!("Unable to set sub_port for trunk {}: {e}", d.id()))?;

        Ok(())
    }
}
