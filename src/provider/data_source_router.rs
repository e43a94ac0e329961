//! `openstack_networking_router_v2` data source.

use super::helpers::{
    flatten_external_fixed_ips, flatten_router_routes, get_region, networking_v2_tags_filter,
};
use super::DataSource;
use crate::config::Config;
use crate::diag::Diagnostics;
use crate::diag_error;
use crate::openstack::routers;
use crate::schema::{Attribute, AttributeType, ResourceData, Schema};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct RouterDataSource;

fn external_fixed_ip_block() -> Schema {
    Schema::new()
        .attribute("subnet_id", Attribute::string().computed())
        .attribute("ip_address", Attribute::string().computed())
}

fn route_block() -> Schema {
    Schema::new()
        .attribute("destination_cidr", Attribute::string().computed())
        .attribute("next_hop", Attribute::string().computed())
}

#[async_trait]
impl DataSource for RouterDataSource {
    fn schema(&self) -> Schema {
        Schema::new()
            .attribute("region", Attribute::string().optional())
            .attribute("router_id", Attribute::string().optional())
            .attribute("name", Attribute::string().optional())
            .attribute("description", Attribute::string().optional())
            .attribute("admin_state_up", Attribute::bool().optional())
            .attribute("distributed", Attribute::bool().optional())
            .attribute("status", Attribute::string().optional())
            .attribute("tenant_id", Attribute::string().optional())
            .attribute("external_network_id", Attribute::string().computed())
            .attribute("enable_snat", Attribute::bool().optional().computed())
            .attribute(
                "availability_zone_hints",
                Attribute::list(AttributeType::String).computed(),
            )
            .attribute(
                "external_fixed_ip",
                Attribute::block_list(external_fixed_ip_block()).computed(),
            )
            .attribute("routes", Attribute::block_list(route_block()).computed())
            .attribute("external_qos_policy_id", Attribute::string().computed())
            .attribute("tags", Attribute::set(AttributeType::String).optional())
            .attribute("all_tags", Attribute::set(AttributeType::String).computed())
    }

    async fn read(&self, d: &mut ResourceData, config: &Config) -> Result<(), Diagnostics> {
        let region = get_region(d, config);
        let client = config
            .networking_v2_client(&region)
            .await
            .map_err(|e| diag_error!("Error creating OpenStack networking client: {e}"))?;

        let opts = routers::ListOpts {
            id: d.get_string("router_id"),
            name: d.get_string("name"),
            description: d.get_string("description"),
            admin_state_up: d.get_ok_exists("admin_state_up").and_then(|v| v.as_bool()),
            distributed: d.get_ok_exists("distributed").and_then(|v| v.as_bool()),
            status: d.get_string("status"),
            tenant_id: d.get_string("tenant_id"),
            tags: networking_v2_tags_filter(d),
        };

        let pages = routers::list(&client, &opts)
            .await
            .map_err(|e| diag_error!("Unable to list Routers: {e}"))?;
        let all_routers = routers::extract_routers(pages)
            .map_err(|e| diag_error!("Unable to retrieve Routers: {e}"))?;

        if all_routers.is_empty() {
            return Err(diag_error!("No Router found"));
        }
        if all_routers.len() > 1 {
            return Err(diag_error!("More than one Router found"));
        }
        let router = &all_routers[0];

        log::debug!("Retrieved Router {}: {:?}", router.id, router);
        d.set_id(router.id.clone());

        let gateway = &router.gateway_info;
        let set = |d: &mut ResourceData| -> Result<(), crate::schema::SetError> {
            d.set("name", &router.name)?;
            d.set("description", &router.description)?;
            d.set("admin_state_up", router.admin_state_up)?;
            d.set("distributed", router.distributed)?;
            d.set("status", &router.status)?;
            d.set("tenant_id", &router.tenant_id)?;
            d.set("external_network_id", &gateway.network_id)?;
            d.set("enable_snat", gateway.enable_snat)?;
            d.set("external_qos_policy_id", &gateway.qos_policy_id)?;
            d.set("all_tags", &router.tags)?;
            d.set("routes", flatten_router_routes(&router.routes))?;
            d.set("region", &region)
        };
        set(d).map_err(|e| diag_error!("Unable to set attributes of Router {}: {e}", router.id))?;

        if let Err(e) = d.set("availability_zone_hints", &router.availability_zone_hints) {
            log::debug!("Unable to set availability_zone_hints: {e}");
        }
        let fixed_ips = flatten_external_fixed_ips(&gateway.external_fixed_ips);
        if let Err(e) = d.set("external_fixed_ip", fixed_ips) {
            log::debug!("Unable to set external_fixed_ip: {e}");
        }

        Ok(())
    }
}
