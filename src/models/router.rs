//! OpenStack router data model.

use super::null_default;
use serde::{Deserialize, Serialize};

/// External fixed IP of a router gateway.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExternalFixedIp {
    #[serde(default, deserialize_with = "null_default")]
    pub subnet_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub ip_address: String,
}

/// External gateway of a router.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GatewayInfo {
    /// ID of the external network.
    #[serde(default, deserialize_with = "null_default")]
    pub network_id: String,
    /// SNAT on the gateway; absent when the caller may not see it.
    #[serde(default)]
    pub enable_snat: Option<bool>,
    #[serde(default, deserialize_with = "null_default")]
    pub qos_policy_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub external_fixed_ips: Vec<ExternalFixedIp>,
}

/// Static route of a router.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Route {
    #[serde(default, deserialize_with = "null_default")]
    pub destination: String,
    #[serde(default, deserialize_with = "null_default")]
    pub nexthop: String,
}

/// Represents an OpenStack layer-3 router.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Router {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub admin_state_up: bool,
    /// Only visible to admins; false otherwise.
    #[serde(default, deserialize_with = "null_default")]
    pub distributed: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tenant_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub project_id: String,
    /// `null` when the router has no gateway.
    #[serde(
        rename = "external_gateway_info",
        default,
        deserialize_with = "null_default"
    )]
    pub gateway_info: GatewayInfo,
    #[serde(default, deserialize_with = "null_default")]
    pub routes: Vec<Route>,
    #[serde(default, deserialize_with = "null_default")]
    pub availability_zone_hints: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_decode_full() {
        let json = std::fs::read_to_string("src/tests/test_data/router_list_01.json")
            .expect("Error reading router fixture");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let routers: Vec<Router> = serde_json::from_value(value["routers"].clone()).unwrap();
        assert_eq!(routers.len(), 1);

        let router = &routers[0];
        assert_eq!(router.name, "router_1");
        assert!(router.admin_state_up);
        assert_eq!(router.gateway_info.network_id, "ae2b8ef4-7b2d-4c66-8f7c-4f7f1f1e4a01");
        assert_eq!(router.gateway_info.enable_snat, Some(true));
        assert_eq!(router.gateway_info.external_fixed_ips.len(), 1);
        assert_eq!(router.routes[0].nexthop, "192.168.199.254");
        assert_eq!(router.availability_zone_hints, vec!["nova"]);
        assert_eq!(router.tags, vec!["blue", "green"]);
    }

    #[test]
    fn test_router_decode_null_gateway() {
        let router: Router = serde_json::from_str(
            r#"{"id": "r1", "external_gateway_info": null, "routes": null, "description": null}"#,
        )
        .unwrap();
        assert_eq!(router.gateway_info, GatewayInfo::default());
        assert!(router.routes.is_empty());
        assert_eq!(router.description, "");
        assert!(!router.distributed);
    }
}
