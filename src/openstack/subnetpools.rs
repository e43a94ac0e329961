//! Subnet pool calls (subnet_allocation extension).

use super::client::NetworkingClient;
use super::error::ApiError;
use crate::models::SubnetPool;
use serde::Serialize;
use std::collections::BTreeMap;

/// Request body for creating a subnet pool.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct CreateOpts {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_quota: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    pub prefixes: Vec<String>,
    #[serde(rename = "default_prefixlen", skip_serializing_if = "Option::is_none")]
    pub default_prefix_len: Option<i64>,
    #[serde(rename = "min_prefixlen", skip_serializing_if = "Option::is_none")]
    pub min_prefix_len: Option<i64>,
    #[serde(rename = "max_prefixlen", skip_serializing_if = "Option::is_none")]
    pub max_prefix_len: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address_scope_id: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub shared: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    /// Extra driver-specific fields merged into the request object.
    #[serde(flatten)]
    pub value_specs: BTreeMap<String, String>,
}

/// Request body for updating a subnet pool. Only set fields are sent.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct UpdateOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Vec<String>>,
    #[serde(rename = "default_prefixlen", skip_serializing_if = "Option::is_none")]
    pub default_prefix_len: Option<i64>,
    #[serde(rename = "min_prefixlen", skip_serializing_if = "Option::is_none")]
    pub min_prefix_len: Option<i64>,
    #[serde(rename = "max_prefixlen", skip_serializing_if = "Option::is_none")]
    pub max_prefix_len: Option<i64>,
    /// `Some(None)` detaches the pool from its address scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_scope_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl UpdateOpts {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        *self == UpdateOpts::default()
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    subnetpool: &'a T,
}

pub async fn get(client: &NetworkingClient, id: &str) -> Result<SubnetPool, ApiError> {
    client.get(&["subnetpools", id], "subnetpool").await
}

pub async fn create(client: &NetworkingClient, opts: &CreateOpts) -> Result<SubnetPool, ApiError> {
    client
        .create(&["subnetpools"], "subnetpool", &Envelope { subnetpool: opts })
        .await
}

pub async fn update(
    client: &NetworkingClient,
    id: &str,
    opts: &UpdateOpts,
) -> Result<SubnetPool, ApiError> {
    client
        .update(&["subnetpools", id], "subnetpool", &Envelope { subnetpool: opts })
        .await
}

pub async fn delete(client: &NetworkingClient, id: &str) -> Result<(), ApiError> {
    client.delete(&["subnetpools", id]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_opts_body() {
        let opts = CreateOpts {
            name: "subnetpool_1".to_string(),
            prefixes: vec!["10.10.0.0/16".to_string(), "10.11.11.0/24".to_string()],
            default_quota: Some(4),
            default_prefix_len: Some(25),
            value_specs: BTreeMap::from([("foo".to_string(), "bar".to_string())]),
            ..Default::default()
        };
        let body = serde_json::to_value(Envelope { subnetpool: &opts }).unwrap();
        assert_eq!(
            body,
            json!({
                "subnetpool": {
                    "name": "subnetpool_1",
                    "default_quota": 4,
                    "prefixes": ["10.10.0.0/16", "10.11.11.0/24"],
                    "default_prefixlen": 25,
                    "foo": "bar"
                }
            })
        );
    }

    #[test]
    fn test_update_opts_body() {
        assert!(UpdateOpts::default().is_empty());

        let opts = UpdateOpts {
            default_quota: Some(8),
            max_prefix_len: Some(28),
            address_scope_id: Some(None),
            ..Default::default()
        };
        assert!(!opts.is_empty());
        assert_eq!(
            serde_json::to_value(&opts).unwrap(),
            json!({"default_quota": 8, "max_prefixlen": 28, "address_scope_id": null})
        );
    }
}
