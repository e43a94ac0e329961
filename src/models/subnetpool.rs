//! OpenStack subnet pool data model.

use super::{int_or_string, null_default, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an OpenStack subnet pool.
///
/// Older Networking API releases return the prefix-length fields and
/// `default_quota` as strings, so those are decoded leniently.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SubnetPool {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Per-project quota of addresses, 0 when unlimited.
    #[serde(default, deserialize_with = "int_or_string")]
    pub default_quota: i64,
    /// Prefixes in the order the API reports them.
    #[serde(default, deserialize_with = "null_default")]
    pub prefixes: Vec<String>,
    #[serde(rename = "default_prefixlen", default, deserialize_with = "int_or_string")]
    pub default_prefix_len: i64,
    #[serde(rename = "min_prefixlen", default, deserialize_with = "int_or_string")]
    pub min_prefix_len: i64,
    #[serde(rename = "max_prefixlen", default, deserialize_with = "int_or_string")]
    pub max_prefix_len: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub address_scope_id: String,
    #[serde(default, deserialize_with = "int_or_string")]
    pub ip_version: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub shared: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub is_default: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub project_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tenant_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub revision_number: i64,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
}
