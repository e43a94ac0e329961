//! OpenStack trunk data model.

use super::{null_default, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sub-port attached to a trunk.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Subport {
    #[serde(default, deserialize_with = "null_default")]
    pub port_id: String,
    /// e.g. "vlan" or "inherit".
    #[serde(default, deserialize_with = "null_default")]
    pub segmentation_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub segmentation_id: i64,
}

/// Represents an OpenStack trunk aggregating sub-ports under a parent port.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Trunk {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Parent port.
    #[serde(default, deserialize_with = "null_default")]
    pub port_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub admin_state_up: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub project_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tenant_id: String,
    #[serde(rename = "sub_ports", default, deserialize_with = "null_default")]
    pub subports: Vec<Subport>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub revision_number: i64,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_decode() {
        let json = std::fs::read_to_string("src/tests/test_data/trunk_list_01.json")
            .expect("Error reading trunk fixture");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let trunks: Vec<Trunk> = serde_json::from_value(value["trunks"].clone()).unwrap();
        assert_eq!(trunks.len(), 1);

        let trunk = &trunks[0];
        assert_eq!(trunk.name, "trunk_1");
        assert_eq!(trunk.port_id, "c7ee5b5c-2d39-4d4e-9f1e-2c2f3a1f5a10");
        assert_eq!(trunk.subports.len(), 2);
        assert_eq!(trunk.subports[1].segmentation_id, 101);
        assert_eq!(trunk.subports[1].segmentation_type, "vlan");
        assert!(trunk.created_at.is_some());
    }
}
