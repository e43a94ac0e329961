//! Domain models for OpenStack Networking objects.
//!
//! This module contains the structures decoded from the Networking v2 API:
//! - [`Router`] - Layer-3 router with its external gateway
//! - [`Trunk`] - Trunk port with its sub-ports
//! - [`SubnetPool`] - Subnet pool with its prefixes and quotas
//! - [`Cidr`] - IP prefix in CIDR notation

mod cidr;
mod router;
mod subnetpool;
mod trunk;

use serde::{de, Deserialize, Deserializer};

// Re-export public types
pub use cidr::{max_prefix_len, Cidr, MAX_LENGTH_V4, MAX_LENGTH_V6};
pub use router::{ExternalFixedIp, GatewayInfo, Route, Router};
pub use subnetpool::SubnetPool;
pub use trunk::{Subport, Trunk};

/// Decode `null` as the type's default value.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode an integer that may be sent as a JSON number, a decimal string or `null`.
pub(crate) fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(IntOrString::Int(i)) => Ok(i),
        Some(IntOrString::Str(s)) if s.is_empty() => Ok(0),
        Some(IntOrString::Str(s)) => s
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid integer string: {s}"))),
    }
}

/// Decode a Networking API timestamp.
///
/// The API emits RFC 3339 values as well as zone-less values such as
/// `2018-01-01T12:00:00`, which are taken as UTC.
pub(crate) fn timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
        return Ok(Some(dt.with_timezone(&chrono::Utc)));
    }
    chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| de::Error::custom(format!("invalid timestamp {s}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "int_or_string")]
        len: i64,
        #[serde(default, deserialize_with = "null_default")]
        name: String,
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn test_int_or_string() {
        let s: Sample = serde_json::from_str(r#"{"len": "25"}"#).unwrap();
        assert_eq!(s.len, 25);
        let s: Sample = serde_json::from_str(r#"{"len": 26}"#).unwrap();
        assert_eq!(s.len, 26);
        let s: Sample = serde_json::from_str(r#"{"len": null}"#).unwrap();
        assert_eq!(s.len, 0);
        assert!(serde_json::from_str::<Sample>(r#"{"len": "x"}"#).is_err());
    }

    #[test]
    fn test_null_default() {
        let s: Sample = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(s.name, "");
        let s: Sample = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(s.name, "");
    }

    #[test]
    fn test_timestamp() {
        let s: Sample = serde_json::from_str(r#"{"at": "2018-01-01T12:00:00"}"#).unwrap();
        assert_eq!(s.at.unwrap().to_rfc3339(), "2018-01-01T12:00:00+00:00");
        let s: Sample = serde_json::from_str(r#"{"at": "2018-01-01T12:00:00Z"}"#).unwrap();
        assert_eq!(s.at.unwrap().to_rfc3339(), "2018-01-01T12:00:00+00:00");
        let s: Sample = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(s.at.is_none());
        assert!(serde_json::from_str::<Sample>(r#"{"at": "yesterday"}"#).is_err());
    }
}
