//! Helpers shared by the networking handlers.

use crate::config::Config;
use crate::diag::Diagnostics;
use crate::diag_error;
use crate::models::{ExternalFixedIp, Route, Subport};
use crate::openstack::ApiError;
use crate::schema::{ResourceData, SetError};
use itertools::Itertools;
use serde_json::{json, Value};

/// The `region` attribute when set, else the provider's default region.
pub fn get_region(d: &ResourceData, config: &Config) -> String {
    match d.get_ok("region").and_then(|v| v.as_str().map(str::to_string)) {
        Some(region) => region,
        None => config.region().to_string(),
    }
}

/// Configured `tags`, sorted.
pub fn networking_v2_attributes_tags(d: &ResourceData) -> Vec<String> {
    d.get_string_list("tags").into_iter().sorted().collect()
}

/// Configured tags as a list filter: every tag must match.
pub fn networking_v2_tags_filter(d: &ResourceData) -> String {
    networking_v2_attributes_tags(d).join(",")
}

/// Store remote tags in `all_tags`, and in `tags` only those also configured.
pub fn networking_v2_read_attributes_tags(
    d: &mut ResourceData,
    tags: &[String],
) -> Result<(), SetError> {
    d.set("all_tags", tags)?;
    let desired = d.get_string_list("tags");
    let kept: Vec<&String> = tags.iter().filter(|t| desired.contains(t)).collect();
    d.set("tags", kept)
}

pub fn flatten_router_routes(routes: &[Route]) -> Vec<Value> {
    routes
        .iter()
        .map(|r| json!({"destination_cidr": r.destination, "next_hop": r.nexthop}))
        .collect()
}

pub fn flatten_external_fixed_ips(ips: &[ExternalFixedIp]) -> Vec<Value> {
    ips.iter()
        .map(|ip| json!({"subnet_id": ip.subnet_id, "ip_address": ip.ip_address}))
        .collect()
}

pub fn flatten_trunk_subports(subports: &[Subport]) -> Vec<Value> {
    subports
        .iter()
        .map(|s| {
            json!({
                "port_id": s.port_id,
                "segmentation_type": s.segmentation_type,
                "segmentation_id": s.segmentation_id,
            })
        })
        .collect()
}

/// Drop a vanished resource from state, or turn the error into a diagnostic.
pub fn check_deleted(d: &mut ResourceData, err: ApiError, msg: &str) -> Result<(), Diagnostics> {
    if err.is_not_found() {
        log::warn!("{msg}: resource not found, removing from state");
        d.set_id("");
        return Ok(());
    }
    Err(diag_error!("{msg}: {err}"))
}
