//! Trunk list calls (trunk extension).

use super::client::{NetworkingClient, Pages, Query};
use super::error::ApiError;
use crate::models::Trunk;

/// Filters for listing trunks. Unset fields are not sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListOpts {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Parent port.
    pub port_id: String,
    pub admin_state_up: Option<bool>,
    pub status: String,
    pub project_id: String,
    /// Comma-separated; every tag must match.
    pub tags: String,
}

impl ListOpts {
    pub fn to_query(&self) -> Query {
        Query::new()
            .string("id", &self.id)
            .string("name", &self.name)
            .string("description", &self.description)
            .string("port_id", &self.port_id)
            .bool("admin_state_up", self.admin_state_up)
            .string("status", &self.status)
            .string("project_id", &self.project_id)
            .string("tags", &self.tags)
    }
}

/// List every page of trunks matching `opts`.
pub async fn list(client: &NetworkingClient, opts: &ListOpts) -> Result<Pages, ApiError> {
    client.list_pages("trunks", "trunks", &opts.to_query()).await
}

pub fn extract_trunks(pages: Pages) -> Result<Vec<Trunk>, ApiError> {
    pages.extract()
}
