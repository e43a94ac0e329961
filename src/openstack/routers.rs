//! Router list calls (layer3 extension).

use super::client::{NetworkingClient, Pages, Query};
use super::error::ApiError;
use crate::models::Router;

/// Filters for listing routers. Unset fields are not sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListOpts {
    pub id: String,
    pub name: String,
    pub description: String,
    pub admin_state_up: Option<bool>,
    pub distributed: Option<bool>,
    pub status: String,
    pub tenant_id: String,
    /// Comma-separated; every tag must match.
    pub tags: String,
}

impl ListOpts {
    pub fn to_query(&self) -> Query {
        Query::new()
            .string("id", &self.id)
            .string("name", &self.name)
            .string("description", &self.description)
            .bool("admin_state_up", self.admin_state_up)
            .bool("distributed", self.distributed)
            .string("status", &self.status)
            .string("tenant_id", &self.tenant_id)
            .string("tags", &self.tags)
    }
}

/// List every page of routers matching `opts`.
pub async fn list(client: &NetworkingClient, opts: &ListOpts) -> Result<Pages, ApiError> {
    client.list_pages("routers", "routers", &opts.to_query()).await
}

/// Decode routers from listed pages.
pub fn extract_routers(pages: Pages) -> Result<Vec<Router>, ApiError> {
    pages.extract()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_opts_query() {
        let opts = ListOpts {
            id: "r1".to_string(),
            admin_state_up: Some(false),
            distributed: Some(true),
            tags: "blue,green".to_string(),
            ..Default::default()
        };
        let query = opts.to_query();
        assert_eq!(
            query.pairs(),
            &[
                ("id", "r1".to_string()),
                ("admin_state_up", "false".to_string()),
                ("distributed", "true".to_string()),
                ("tags", "blue,green".to_string()),
            ]
        );
        assert!(ListOpts::default().to_query().is_empty());
    }
}
