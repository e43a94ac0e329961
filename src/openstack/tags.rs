//! Standard attribute tags on Networking resources.

use super::client::NetworkingClient;
use super::error::ApiError;
use serde::Serialize;

#[derive(Serialize, Debug)]
struct ReplaceAllOpts<'a> {
    tags: &'a [String],
}

/// Replace every tag of `<resource_type>/<id>`, returning the tags the API now reports.
pub async fn replace_all(
    client: &NetworkingClient,
    resource_type: &str,
    id: &str,
    tags: &[String],
) -> Result<Vec<String>, ApiError> {
    client
        .update(&[resource_type, id, "tags"], "tags", &ReplaceAllOpts { tags })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replace_all() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v2.0/subnetpools/p1/tags")
                .json_body(json!({"tags": ["a", "b"]}));
            then.status(200).json_body(json!({"tags": ["a", "b"]}));
        });

        let client = NetworkingClient::new(reqwest::Client::new(), &server.base_url(), None);
        let tags = replace_all(&client, "subnetpools", "p1", &["a".to_string(), "b".to_string()])
            .await
            .expect("replace tags");
        assert_eq!(tags, vec!["a", "b"]);
        mock.assert();
    }
}
