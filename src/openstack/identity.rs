//! Keystone v3 authentication and service catalog lookup.

use super::client::AUTH_TOKEN_HEADER;
use super::error::ApiError;
use crate::models::null_default;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Header in which Keystone returns a newly issued token.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Password credentials scoped to a project.
#[derive(Debug, Clone)]
pub struct PasswordCredentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub user_domain_name: &'a str,
    pub project_name: &'a str,
    pub project_domain_name: &'a str,
}

/// One endpoint of a catalog service.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Endpoint {
    #[serde(default, deserialize_with = "null_default")]
    pub interface: String,
    #[serde(default, deserialize_with = "null_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_default")]
    pub region_id: String,
    pub url: String,
}

/// One service of the catalog.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub endpoints: Vec<Endpoint>,
}

/// A token together with the catalog it was issued with.
#[derive(Debug, Clone, Default)]
pub struct AuthInfo {
    pub token: String,
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct TokenBody {
    token: TokenDetails,
}

#[derive(Deserialize)]
struct TokenDetails {
    #[serde(default, deserialize_with = "null_default")]
    catalog: Vec<CatalogEntry>,
}

impl AuthInfo {
    /// Find the URL of `service_type` for `region` and `interface` (public/internal/admin).
    ///
    /// An empty `region` matches any region.
    pub fn endpoint_for(
        &self,
        service_type: &str,
        region: &str,
        interface: &str,
    ) -> Result<String, ApiError> {
        self.catalog
            .iter()
            .filter(|entry| entry.service_type == service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .find(|ep| {
                ep.interface == interface
                    && (region.is_empty() || ep.region_id == region || ep.region == region)
            })
            .map(|ep| ep.url.clone())
            .ok_or_else(|| {
                ApiError::Auth(format!(
                    "No suitable endpoint could be found in the service catalog: type={service_type} region={region} interface={interface}"
                ))
            })
    }
}

/// `<auth_url>/auth/tokens`, adding the `v3` version segment when missing.
pub fn tokens_url(auth_url: &str) -> String {
    let base = auth_url.trim_end_matches('/');
    if base.ends_with("/v3") {
        format!("{base}/auth/tokens")
    } else {
        format!("{base}/v3/auth/tokens")
    }
}

/// Issue a project-scoped token with password credentials.
pub async fn authenticate_password(
    http: &reqwest::Client,
    auth_url: &str,
    creds: &PasswordCredentials<'_>,
) -> Result<AuthInfo, ApiError> {
    let url = tokens_url(auth_url);
    let body = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": creds.username,
                        "domain": {"name": creds.user_domain_name},
                        "password": creds.password
                    }
                }
            },
            "scope": {
                "project": {
                    "name": creds.project_name,
                    "domain": {"name": creds.project_domain_name}
                }
            }
        }
    });
    log::info!(
        "Authenticating user {} against {url}",
        creds.username
    );
    let request = http.post(&url).json(&body);
    token_request(request, "POST", &url, 201, None).await
}

/// Re-validate an existing token to obtain its catalog.
pub async fn validate_token(
    http: &reqwest::Client,
    auth_url: &str,
    token: &str,
) -> Result<AuthInfo, ApiError> {
    let url = tokens_url(auth_url);
    log::info!("Validating token against {url}");
    let request = http
        .get(&url)
        .header(AUTH_TOKEN_HEADER, token)
        .header(SUBJECT_TOKEN_HEADER, token);
    token_request(request, "GET", &url, 200, Some(token)).await
}

async fn token_request(
    request: reqwest::RequestBuilder,
    method: &str,
    url: &str,
    expected: u16,
    known_token: Option<&str>,
) -> Result<AuthInfo, ApiError> {
    let transport = |source| ApiError::Transport {
        method: method.to_string(),
        url: url.to_string(),
        source,
    };
    let response = request.send().await.map_err(transport)?;
    let status = response.status().as_u16();
    let subject_token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(transport)?;

    if status != expected {
        return Err(ApiError::UnexpectedStatus {
            method: method.to_string(),
            url: url.to_string(),
            expected: vec![expected],
            status,
            body,
        });
    }

    let token = subject_token
        .or_else(|| known_token.map(str::to_string))
        .ok_or_else(|| ApiError::Auth(format!("No {SUBJECT_TOKEN_HEADER} header in response from {url}")))?;

    let mut deserializer = serde_json::Deserializer::from_str(&body);
    let parsed: TokenBody =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })?;

    log::debug!(
        "Got token with {} catalog entries from {url}",
        parsed.token.catalog.len()
    );
    Ok(AuthInfo {
        token,
        catalog: parsed.token.catalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn catalog_body(network_url: &str) -> serde_json::Value {
        json!({
            "token": {
                "expires_at": "2030-01-01T00:00:00.000000Z",
                "catalog": [
                    {
                        "type": "network",
                        "name": "neutron",
                        "endpoints": [
                            {"interface": "internal", "region_id": "RegionOne", "region": "RegionOne", "url": "http://internal:9696"},
                            {"interface": "public", "region_id": "RegionOne", "region": "RegionOne", "url": network_url},
                            {"interface": "public", "region_id": "RegionTwo", "region": "RegionTwo", "url": "http://two:9696"}
                        ]
                    },
                    {"type": "identity", "name": "keystone", "endpoints": []}
                ]
            }
        })
    }

    #[test]
    fn test_tokens_url() {
        assert_eq!(tokens_url("http://keystone:5000/v3"), "http://keystone:5000/v3/auth/tokens");
        assert_eq!(tokens_url("http://keystone:5000/v3/"), "http://keystone:5000/v3/auth/tokens");
        assert_eq!(tokens_url("http://keystone:5000"), "http://keystone:5000/v3/auth/tokens");
    }

    #[test]
    fn test_endpoint_for() {
        let body: TokenBody = serde_json::from_value(catalog_body("http://public:9696")).unwrap();
        let auth = AuthInfo {
            token: "t".to_string(),
            catalog: body.token.catalog,
        };
        assert_eq!(
            auth.endpoint_for("network", "RegionOne", "public").unwrap(),
            "http://public:9696"
        );
        assert_eq!(
            auth.endpoint_for("network", "RegionOne", "internal").unwrap(),
            "http://internal:9696"
        );
        assert_eq!(
            auth.endpoint_for("network", "RegionTwo", "public").unwrap(),
            "http://two:9696"
        );
        assert!(auth.endpoint_for("network", "RegionThree", "public").is_err());
        assert!(auth.endpoint_for("compute", "RegionOne", "public").is_err());
    }

    #[tokio::test]
    async fn test_authenticate_password() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v3/auth/tokens")
                .body_includes(r#""name":"demo""#);
            then.status(201)
                .header(SUBJECT_TOKEN_HEADER, "gAAAAAB-token")
                .json_body(catalog_body("http://public:9696"));
        });

        let creds = PasswordCredentials {
            username: "demo",
            password: "secret",
            user_domain_name: "Default",
            project_name: "demo",
            project_domain_name: "Default",
        };
        let auth = authenticate_password(&reqwest::Client::new(), &server.url("/v3"), &creds)
            .await
            .expect("authenticate");
        assert_eq!(auth.token, "gAAAAAB-token");
        assert_eq!(auth.catalog.len(), 2);
        mock.assert();
    }

    #[tokio::test]
    async fn test_authenticate_password_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/auth/tokens");
            then.status(401).body(r#"{"error": {"code": 401}}"#);
        });

        let creds = PasswordCredentials {
            username: "demo",
            password: "wrong",
            user_domain_name: "Default",
            project_name: "demo",
            project_domain_name: "Default",
        };
        let err = authenticate_password(&reqwest::Client::new(), &server.url("/v3"), &creds)
            .await
            .expect_err("401");
        assert!(err.to_string().contains("got 401"));
    }

    #[tokio::test]
    async fn test_validate_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v3/auth/tokens")
                .header(AUTH_TOKEN_HEADER, "existing")
                .header(SUBJECT_TOKEN_HEADER, "existing");
            then.status(200).json_body(catalog_body("http://public:9696"));
        });

        let auth = validate_token(&reqwest::Client::new(), &server.url("/v3"), "existing")
            .await
            .expect("validate");
        assert_eq!(auth.token, "existing");
        assert_eq!(
            auth.endpoint_for("network", "", "public").unwrap(),
            "http://public:9696"
        );
    }
}
