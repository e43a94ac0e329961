//! Networking v2 REST client.
//!
//! Thin wrapper over `reqwest` that knows the Networking API conventions:
//! resources are wrapped in a single-key envelope (`{"router": {...}}`),
//! collections are paginated through `<key>_links` entries with `rel == "next"`,
//! and a token is passed in `X-Auth-Token`.

use super::error::ApiError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Header carrying the Keystone token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Shared, reusable client for one Networking v2 endpoint.
#[derive(Debug, Clone)]
pub struct NetworkingClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

/// Query pairs for list calls. Empty values are dropped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query(Vec<(&'static str, String)>);

impl Query {
    pub fn new() -> Query {
        Query(Vec::new())
    }

    /// Add a string filter when non-empty.
    pub fn string(mut self, key: &'static str, value: &str) -> Query {
        if !value.is_empty() {
            self.0.push((key, value.to_string()));
        }
        self
    }

    /// Add a bool filter when set, including `false`.
    pub fn bool(mut self, key: &'static str, value: Option<bool>) -> Query {
        if let Some(v) = value {
            self.0.push((key, v.to_string()));
        }
        self
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw pages of a collection listing, not yet decoded.
#[derive(Debug)]
pub struct Pages {
    key: &'static str,
    url: String,
    bodies: Vec<Value>,
}

impl Pages {
    /// Number of pages fetched.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Decode every item of every page.
    pub fn extract<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        for body in self.bodies {
            let page: Vec<T> = decode(&self.url, take_key(&self.url, body, self.key)?)?;
            items.extend(page);
        }
        Ok(items)
    }
}

impl NetworkingClient {
    /// Create a client for a Networking service root such as `http://neutron:9696/`.
    ///
    /// The `v2.0/` version prefix is appended unless the URL already ends with it.
    pub fn new(http: reqwest::Client, service_url: &str, token: Option<String>) -> NetworkingClient {
        let mut endpoint = service_url.trim_end_matches('/').to_string();
        if !endpoint.ends_with("/v2.0") {
            endpoint.push_str("/v2.0");
        }
        endpoint.push('/');
        NetworkingClient {
            http,
            endpoint,
            token,
        }
    }

    /// Versioned endpoint, always ending with `/`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a URL under the endpoint, e.g. `["subnetpools", id, "tags"]`.
    pub fn service_url(&self, parts: &[&str]) -> String {
        format!("{}{}", self.endpoint, parts.join("/"))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Send a request and return the body when the status is one of `expected`.
    async fn send(
        &self,
        builder: RequestBuilder,
        method: &Method,
        url: &str,
        expected: &[u16],
    ) -> Result<String, ApiError> {
        log::debug!("{method} {url}");
        let transport = |source| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        log::trace!("{method} {url} -> {status} body.len()={}", body.len());

        if expected.contains(&status.as_u16()) {
            return Ok(body);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                method: method.to_string(),
                url: url.to_string(),
                body,
            });
        }
        Err(ApiError::UnexpectedStatus {
            method: method.to_string(),
            url: url.to_string(),
            expected: expected.to_vec(),
            status: status.as_u16(),
            body,
        })
    }

    /// Fetch every page of a collection, following next links.
    pub async fn list_pages(
        &self,
        path: &str,
        key: &'static str,
        query: &Query,
    ) -> Result<Pages, ApiError> {
        let first_url = self.service_url(&[path]);
        let mut url = first_url.clone();
        let mut seen = HashSet::new();
        let mut bodies = Vec::new();

        loop {
            let mut builder = self.request(Method::GET, &url);
            if bodies.is_empty() && !query.is_empty() {
                builder = builder.query(query.pairs());
            }
            let body = self.send(builder, &Method::GET, &url, &[200]).await?;
            let page: Value = parse(&url, &body)?;
            let next = next_link(&page, key);
            bodies.push(page);

            log::debug!(
                "got page#{count:2} of {key} from {url} next={next:?}",
                count = bodies.len(),
            );

            match next {
                None => break,
                Some(next) => {
                    if !seen.insert(next.clone()) {
                        return Err(ApiError::Pagination(next));
                    }
                    url = next;
                }
            }
        }

        Ok(Pages {
            key,
            url: first_url,
            bodies,
        })
    }

    /// GET a single resource and unwrap its envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &[&str], key: &str) -> Result<T, ApiError> {
        let url = self.service_url(path);
        let builder = self.request(Method::GET, &url);
        let body = self.send(builder, &Method::GET, &url, &[200]).await?;
        decode(&url, take_key(&url, parse(&url, &body)?, key)?)
    }

    /// POST a new resource; expects 201.
    pub async fn create<B, T>(&self, path: &[&str], key: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, key, body, &[201]).await
    }

    /// PUT changes to a resource; expects 200.
    pub async fn update<B, T>(&self, path: &[&str], key: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, key, body, &[200]).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &[&str],
        key: &str,
        body: &B,
        expected: &[u16],
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.service_url(path);
        let builder = self
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let body = self.send(builder, &method, &url, expected).await?;
        decode(&url, take_key(&url, parse(&url, &body)?, key)?)
    }

    /// DELETE a resource; expects 204 or 202.
    pub async fn delete(&self, path: &[&str]) -> Result<(), ApiError> {
        let url = self.service_url(path);
        let builder = self.request(Method::DELETE, &url);
        self.send(builder, &Method::DELETE, &url, &[202, 204])
            .await
            .map(|_| ())
    }
}

fn parse(url: &str, body: &str) -> Result<Value, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, ApiError> {
    serde_path_to_error::deserialize(value).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

fn take_key(url: &str, value: Value, key: &str) -> Result<Value, ApiError> {
    match value {
        Value::Object(mut map) => map.remove(key).ok_or_else(|| ApiError::Decode {
            url: url.to_string(),
            path: key.to_string(),
            message: format!("missing field `{key}`"),
        }),
        other => Err(ApiError::Decode {
            url: url.to_string(),
            path: ".".to_string(),
            message: format!("expected an object, got {other}"),
        }),
    }
}

/// Find the `rel == "next"` href in `<key>_links`.
fn next_link(page: &Value, key: &str) -> Option<String> {
    page.get(format!("{key}_links"))?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client(server: &MockServer) -> NetworkingClient {
        NetworkingClient::new(reqwest::Client::new(), &server.base_url(), Some("secret".into()))
    }

    #[test]
    fn test_endpoint_normalisation() {
        let http = reqwest::Client::new();
        let client = NetworkingClient::new(http.clone(), "http://neutron:9696", None);
        assert_eq!(client.endpoint(), "http://neutron:9696/v2.0/");
        let client = NetworkingClient::new(http.clone(), "http://neutron:9696/v2.0/", None);
        assert_eq!(client.endpoint(), "http://neutron:9696/v2.0/");
        assert_eq!(
            client.service_url(&["subnetpools", "abc", "tags"]),
            "http://neutron:9696/v2.0/subnetpools/abc/tags"
        );
    }

    #[test]
    fn test_query_skips_empty() {
        let query = Query::new()
            .string("name", "")
            .string("status", "ACTIVE")
            .bool("admin_state_up", Some(false))
            .bool("distributed", None);
        assert_eq!(
            query.pairs(),
            &[
                ("status", "ACTIVE".to_string()),
                ("admin_state_up", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_next_link() {
        let page = json!({
            "routers": [],
            "routers_links": [
                {"rel": "previous", "href": "http://x/prev"},
                {"rel": "next", "href": "http://x/next"}
            ]
        });
        assert_eq!(next_link(&page, "routers"), Some("http://x/next".to_string()));
        assert_eq!(next_link(&json!({"routers": []}), "routers"), None);
    }

    #[tokio::test]
    async fn test_list_pages_follows_next_link() {
        let server = MockServer::start();
        let next = format!("{}/v2.0/routers?marker=r1", server.base_url());
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/v2.0/routers")
                .query_param("name", "router_1")
                .header(AUTH_TOKEN_HEADER, "secret");
            then.status(200).json_body(json!({
                "routers": [{"id": "r1", "name": "router_1"}],
                "routers_links": [{"rel": "next", "href": next}]
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/v2.0/routers")
                .query_param("marker", "r1");
            then.status(200).json_body(json!({
                "routers": [{"id": "r2", "name": "router_1"}]
            }));
        });

        let client = test_client(&server);
        let pages = client
            .list_pages("routers", "routers", &Query::new().string("name", "router_1"))
            .await
            .expect("list should succeed");
        assert_eq!(pages.len(), 2);

        let routers: Vec<crate::models::Router> = pages.extract().expect("decode routers");
        assert_eq!(routers.len(), 2);
        assert_eq!(routers[1].id, "r2");
        first.assert_calls(1);
        second.assert_calls(1);
    }

    #[tokio::test]
    async fn test_list_pages_repeated_link() {
        let server = MockServer::start();
        let next = format!("{}/v2.0/trunks?marker=t1", server.base_url());
        server.mock(|when, then| {
            when.method(GET).path("/v2.0/trunks");
            then.status(200).json_body(json!({
                "trunks": [{"id": "t1"}],
                "trunks_links": [{"rel": "next", "href": next}]
            }));
        });

        let client = test_client(&server);
        let err = client
            .list_pages("trunks", "trunks", &Query::new())
            .await
            .expect_err("repeated link must fail");
        assert!(matches!(err, ApiError::Pagination(_)));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2.0/subnetpools/missing");
            then.status(404).body(r#"{"NeutronError": {"type": "SubnetPoolNotFound"}}"#);
        });

        let client = test_client(&server);
        let err = client
            .get::<crate::models::SubnetPool>(&["subnetpools", "missing"], "subnetpool")
            .await
            .expect_err("missing pool");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_decode_error_reports_path() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2.0/subnetpools/bad");
            then.status(200)
                .json_body(json!({"subnetpool": {"id": "bad", "prefixes": "10.0.0.0/8"}}));
        });

        let client = test_client(&server);
        let err = client
            .get::<crate::models::SubnetPool>(&["subnetpools", "bad"], "subnetpool")
            .await
            .expect_err("prefixes must be a list");
        match err {
            ApiError::Decode { path, .. } => assert_eq!(path, "prefixes"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/v2.0/subnetpools/busy");
            then.status(409).body("in use");
        });

        let client = test_client(&server);
        let err = client
            .delete(&["subnetpools", "busy"])
            .await
            .expect_err("conflict");
        assert_eq!(err.status(), Some(reqwest::StatusCode::CONFLICT));
        assert!(err.to_string().contains("got 409"));
    }
}
