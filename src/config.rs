//! Provider configuration.
//!
//! [`Settings`] is the user-facing configuration, read from `OS_*` environment
//! variables or a JSON file. [`Config`] is built from it once and shared by
//! every handler: it owns the HTTP connection pool and caches the Keystone
//! token after the first authentication.

use crate::openstack::identity::{self, AuthInfo, PasswordCredentials};
use crate::openstack::{ApiError, NetworkingClient};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;

/// HTTP request timeout.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

const DEFAULT_DOMAIN: &str = "Default";
const DEFAULT_INTERFACE: &str = "public";
const USER_AGENT: &str = concat!("openstack-networking-provider/", env!("CARGO_PKG_VERSION"));

/// Provider settings.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Region used when a resource does not name one.
    pub region: String,
    /// Keystone URL, e.g. `https://keystone.example.com:5000/v3`.
    pub auth_url: Option<String>,
    /// Pre-issued token; used instead of password authentication.
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_domain_name: String,
    pub project_name: Option<String>,
    pub project_domain_name: String,
    /// Catalog interface: public, internal or admin.
    pub interface: String,
    /// Networking service root that bypasses the catalog.
    pub network_endpoint: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            region: String::new(),
            auth_url: None,
            token: None,
            username: None,
            password: None,
            user_domain_name: DEFAULT_DOMAIN.to_string(),
            project_name: None,
            project_domain_name: DEFAULT_DOMAIN.to_string(),
            interface: DEFAULT_INTERFACE.to_string(),
            network_endpoint: None,
            insecure: false,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("region", &self.region)
            .field("auth_url", &self.auth_url)
            .field("token", &redact(&self.token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("user_domain_name", &self.user_domain_name)
            .field("project_name", &self.project_name)
            .field("project_domain_name", &self.project_domain_name)
            .field("interface", &self.interface)
            .field("network_endpoint", &self.network_endpoint)
            .field("insecure", &self.insecure)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Settings {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps an `OS_*` name to its value.
    pub fn from_lookup<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Settings::default();
        Settings {
            region: get("OS_REGION_NAME").unwrap_or_default(),
            auth_url: get("OS_AUTH_URL"),
            token: get("OS_TOKEN").or_else(|| get("OS_AUTH_TOKEN")),
            username: get("OS_USERNAME"),
            password: get("OS_PASSWORD"),
            user_domain_name: get("OS_USER_DOMAIN_NAME").unwrap_or(defaults.user_domain_name),
            project_name: get("OS_PROJECT_NAME").or_else(|| get("OS_TENANT_NAME")),
            project_domain_name: get("OS_PROJECT_DOMAIN_NAME")
                .unwrap_or(defaults.project_domain_name),
            interface: get("OS_INTERFACE").unwrap_or(defaults.interface),
            network_endpoint: get("OS_NETWORK_ENDPOINT"),
            insecure: get("OS_INSECURE")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Read settings from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Settings, Box<dyn Error>> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading settings file {}: {e}", path.display()))?;
        let mut deserializer = serde_json::Deserializer::from_str(&json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            format!(
                "Error parsing settings file {}: path={} error={}",
                path.display(),
                e.path(),
                e
            )
            .into()
        })
    }

    fn has_password(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Check that the settings describe a usable way to reach the Networking API.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !matches!(self.interface.as_str(), "public" | "internal" | "admin") {
            return Err(format!(
                "Invalid interface {}: expected public, internal or admin",
                self.interface
            )
            .into());
        }
        match (&self.auth_url, &self.network_endpoint) {
            (None, None) => {
                Err("One of OS_AUTH_URL or OS_NETWORK_ENDPOINT must be set".into())
            }
            (Some(_), _) if !self.has_password() && self.token.is_none() => Err(
                "OS_AUTH_URL requires either OS_TOKEN or OS_USERNAME and OS_PASSWORD".into(),
            ),
            (Some(_), _) if self.has_password() && self.project_name.is_none() => {
                Err("Password authentication requires OS_PROJECT_NAME".into())
            }
            _ => Ok(()),
        }
    }
}

/// Shared provider configuration handed to every handler.
pub struct Config {
    settings: Settings,
    http: reqwest::Client,
    auth: OnceCell<AuthInfo>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("authenticated", &self.auth.initialized())
            .finish()
    }
}

impl Config {
    pub fn new(settings: Settings) -> Result<Config, Box<dyn Error>> {
        settings.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(settings.insecure)
            .build()
            .map_err(|e| format!("Error building HTTP client: {e}"))?;
        log::debug!("Provider configured: {settings:?}");
        Ok(Config {
            settings,
            http,
            auth: OnceCell::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Default region.
    pub fn region(&self) -> &str {
        &self.settings.region
    }

    /// Authenticate once and reuse the token for every later call.
    async fn authenticate(&self) -> Result<&AuthInfo, ApiError> {
        self.auth
            .get_or_try_init(|| async {
                let s = &self.settings;
                let auth_url = s.auth_url.as_deref().ok_or_else(|| {
                    ApiError::Auth("OS_AUTH_URL is required to authenticate".to_string())
                })?;
                match (&s.username, &s.password, &s.token) {
                    (Some(username), Some(password), _) => {
                        let creds = PasswordCredentials {
                            username,
                            password,
                            user_domain_name: &s.user_domain_name,
                            project_name: s.project_name.as_deref().unwrap_or_default(),
                            project_domain_name: &s.project_domain_name,
                        };
                        identity::authenticate_password(&self.http, auth_url, &creds).await
                    }
                    (_, _, Some(token)) => identity::validate_token(&self.http, auth_url, token).await,
                    _ => Err(ApiError::Auth(
                        "No credentials configured: set OS_TOKEN or OS_USERNAME and OS_PASSWORD"
                            .to_string(),
                    )),
                }
            })
            .await
    }

    /// Networking v2 client for `region`.
    ///
    /// With a configured network endpoint the catalog is not consulted; a
    /// token is still obtained when credentials are present.
    pub async fn networking_v2_client(&self, region: &str) -> Result<NetworkingClient, ApiError> {
        if let Some(endpoint) = &self.settings.network_endpoint {
            let token = if self.settings.auth_url.is_some() && self.settings.has_password() {
                Some(self.authenticate().await?.token.clone())
            } else {
                self.settings.token.clone()
            };
            return Ok(NetworkingClient::new(self.http.clone(), endpoint, token));
        }

        let auth = self.authenticate().await?;
        let url = auth.endpoint_for("network", region, &self.settings.interface)?;
        log::debug!("Using network endpoint {url} for region '{region}'");
        Ok(NetworkingClient::new(
            self.http.clone(),
            &url,
            Some(auth.token.clone()),
        ))
    }
}
