//! OpenStack Networking provider.
//!
//! Exposes routers and trunks as data sources and subnet pools as a managed
//! resource, translating schema attributes to Networking v2 API calls.
//!
//! # Modules
//! - [`config`] - provider settings, authentication and clients
//! - [`diag`] - user-facing diagnostics
//! - [`models`] - API data structures
//! - [`openstack`] - Networking v2 and Identity v3 calls
//! - [`schema`] - attribute schemas and resource data
//! - [`provider`] - handlers and dispatch
//! - [`output`] - terminal rendering
//! - [`cli`] - command line driver
//! - [`logging`] - log4rs setup

pub mod cli;
pub mod config;
pub mod diag;
pub mod logging;
pub mod models;
pub mod openstack;
pub mod output;
pub mod provider;
pub mod schema;

pub use config::{Config, Settings};
pub use diag::Diagnostics;
pub use provider::Provider;
pub use schema::ResourceData;
