//! OpenStack API interaction.
//!
//! This module handles all calls to OpenStack services:
//! - [`client`] - Networking v2 HTTP client with pagination
//! - [`identity`] - Keystone v3 tokens and service catalog
//! - [`routers`], [`trunks`], [`subnetpools`] - per-resource calls and options
//! - [`tags`] - tag replacement on any Networking resource

pub mod client;
mod error;
pub mod identity;
pub mod routers;
pub mod subnetpools;
pub mod tags;
pub mod trunks;

// Re-export public types
pub use client::{NetworkingClient, Pages, Query};
pub use error::ApiError;
