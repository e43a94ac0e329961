//! Attribute schemas and per-invocation resource data.
//!
//! - [`attribute`] - attribute types, modes and config validation
//! - [`resource_data`] - read config, write state
//! - [`flatmap`] - `key.index` view of a state map

mod attribute;
pub mod flatmap;
mod resource_data;

pub use attribute::{validate_cidr, Attribute, AttributeType, Schema, ValidateFn};
pub use resource_data::{ResourceData, SetError};
