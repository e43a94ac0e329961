//! Per-invocation attribute access for handlers.
//!
//! A [`ResourceData`] is built from the user configuration and, for existing
//! resources, the prior state. Refresh and destroy run without configuration;
//! reads then fall back to the prior state. Handlers write the new state back
//! with [`ResourceData::set`].

use super::attribute::{AttributeType, Schema};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetError {
    #[error("Invalid address to set: {0:?}")]
    UnknownAttribute(String),

    #[error("{key}: {message}")]
    Type { key: String, message: String },

    #[error("{key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Schema,
    id: String,
    /// `None` when no configuration is available (refresh, destroy, import).
    config: Option<Map<String, Value>>,
    prior: Map<String, Value>,
    values: Map<String, Value>,
}

impl ResourceData {
    /// Fresh data for a create or a data source read.
    pub fn new(schema: Schema, config: Map<String, Value>) -> ResourceData {
        ResourceData {
            schema,
            id: String::new(),
            config: Some(config),
            prior: Map::new(),
            values: Map::new(),
        }
    }

    /// Data for an update: `state` is what the last run stored.
    pub fn from_state(
        schema: Schema,
        state: Map<String, Value>,
        config: Map<String, Value>,
    ) -> ResourceData {
        let mut d = ResourceData::from_prior(schema, state);
        d.config = Some(config);
        d
    }

    /// Data for a refresh or destroy: only the stored state is known.
    pub fn from_prior(schema: Schema, mut state: Map<String, Value>) -> ResourceData {
        let id = match state.remove("id") {
            Some(Value::String(id)) => id,
            _ => String::new(),
        };
        ResourceData {
            schema,
            id,
            config: None,
            prior: state,
            values: Map::new(),
        }
    }

    /// Data for an import: only the id is known.
    pub fn from_id(schema: Schema, id: &str) -> ResourceData {
        ResourceData {
            schema,
            id: id.to_string(),
            config: None,
            prior: Map::new(),
            values: Map::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the id; an empty id marks the resource as gone.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    fn configured(&self, key: &str) -> Option<&Value> {
        self.config
            .as_ref()
            .and_then(|config| config.get(key))
            .filter(|v| !v.is_null())
    }

    /// The value written by the handler, then configuration, then prior
    /// state. With configuration present only computed attributes fall back
    /// to the prior state.
    fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(v) = self.values.get(key) {
            return Some(v);
        }
        if let Some(v) = self.configured(key) {
            return Some(v);
        }
        let use_prior = match (&self.config, self.schema.get(key)) {
            (None, Some(_)) => true,
            (Some(_), Some(attr)) => attr.computed,
            _ => false,
        };
        if use_prior {
            self.prior.get(key).filter(|v| !v.is_null())
        } else {
            None
        }
    }

    /// Current value, or the attribute's zero value when unset.
    pub fn get(&self, key: &str) -> Value {
        match (self.lookup(key), self.schema.get(key)) {
            (Some(v), _) if !v.is_null() => v.clone(),
            (_, Some(attr)) => attr.kind.zero_value(),
            _ => Value::Null,
        }
    }

    /// Value when set to something other than the zero value.
    pub fn get_ok(&self, key: &str) -> Option<Value> {
        let value = self.get(key);
        match self.schema.get(key) {
            Some(attr) if !attr.kind.is_zero(&value) => Some(value),
            _ => None,
        }
    }

    /// Value when explicitly present, including `false` and `0`.
    pub fn get_ok_exists(&self, key: &str) -> Option<Value> {
        self.lookup(key).filter(|v| !v.is_null()).cloned()
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get(key).as_str().unwrap_or_default().to_string()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).as_bool().unwrap_or_default()
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).as_i64().unwrap_or_default()
    }

    /// Elements of a list or set of strings, in stored order.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn get_string_map(&self, key: &str) -> BTreeMap<String, String> {
        match self.get(key) {
            Value::Object(entries) => entries
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// True when the configured value differs from the prior state.
    ///
    /// Computed attributes left out of the configuration keep their prior
    /// value and never count as changed.
    pub fn has_change(&self, key: &str) -> bool {
        let Some(attr) = self.schema.get(key) else {
            return false;
        };
        let configured = self.configured(key);
        if configured.is_none() && attr.computed {
            return false;
        }
        let canonical = |v: Option<&Value>| match v {
            Some(v) if !attr.kind.is_zero(v) => attr.kind.normalize(v.clone()),
            _ => attr.kind.zero_value(),
        };
        canonical(configured) != canonical(self.prior.get(key))
    }

    /// Write an attribute into state.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), SetError> {
        let attr = self
            .schema
            .get(key)
            .ok_or_else(|| SetError::UnknownAttribute(key.to_string()))?;
        let value = serde_json::to_value(value).map_err(|source| SetError::Serialize {
            key: key.to_string(),
            source,
        })?;
        attr.kind.check(&value).map_err(|message| SetError::Type {
            key: key.to_string(),
            message,
        })?;
        let value = attr.kind.normalize(value);
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Full state: `id` plus every schema attribute.
    pub fn state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("id".to_string(), Value::String(self.id.clone()));
        for (name, attr) in self.schema.iter() {
            let value = match self.lookup(name) {
                Some(v) => v.clone(),
                None => match attr.kind {
                    AttributeType::String | AttributeType::Bool | AttributeType::Int => Value::Null,
                    _ => attr.kind.zero_value(),
                },
            };
            state.insert(name.to_string(), value);
        }
        state
    }
}
