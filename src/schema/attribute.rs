//! Attribute and schema declarations.

use crate::diag::Diagnostics;
use crate::models::Cidr;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Validates a scalar value, or each element of a collection.
pub type ValidateFn = fn(&Value) -> Result<(), String>;

/// Value type of an attribute.
#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    List(Box<AttributeType>),
    /// Unordered, unique elements; stored sorted.
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Nested object, used as a list element.
    Block(Schema),
}

impl AttributeType {
    /// Zero value used when an attribute is unset.
    pub fn zero_value(&self) -> Value {
        match self {
            AttributeType::String => json!(""),
            AttributeType::Bool => json!(false),
            AttributeType::Int => json!(0),
            AttributeType::List(_) | AttributeType::Set(_) => json!([]),
            AttributeType::Map(_) | AttributeType::Block(_) => json!({}),
        }
    }

    /// True when `value` is null or equal to the zero value.
    pub fn is_zero(&self, value: &Value) -> bool {
        value.is_null() || *value == self.zero_value()
    }

    /// Check that `value` conforms to this type. `null` is accepted anywhere.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (_, Value::Null) => Ok(()),
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),
            (AttributeType::Int, Value::Number(n)) if n.is_i64() => Ok(()),
            (AttributeType::List(elem), Value::Array(items))
            | (AttributeType::Set(elem), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    elem.check(item).map_err(|e| format!("element {i}: {e}"))?;
                }
                Ok(())
            }
            (AttributeType::Map(elem), Value::Object(entries)) => {
                for (k, v) in entries {
                    elem.check(v).map_err(|e| format!("key {k}: {e}"))?;
                }
                Ok(())
            }
            (AttributeType::Block(schema), Value::Object(entries)) => {
                for (k, v) in entries {
                    let attr = schema
                        .get(k)
                        .ok_or_else(|| format!("unexpected attribute {k}"))?;
                    attr.kind.check(v).map_err(|e| format!("{k}: {e}"))?;
                }
                Ok(())
            }
            (kind, other) => Err(format!("{kind} required, got {}", json_type(other))),
        }
    }

    /// Bring a value into canonical form: sets sorted and de-duplicated.
    pub fn normalize(&self, value: Value) -> Value {
        match (self, value) {
            (AttributeType::Set(elem), Value::Array(items)) => {
                let mut items: Vec<Value> = items.into_iter().map(|v| elem.normalize(v)).collect();
                items.sort_by_key(|v| v.to_string());
                items.dedup();
                Value::Array(items)
            }
            (AttributeType::List(elem), Value::Array(items)) => {
                Value::Array(items.into_iter().map(|v| elem.normalize(v)).collect())
            }
            (_, value) => value,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::Int => write!(f, "number"),
            AttributeType::List(elem) => write!(f, "list({elem})"),
            AttributeType::Set(elem) => write!(f, "set({elem})"),
            AttributeType::Map(elem) => write!(f, "map({elem})"),
            AttributeType::Block(_) => write!(f, "object"),
        }
    }
}

/// One attribute of a schema.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value requires a new remote object.
    pub force_new: bool,
    pub validate: Option<ValidateFn>,
}

impl Attribute {
    pub fn new(kind: AttributeType) -> Attribute {
        Attribute {
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            validate: None,
        }
    }

    pub fn string() -> Attribute {
        Attribute::new(AttributeType::String)
    }

    pub fn bool() -> Attribute {
        Attribute::new(AttributeType::Bool)
    }

    pub fn int() -> Attribute {
        Attribute::new(AttributeType::Int)
    }

    pub fn list(elem: AttributeType) -> Attribute {
        Attribute::new(AttributeType::List(Box::new(elem)))
    }

    pub fn set(elem: AttributeType) -> Attribute {
        Attribute::new(AttributeType::Set(Box::new(elem)))
    }

    pub fn map(elem: AttributeType) -> Attribute {
        Attribute::new(AttributeType::Map(Box::new(elem)))
    }

    /// List of nested blocks.
    pub fn block_list(schema: Schema) -> Attribute {
        Attribute::list(AttributeType::Block(schema))
    }

    pub fn required(mut self) -> Attribute {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Attribute {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Attribute {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Attribute {
        self.force_new = true;
        self
    }

    pub fn with_validation(mut self, validate: ValidateFn) -> Attribute {
        self.validate = Some(validate);
        self
    }

    /// Computed and not settable by the user.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn run_validation(&self, value: &Value) -> Result<(), String> {
        let Some(validate) = self.validate else {
            return Ok(());
        };
        match value {
            Value::Array(items) => items.iter().try_for_each(validate),
            Value::Object(entries) => entries.values().try_for_each(validate),
            Value::Null => Ok(()),
            scalar => validate(scalar),
        }
    }
}

/// Attributes of a resource or data source, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Schema {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    /// Check user configuration against the schema, collecting every problem.
    pub fn validate_config(&self, config: &Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for key in config.keys() {
            if !self.attributes.contains_key(key.as_str()) {
                diags.attribute_error(key, format!("An argument named \"{key}\" is not expected here"));
            }
        }

        for (name, attr) in self.iter() {
            let value = config.get(name).filter(|v| !v.is_null());
            let Some(value) = value else {
                if attr.required {
                    diags.attribute_error(
                        name,
                        format!("The argument \"{name}\" is required, but no definition was found"),
                    );
                }
                continue;
            };
            if attr.is_computed_only() {
                diags.attribute_error(name, format!("\"{name}\" is computed and cannot be set"));
                continue;
            }
            if let Err(e) = attr.kind.check(value) {
                diags.attribute_error(name, format!("Incorrect attribute value type: {e}"));
                continue;
            }
            if let Err(e) = attr.run_validation(value) {
                diags.attribute_error(name, e);
            }
        }

        diags
    }

    /// JSON description of the schema, for display.
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        for (name, attr) in self.iter() {
            let mut entry = Map::new();
            entry.insert("type".into(), json!(attr.kind.to_string()));
            for (flag, set) in [
                ("required", attr.required),
                ("optional", attr.optional),
                ("computed", attr.computed),
                ("force_new", attr.force_new),
            ] {
                if set {
                    entry.insert(flag.into(), json!(true));
                }
            }
            if let AttributeType::List(elem) | AttributeType::Set(elem) = &attr.kind {
                if let AttributeType::Block(nested) = elem.as_ref() {
                    entry.insert("block".into(), nested.describe());
                }
            }
            out.insert(name.to_string(), Value::Object(entry));
        }
        Value::Object(out)
    }
}

/// Validate a string in CIDR notation.
pub fn validate_cidr(value: &Value) -> Result<(), String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("expected a CIDR string, got {value}"))?;
    let cidr = Cidr::new(s).map_err(|e| e.to_string())?;
    if !cidr.is_network_address() {
        return Err(format!("{s} has host bits set; expected a network address"));
    }
    Ok(())
}
