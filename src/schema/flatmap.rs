//! Flattened `key.index` view of a state map.
//!
//! Lists and sets gain a `<key>.#` count entry and maps a `<key>.%` entry,
//! followed by one entry per element (`prefixes.0`, `value_specs.foo`,
//! `routes.0.next_hop`). Null scalars are omitted.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub fn flatten(state: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in state {
        flatten_value(key, value, &mut out);
    }
    out
}

fn flatten_value(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Array(items) => {
            out.insert(format!("{prefix}.#"), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_value(&format!("{prefix}.{i}"), item, out);
            }
        }
        Value::Object(entries) => {
            out.insert(format!("{prefix}.%"), entries.len().to_string());
            for (k, v) in entries {
                flatten_value(&format!("{prefix}.{k}"), v, out);
            }
        }
        scalar => {
            out.insert(prefix.to_string(), scalar.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten() {
        let state = json!({
            "id": "p1",
            "prefixes": ["10.10.0.0/16", "10.11.11.0/24"],
            "default_quota": 4,
            "shared": false,
            "description": null,
            "value_specs": {"foo": "bar"},
            "routes": [{"destination_cidr": "10.0.0.0/24", "next_hop": "10.0.0.1"}]
        });
        let flat = flatten(state.as_object().unwrap());
        assert_eq!(flat["id"], "p1");
        assert_eq!(flat["prefixes.#"], "2");
        assert_eq!(flat["prefixes.1"], "10.11.11.0/24");
        assert_eq!(flat["default_quota"], "4");
        assert_eq!(flat["shared"], "false");
        assert!(!flat.contains_key("description"));
        assert_eq!(flat["value_specs.%"], "1");
        assert_eq!(flat["value_specs.foo"], "bar");
        assert_eq!(flat["routes.0.%"], "2");
        assert_eq!(flat["routes.0.next_hop"], "10.0.0.1");
    }
}
