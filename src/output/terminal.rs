//! Terminal output utilities.
//!
//! Renders state as aligned `key = "value"` lines and diagnostics in color.

use crate::diag::Diagnostics;
use crate::schema::flatmap;
use colored::Colorize;
use serde_json::{Map, Value};

/// Quote a flattened value, escaping embedded quotes and control characters.
pub fn quote_value(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Render state as one flattened attribute per line, keys aligned.
pub fn render_state(name: &str, state: &Map<String, Value>) -> String {
    let flat = flatmap::flatten(state);
    let id = flat.get("id").map(String::as_str).unwrap_or_default();
    let key_width = flat.keys().map(|k| k.len()).max().unwrap_or(0);

    let mut out = format!("# {}.{}\n", name.bold(), id);
    for (key, value) in &flat {
        out.push_str(&format!("  {key:<key_width$} = {}\n", quote_value(value)));
    }
    out
}

/// Render diagnostics with the label in red.
pub fn render_diagnostics(diags: &Diagnostics) -> String {
    diags
        .iter()
        .map(|d| {
            let label = "Error".red().bold();
            let mut line = format!("{label}: ");
            if let Some(attribute) = &d.attribute {
                line.push_str(&format!("{}: ", attribute.cyan()));
            }
            line.push_str(&d.summary);
            if let Some(detail) = &d.detail {
                line.push_str(&format!("\n\n  {detail}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("test"), "\"test\"");
        assert_eq!(quote_value("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_value("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn test_render_state() {
        colored::control::set_override(false);
        let state = json!({"id": "p1", "name": "pool", "prefixes": ["10.10.0.0/16"]});
        let out = render_state("openstack_networking_subnetpool_v2", state.as_object().unwrap());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "# openstack_networking_subnetpool_v2.p1");
        assert_eq!(lines[1], "  id         = \"p1\"");
        assert_eq!(lines[3], "  prefixes.# = \"1\"");
        assert_eq!(lines[4], "  prefixes.0 = \"10.10.0.0/16\"");
    }

    #[test]
    fn test_render_diagnostics() {
        colored::control::set_override(false);
        let diags = Diagnostics::error_with_detail("No Trunk found", "Your query returned no results.");
        assert_eq!(
            render_diagnostics(&diags),
            "Error: No Trunk found\n\n  Your query returned no results."
        );
    }
}
