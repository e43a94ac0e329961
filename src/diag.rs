//! Diagnostics returned to the user by provider handlers.

use serde::Serialize;
use std::fmt;

/// Build an error [`Diagnostics`] from a format string.
///
/// ```
/// use openstack_networking_provider::diag_error;
/// let diags = diag_error!("Unable to list Routers: {}", "timeout");
/// assert_eq!(diags.to_string(), "Error: Unable to list Routers: timeout");
/// ```
#[macro_export]
macro_rules! diag_error {
    ($($arg:tt)*) => {
        $crate::diag::Diagnostics::error(format!($($arg)*))
    };
}

/// A single user-facing error.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Attribute the message is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: ")?;
        if let Some(attribute) = &self.attribute {
            write!(f, "{attribute}: ")?;
        }
        write!(f, "{}", self.summary)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics(Vec::new())
    }

    pub fn error(summary: impl Into<String>) -> Diagnostics {
        Diagnostics(vec![Diagnostic {
            summary: summary.into(),
            detail: None,
            attribute: None,
        }])
    }

    pub fn error_with_detail(summary: impl Into<String>, detail: impl Into<String>) -> Diagnostics {
        Diagnostics(vec![Diagnostic {
            summary: summary.into(),
            detail: Some(detail.into()),
            attribute: None,
        }])
    }

    /// Record an error about `attribute`.
    pub fn attribute_error(&mut self, attribute: &str, summary: impl Into<String>) {
        self.0.push(Diagnostic {
            summary: summary.into(),
            detail: None,
            attribute: Some(attribute.to_string()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// `Err(self)` unless empty.
    pub fn into_result(self) -> Result<(), Diagnostics> {
        if !self.is_empty() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diags = Diagnostics::error_with_detail(
            "No Trunk found",
            "Your query returned no results.",
        );
        assert_eq!(
            diags.to_string(),
            "Error: No Trunk found: Your query returned no results."
        );

        let mut diags = Diagnostics::new();
        diags.attribute_error("prefixes", "is required");
        diags.attribute_error("min_prefixlen", "8 is greater than max_prefixlen 4");
        assert_eq!(
            diags.to_string(),
            "Error: prefixes: is required\nError: min_prefixlen: 8 is greater than max_prefixlen 4"
        );
    }

    #[test]
    fn test_into_result() {
        let mut diags = Diagnostics::new();
        assert!(diags.clone().into_result().is_ok());
        diags.attribute_error("prefixes", "is required");
        assert_eq!(diags.len(), 1);
        assert!(diags.into_result().is_err());
        assert!(diag_error!("Error getting {}", "x").into_result().is_err());
    }
}
