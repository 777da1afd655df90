//! Core diagnostic message types.
//!
//! This module defines the structures for representing diagnostic messages
//! (errors, warnings, info) produced while processing a configuration tree.

use bundle_dyn::{Location, Path};
use serde::Serialize;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A problem that does not prevent completion
    Warning,
    /// Informational message
    Info,
}

/// How detail items should be presented (x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    /// Error detail (✖ bullet)
    Error,
    /// Info detail (ℹ bullet)
    Info,
    /// Note detail (plain bullet)
    Note,
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailItem {
    pub kind: DetailKind,

    pub content: String,

    /// Where in the configuration this detail applies, when it differs from
    /// the message's own location (e.g. the other half of an overlap).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A diagnostic message.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "B-2-1") for searchability
/// 2. **Title**: Brief message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: What went wrong
/// 5. **Details**: Specific information, bulleted
/// 6. **Hints**: Optional guidance for fixing
/// 7. **Path / locations**: Where in the tree and in which documents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DetailItem>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// Tree path the diagnostic is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// Source locations of the offending value (all contributing documents)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Consider using [`crate::DiagnosticMessageBuilder`] for anything with
    /// details or a location.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            path: None,
            locations: Vec::new(),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code.
    ///
    /// # Example
    ///
    /// ```
    /// use bundle_error_reporting::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::warning("Permission overlap").with_code("B-2-1");
    /// assert_eq!(msg.code.as_deref(), Some("B-2-1"));
    /// ```
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Get the documentation URL for this message, if its code has one.
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Render this diagnostic message as text.
    ///
    /// Format:
    /// ```text
    /// Warning [B-2-1]: title
    ///   at resources.jobs.etl.permissions
    ///   in bundle.yml:10:7
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// • Note detail
    /// ? Hint
    /// ```
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        let kind_str = match self.kind {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
        };
        result.push_str(kind_str);
        if let Some(code) = &self.code {
            result.push_str(&format!(" [{}]", code));
        }
        result.push_str(&format!(": {}\n", self.title));

        if let Some(path) = &self.path {
            result.push_str(&format!("  at {}\n", path));
        }
        for location in &self.locations {
            result.push_str(&format!("  in {}\n", location));
        }

        if let Some(problem) = &self.problem {
            result.push_str(&format!("{}\n", problem));
        }

        for detail in &self.details {
            let bullet = match detail.kind {
                DetailKind::Error => "✖",
                DetailKind::Info => "ℹ",
                DetailKind::Note => "•",
            };
            match &detail.location {
                Some(location) => {
                    result.push_str(&format!("{} {} ({})\n", bullet, detail.content, location))
                }
                None => result.push_str(&format!("{} {}\n", bullet, detail.content)),
            }
        }

        for hint in &self.hints {
            result.push_str(&format!("? {}\n", hint));
        }

        result
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// # Example
    ///
    /// ```
    /// use bundle_error_reporting::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::warning("Something looks off");
    /// let json = msg.to_json();
    /// assert_eq!(json["kind"], "warning");
    /// assert_eq!(json["title"], "Something looks off");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        assert_eq!(DiagnosticMessage::error("x").kind, DiagnosticKind::Error);
        assert_eq!(DiagnosticMessage::warning("x").kind, DiagnosticKind::Warning);
        assert_eq!(DiagnosticMessage::info("x").kind, DiagnosticKind::Info);
        assert!(DiagnosticMessage::error("x").is_error());
        assert!(!DiagnosticMessage::warning("x").is_error());
    }

    #[test]
    fn test_to_text_minimal() {
        let msg = DiagnosticMessage::error("Something failed").with_code("B-0-1");
        assert_eq!(msg.to_text(), "Error [B-0-1]: Something failed\n");
    }

    #[test]
    fn test_to_json_omits_empty_fields() {
        let mut msg = DiagnosticMessage::warning("Overlap");
        msg.path = Some("resources.jobs.etl".parse().unwrap());
        msg.locations.push(Location::new("bundle.yml", 3, 5));

        assert_eq!(
            msg.to_json(),
            json!({
                "title": "Overlap",
                "kind": "warning",
                "path": "resources.jobs.etl",
                "locations": [{"file": "bundle.yml", "line": 3, "column": 5}]
            })
        );
    }
}
