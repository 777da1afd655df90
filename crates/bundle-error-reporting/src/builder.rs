//! Builder API for diagnostic messages.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
use bundle_dyn::{Location, Path};

/// Builder for [`DiagnosticMessage`].
///
/// # Example
///
/// ```
/// use bundle_error_reporting::DiagnosticMessageBuilder;
///
/// let msg = DiagnosticMessageBuilder::warning("Permission overlap")
///     .with_code("B-2-1")
///     .problem("`group:admins` is granted permissions in two places")
///     .add_detail("Resource declares CAN_VIEW")
///     .add_hint("Remove one of the declarations?")
///     .build();
/// assert_eq!(msg.details.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
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

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    /// Set the problem statement (what went wrong).
    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    /// Add an error detail (✖).
    pub fn add_detail(self, content: impl Into<String>) -> Self {
        self.push_detail(DetailKind::Error, content.into(), None)
    }

    /// Add an error detail pointing at another location.
    pub fn add_detail_at(self, content: impl Into<String>, location: Location) -> Self {
        self.push_detail(DetailKind::Error, content.into(), Some(location))
    }

    /// Add an info detail (ℹ).
    pub fn add_info(self, content: impl Into<String>) -> Self {
        self.push_detail(DetailKind::Info, content.into(), None)
    }

    /// Add a note detail (•).
    pub fn add_note(self, content: impl Into<String>) -> Self {
        self.push_detail(DetailKind::Note, content.into(), None)
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    /// Set the tree path the message is about.
    pub fn at_path(mut self, path: Path) -> Self {
        self.message.path = Some(path);
        self
    }

    /// Add source locations of the offending value.
    pub fn with_locations<'a>(mut self, locations: impl IntoIterator<Item = &'a Location>) -> Self {
        for location in locations {
            if !self.message.locations.contains(location) {
                self.message.locations.push(location.clone());
            }
        }
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }

    fn push_detail(mut self, kind: DetailKind, content: String, location: Option<Location>) -> Self {
        self.message.details.push(DetailItem {
            kind,
            content,
            location,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_full_text() {
        let msg = DiagnosticMessageBuilder::warning("Permission overlap")
            .with_code("B-2-1")
            .at_path("resources.jobs.etl.permissions".parse().unwrap())
            .with_locations(&[Location::new("bundle.yml", 10, 7)])
            .problem("group `admins` already has permissions on this resource")
            .add_detail_at("bundle-wide level CAN_MANAGE", Location::new("bundle.yml", 2, 5))
            .add_info("resource level CAN_VIEW")
            .add_note("the bundle-wide entry was not applied")
            .add_hint("Remove one of the entries?")
            .build();

        insta::assert_snapshot!(msg.to_text(), @r"
        Warning [B-2-1]: Permission overlap
          at resources.jobs.etl.permissions
          in bundle.yml:10:7
        group `admins` already has permissions on this resource
        ✖ bundle-wide level CAN_MANAGE (bundle.yml:2:5)
        ℹ resource level CAN_VIEW
        • the bundle-wide entry was not applied
        ? Remove one of the entries?
        ");
    }

    #[test]
    fn test_with_locations_deduplicates() {
        let loc = Location::new("a.yml", 1, 1);
        let msg = DiagnosticMessageBuilder::info("x")
            .with_locations(&[loc.clone()])
            .with_locations(&[loc.clone()])
            .build();
        assert_eq!(msg.locations, vec![loc]);
    }
}
