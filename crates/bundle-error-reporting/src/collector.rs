//! Accumulation of diagnostics across a processing pipeline.

use crate::diagnostic::{DiagnosticKind, DiagnosticMessage};

/// An ordered collection of diagnostics.
///
/// Passes push warnings here instead of failing; the collection travels
/// with the pipeline and is returned alongside a successful result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: DiagnosticMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = DiagnosticMessage>) {
        self.messages.extend(messages);
    }

    /// Check if any collected message is an error.
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(DiagnosticMessage::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.of_kind(DiagnosticKind::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.of_kind(DiagnosticKind::Warning)
    }

    fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter().filter(move |m| m.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_vec(self) -> Vec<DiagnosticMessage> {
        self.messages
    }

    /// Render every message as text, in collection order.
    pub fn to_text(&self) -> String {
        self.messages.iter().map(DiagnosticMessage::to_text).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticMessage;
    type IntoIter = std::vec::IntoIter<DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl FromIterator<DiagnosticMessage> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = DiagnosticMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}
