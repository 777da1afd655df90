/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for bundle-engine.
 */

//! Error types for bundle-engine

use bundle_dyn::Path;
use bundle_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Structural problem in the tree (wrong kind, missing key, bad identity key).
    #[error(transparent)]
    Dyn(#[from] bundle_dyn::Error),

    /// A bundle-wide permission level is not in the allow-list.
    #[error("invalid permission level: {level}, allowed values: [{}]", .allowed.join(", "))]
    InvalidPermissionLevel { level: String, allowed: Vec<String> },

    /// A permission entry does not name exactly one principal.
    #[error("invalid permission at {path}: {message}")]
    InvalidPermission { path: Path, message: String },

    #[error("{pass} requires the current user to be set")]
    MissingCurrentUser { pass: String },

    /// The mutated resources could not be written back into the snapshot.
    #[error("failed to update resources")]
    MergeBack {
        #[source]
        source: bundle_dyn::Error,
    },

    #[error("invalid engine settings: {0}")]
    Settings(#[from] serde_yaml::Error),
}

impl Error {
    /// Catalog code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Dyn(bundle_dyn::Error::CannotMerge { .. }) => "B-1-2",
            Error::Dyn(_) => "B-1-1",
            Error::InvalidPermissionLevel { .. } => "B-2-2",
            Error::InvalidPermission { .. } => "B-2-3",
            Error::MergeBack { .. } => "B-3-1",
            Error::Settings(_) => "B-4-1",
            Error::MissingCurrentUser { .. } => "B-0-1",
        }
    }

    /// Convert into an error diagnostic carrying the catalog code.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let mut builder = DiagnosticMessageBuilder::error(self.to_string()).with_code(self.code());
        match self {
            Error::Dyn(err) => {
                if let Some(path) = dyn_error_path(err) {
                    builder = builder.at_path(path.clone());
                }
            }
            Error::InvalidPermission { path, .. } => {
                builder = builder
                    .at_path(path.clone())
                    .add_hint("Set exactly one of user_name, group_name or service_principal_name?");
            }
            Error::MergeBack { source } => {
                builder = builder.add_detail(source.to_string());
            }
            _ => {}
        }
        builder.build()
    }
}

fn dyn_error_path(err: &bundle_dyn::Error) -> Option<&Path> {
    match err {
        bundle_dyn::Error::NoSuchKey { path }
        | bundle_dyn::Error::IndexOutOfBounds { path, .. }
        | bundle_dyn::Error::KindMismatch { path, .. }
        | bundle_dyn::Error::CannotMerge { path, .. }
        | bundle_dyn::Error::InvalidIdentityKey { path, .. } => Some(path),
        bundle_dyn::Error::InvalidPath { .. } => None,
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_dyn::Kind;

    #[test]
    fn test_invalid_level_message_lists_allowed() {
        let err = Error::InvalidPermissionLevel {
            level: "CAN_DO_EVERYTHING".to_string(),
            allowed: vec!["CAN_MANAGE".into(), "CAN_VIEW".into(), "CAN_RUN".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid permission level: CAN_DO_EVERYTHING, allowed values: [CAN_MANAGE, CAN_VIEW, CAN_RUN]"
        );
        assert_eq!(err.code(), "B-2-2");
    }

    #[test]
    fn test_structural_error_diagnostic_has_path() {
        let err = Error::from(bundle_dyn::Error::KindMismatch {
            path: "resources.jobs".parse().unwrap(),
            expected: Kind::Mapping,
            found: Kind::String,
        });
        let diag = err.to_diagnostic();
        assert!(diag.is_error());
        assert_eq!(diag.code.as_deref(), Some("B-1-1"));
        assert_eq!(diag.path.as_ref().map(ToString::to_string).as_deref(), Some("resources.jobs"));
    }

    #[test]
    fn test_merge_back_wraps_source() {
        let err = Error::MergeBack {
            source: bundle_dyn::Error::NoSuchKey {
                path: "resources".parse().unwrap(),
            },
        };
        assert_eq!(err.to_string(), "failed to update resources");
        insta::assert_snapshot!(err.to_diagnostic().to_text(), @r"
        Error [B-3-1]: failed to update resources
        ✖ key not found at resources
        ");
    }
}
