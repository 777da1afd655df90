//! Error reporting and diagnostic messages for bundle configuration.
//!
//! Fatal problems are returned as typed errors by the crates that detect
//! them. Everything that should be reported without stopping processing
//! (overlapping permissions, ignored declarations) becomes a
//! [`DiagnosticMessage`] collected in [`Diagnostics`].
//!
//! - [`DiagnosticMessage`]: the message structure (code, title, problem, details, hints)
//! - [`DiagnosticMessageBuilder`]: builder for well-structured messages
//! - [`Diagnostics`]: ordered collector passed through a pipeline
//! - [`catalog`]: error code metadata
//!
//! # Example
//!
//! ```
//! use bundle_error_reporting::{DiagnosticMessageBuilder, Diagnostics};
//!
//! let mut diags = Diagnostics::new();
//! diags.push(
//!     DiagnosticMessageBuilder::warning("Permission overlap")
//!         .with_code("B-2-1")
//!         .at_path("resources.jobs.etl.permissions".parse().unwrap())
//!         .build(),
//! );
//! assert!(!diags.has_errors());
//! ```

pub mod builder;
pub mod catalog;
pub mod collector;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_docs_url, get_error_info, get_subsystem};
pub use collector::Diagnostics;
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
