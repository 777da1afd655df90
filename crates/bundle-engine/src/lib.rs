/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Bundle configuration engine.
 */

//! Bundle configuration engine.
//!
//! Passes over a bundle configuration tree ([`bundle_dyn::Value`]):
//!
//! - [`mutator`] - the [`Mutator`] trait and sequential [`Pipeline`]
//! - [`selection`] - run a pipeline on some resources and merge them back
//! - [`permissions`] - permission resolution passes
//! - [`MergeSequencesByKey`] - identity-keyed merging of record lists
//! - [`settings`] - the tables every pass consults
//!
//! The engine neither reads files nor talks to remote services: it takes a
//! tree and returns a tree, plus warnings in [`MutatorContext::diagnostics`].
//!
//! # Example
//!
//! ```
//! use bundle_dyn::Value;
//! use bundle_engine::permissions::{ApplyBundlePermissions, CurrentUser, FilterCurrentUser, ReducePermissions};
//! use bundle_engine::{MutatorContext, Pipeline};
//! use serde_json::json;
//!
//! let tree = Value::from_json(json!({
//!     "permissions": [{"level": "CAN_VIEW", "group_name": "analysts"}],
//!     "resources": {"jobs": {"etl": {}}}
//! }));
//!
//! let pipeline = Pipeline::new()
//!     .with(ApplyBundlePermissions)
//!     .with(ReducePermissions)
//!     .with(FilterCurrentUser);
//! let mut ctx = MutatorContext::default().with_current_user(CurrentUser::user("me@example.com"));
//! let tree = pipeline.run(tree, &mut ctx).unwrap();
//!
//! assert_eq!(
//!     tree.to_json()["resources"]["jobs"]["etl"]["permissions"],
//!     json!([{"level": "CAN_VIEW", "group_name": "analysts"}])
//! );
//! ```

pub mod error;
pub mod merge_rules;
pub mod mutator;
pub mod permissions;
pub mod resources;
pub mod selection;
pub mod settings;

pub use error::{Error, Result};
pub use merge_rules::MergeSequencesByKey;
pub use mutator::{FnMutator, Mutator, MutatorContext, Pipeline, from_fn};
pub use resources::{ResourceKey, ResourceKeySet};
pub use selection::{apply_to_selected, merge_resources, select_resources};
pub use settings::{EngineSettings, MergeRuleSpec, PermissionSettings, TypeSettings};
