//! # bundle-dyn
//!
//! Dynamic configuration values with source location tracking.
//!
//! This crate provides [`Value`], a closed sum type over the kinds a
//! configuration document can hold (nil, bool, number, string, sequence,
//! mapping) plus an explicit `Invalid` marker for "absent". Every node
//! carries the [`Location`]s it was declared at; a node produced by merging
//! several documents keeps the locations of all of them.
//!
//! ## Addressing
//!
//! - [`Path`]: a concrete location (`resources.jobs.my_job.tasks[0]`)
//! - [`Pattern`]: a path template with wildcards (`resources.*.*`)
//!
//! ## Transformations
//!
//! Nothing is mutated in place. Every transformation consumes or borrows a
//! value and returns a new one:
//!
//! - [`walk`]: pre-order traversal with [`Visit`] control (continue, skip, drop)
//! - [`map_by_pattern`]: rewrite every node matching a [`Pattern`]
//! - [`merge::merge`]: recursive merge of two trees
//! - [`merge::elements_by_key`]: identity-based sequence merging
//!
//! ## Example
//!
//! ```rust
//! use bundle_dyn::{Path, Value, get_by_path, set_by_path};
//! use serde_json::json;
//!
//! let tree = Value::from_json(json!({"resources": {"jobs": {"etl": {"name": "ETL"}}}}));
//! let path: Path = "resources.jobs.etl.name".parse().unwrap();
//!
//! let tree = set_by_path(tree, &path, Value::from("Nightly ETL")).unwrap();
//! assert_eq!(get_by_path(&tree, &path).unwrap().as_str(), Some("Nightly ETL"));
//! ```

mod access;
mod error;
mod json;
mod location;
mod path;
mod pattern;
mod pattern_map;
mod value;
mod walk;

pub mod merge;

pub use access::{get_by_path, set_by_path};
pub use error::{Error, Result};
pub use location::Location;
pub use path::{Path, PathComponent};
pub use pattern::{Pattern, PatternComponent};
pub use pattern_map::{map_by_path, map_by_pattern, visit_by_pattern};
pub use value::{Kind, Mapping, Number, Value, ValueKind};
pub use walk::{Visit, walk, walk_read_only};
