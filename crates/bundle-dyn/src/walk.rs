//! Generic pre-order traversal of value trees.
//!
//! [`walk`] rebuilds the tree from the callback's decisions; the input is
//! consumed and a new tree is returned. [`walk_read_only`] visits borrowed
//! nodes for scans that never rewrite.
//!
//! # Example
//!
//! ```rust
//! use bundle_dyn::{Value, Visit, walk};
//! use serde_json::json;
//!
//! let tree = Value::from_json(json!({"keep": 1, "secret": 2}));
//! let tree = walk(tree, |path, value| {
//!     if path.last().and_then(|c| c.key()) == Some("secret") {
//!         return Ok::<_, ()>(Visit::Drop);
//!     }
//!     Ok(Visit::Continue(value))
//! })
//! .unwrap();
//! assert!(tree.get("secret").is_none());
//! ```

use crate::{Mapping, Path, Value, ValueKind};

/// What the walker does with a node after the callback has seen it.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Replace the node with this value and descend into its children.
    Continue(Value),

    /// Use this value for the node but do not descend into it.
    ///
    /// Returning the value the callback received keeps the node unchanged.
    Skip(Value),

    /// Remove the node from its parent mapping or sequence.
    ///
    /// Dropping the root yields an invalid value.
    Drop,
}

/// Walk `root` depth-first in pre-order, calling `f` at every node.
///
/// The callback receives the node's path and the node itself and decides
/// via [`Visit`] whether to replace it and descend, stop below it, or drop
/// it. Children are visited in order (mapping insertion order, sequence
/// index order). The first error returned by `f` aborts the walk.
pub fn walk<F, E>(root: Value, mut f: F) -> Result<Value, E>
where
    F: FnMut(&Path, Value) -> Result<Visit, E>,
{
    let mut path = Path::new();
    Ok(walk_node(root, &mut path, &mut f)?.unwrap_or_else(Value::invalid))
}

fn walk_node<F, E>(node: Value, path: &mut Path, f: &mut F) -> Result<Option<Value>, E>
where
    F: FnMut(&Path, Value) -> Result<Visit, E>,
{
    let node = match f(path, node)? {
        Visit::Continue(value) => value,
        Visit::Skip(value) => return Ok(Some(value)),
        Visit::Drop => return Ok(None),
    };

    let Value { kind, locations } = node;
    let kind = match kind {
        ValueKind::Mapping(entries) => {
            let mut out = Mapping::with_capacity(entries.len());
            for (key, child) in entries {
                path.push_key(key.as_str());
                let child = walk_node(child, path, f);
                path.pop();
                if let Some(child) = child? {
                    out.insert(key, child);
                }
            }
            ValueKind::Mapping(out)
        }
        ValueKind::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, child) in items.into_iter().enumerate() {
                path.push_index(index);
                let child = walk_node(child, path, f);
                path.pop();
                if let Some(child) = child? {
                    out.push(child);
                }
            }
            ValueKind::Sequence(out)
        }
        scalar => scalar,
    };

    Ok(Some(Value { kind, locations }))
}

/// Visit every node of `root` in pre-order without rewriting anything.
///
/// The callback returns `Ok(true)` to descend into the node's children and
/// `Ok(false)` to skip them.
pub fn walk_read_only<F, E>(root: &Value, mut f: F) -> Result<(), E>
where
    F: FnMut(&Path, &Value) -> Result<bool, E>,
{
    let mut path = Path::new();
    walk_node_read_only(root, &mut path, &mut f)
}

fn walk_node_read_only<F, E>(node: &Value, path: &mut Path, f: &mut F) -> Result<(), E>
where
    F: FnMut(&Path, &Value) -> Result<bool, E>,
{
    if !f(path, node)? {
        return Ok(());
    }

    match &node.kind {
        ValueKind::Mapping(entries) => {
            for (key, child) in entries {
                path.push_key(key.as_str());
                let result = walk_node_read_only(child, path, f);
                path.pop();
                result?;
            }
        }
        ValueKind::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push_index(index);
                let result = walk_node_read_only(child, path, f);
                path.pop();
                result?;
            }
        }
        _ => {}
    }
    Ok(())
}
