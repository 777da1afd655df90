//! Pattern-scoped rewriting built on the walker.

use crate::{Path, Pattern, Value, Visit, walk, walk_read_only};

/// Rewrite every node whose path matches `pattern`.
///
/// `f` is called once per matching path with the node at that path and its
/// return value replaces the node entirely. Subtrees whose path cannot be a
/// prefix of a match are skipped without being visited, so the cost is
/// bounded by the part of the tree the pattern can reach.
///
/// Rewrites should be fixed-point safe: applying the same rewrite to its own
/// output must not change it further.
///
/// # Example
///
/// ```rust
/// use bundle_dyn::{Pattern, Value, map_by_pattern};
/// use serde_json::json;
///
/// let tree = Value::from_json(json!({"resources": {"jobs": {"a": {}}, "pipelines": {"b": {}}}}));
/// let pattern: Pattern = "resources.*.*".parse().unwrap();
///
/// let mut seen = Vec::new();
/// map_by_pattern(tree, &pattern, |path, value| {
///     seen.push(path.to_string());
///     Ok::<_, ()>(value)
/// })
/// .unwrap();
/// assert_eq!(seen, ["resources.jobs.a", "resources.pipelines.b"]);
/// ```
pub fn map_by_pattern<F, E>(root: Value, pattern: &Pattern, mut f: F) -> Result<Value, E>
where
    F: FnMut(&Path, Value) -> Result<Value, E>,
{
    walk(root, |path, value| {
        if pattern.matches(path) {
            return f(path, value).map(Visit::Skip);
        }
        if pattern.matches_prefix(path) {
            Ok(Visit::Continue(value))
        } else {
            Ok(Visit::Skip(value))
        }
    })
}

/// Call `f` for every node whose path matches `pattern`, without rewriting.
pub fn visit_by_pattern<F, E>(root: &Value, pattern: &Pattern, mut f: F) -> Result<(), E>
where
    F: FnMut(&Path, &Value) -> Result<(), E>,
{
    walk_read_only(root, |path, value| {
        if pattern.matches(path) {
            f(path, value)?;
            return Ok(false);
        }
        Ok(pattern.matches_prefix(path))
    })
}

/// Rewrite the node at exactly `path`.
///
/// If nothing exists at `path` the tree is returned unchanged and `f` is
/// not called.
pub fn map_by_path<F, E>(root: Value, path: &Path, f: F) -> Result<Value, E>
where
    F: FnMut(&Path, Value) -> Result<Value, E>,
{
    map_by_pattern(root, &Pattern::from(path), f)
}
