/*
 * resources.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Resource keys and key sets.
 */

//! Resource addressing.
//!
//! A resource is one entry under `resources.<type>.<name>`. A
//! [`ResourceKeySet`] remembers which resources a batch should touch; it is
//! usually built by scanning a tree, and the difference between two scans
//! gives the resources a batch added.

use bundle_dyn::{Path, PathComponent, Pattern, PatternComponent, Value, visit_by_pattern};
use indexmap::{IndexMap, IndexSet};
use std::convert::Infallible;
use std::fmt;

pub const RESOURCES_KEY: &str = "resources";

/// Pattern matching every resource instance: `resources.*.*`.
pub fn resources_pattern() -> Pattern {
    Pattern::new(vec![
        PatternComponent::Key(RESOURCES_KEY.to_string()),
        PatternComponent::AnyKey,
        PatternComponent::AnyKey,
    ])
}

/// Address of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub resource_type: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Path of the resource in the tree.
    pub fn path(&self) -> Path {
        Path::from_keys([RESOURCES_KEY, self.resource_type.as_str(), self.name.as_str()])
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Resource keys grouped by type, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceKeySet {
    by_type: IndexMap<String, IndexSet<String>>,
}

impl ResourceKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the keys of every resource in `tree`.
    pub fn from_tree(tree: &Value) -> Self {
        let mut keys = Self::new();
        visit_by_pattern(tree, &resources_pattern(), |path, _| {
            if let [_, PathComponent::Key(resource_type), PathComponent::Key(name)] =
                path.components()
            {
                keys.add(resource_type.clone(), name.clone());
            }
            Ok::<_, Infallible>(())
        })
        .unwrap_or_else(|never| match never {});
        keys
    }

    /// Add a key. Returns `false` if it was already present.
    pub fn add(&mut self, resource_type: impl Into<String>, name: impl Into<String>) -> bool {
        self.by_type
            .entry(resource_type.into())
            .or_default()
            .insert(name.into())
    }

    /// Add every key of `other`, keeping this set's order for known keys.
    pub fn extend(&mut self, other: &ResourceKeySet) {
        for key in other.iter() {
            self.add(key.resource_type, key.name);
        }
    }

    /// Names selected for `resource_type`, in insertion order.
    pub fn names(&self, resource_type: &str) -> impl Iterator<Item = &str> {
        self.by_type
            .get(resource_type)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    pub fn contains(&self, resource_type: &str, name: &str) -> bool {
        self.by_type
            .get(resource_type)
            .is_some_and(|names| names.contains(name))
    }

    pub fn contains_key(&self, key: &ResourceKey) -> bool {
        self.contains(&key.resource_type, &key.name)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.by_type.iter().flat_map(|(resource_type, names)| {
            names
                .iter()
                .map(move |name| ResourceKey::new(resource_type.clone(), name.clone()))
        })
    }

    pub fn to_vec(&self) -> Vec<ResourceKey> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in `self` that are not in `older`.
    ///
    /// With `self` scanned after a batch and `older` before it, this is
    /// what the batch added.
    pub fn difference(&self, older: &ResourceKeySet) -> ResourceKeySet {
        self.iter().filter(|key| !older.contains_key(key)).collect()
    }
}

impl FromIterator<ResourceKey> for ResourceKeySet {
    fn from_iter<I: IntoIterator<Item = ResourceKey>>(iter: I) -> Self {
        let mut keys = Self::new();
        for key in iter {
            keys.add(key.resource_type, key.name);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        Value::from_json(json!({
            "bundle": {"name": "demo"},
            "resources": {
                "jobs": {"etl": {}, "report": {}},
                "pipelines": {"ingest": {}},
                "alerts": {}
            }
        }))
    }

    #[test]
    fn test_from_tree_scans_every_resource() {
        let keys = ResourceKeySet::from_tree(&tree());
        assert_eq!(
            keys.to_vec(),
            vec![
                ResourceKey::new("jobs", "etl"),
                ResourceKey::new("jobs", "report"),
                ResourceKey::new("pipelines", "ingest"),
            ]
        );
        assert_eq!(keys.types().collect::<Vec<_>>(), ["jobs", "pipelines"]);
    }

    #[test]
    fn test_from_tree_without_resources() {
        let keys = ResourceKeySet::from_tree(&Value::from_json(json!({"bundle": {}})));
        assert!(keys.is_empty());
    }

    #[test]
    fn test_add_is_union() {
        let mut keys = ResourceKeySet::new();
        assert!(keys.add("jobs", "a"));
        assert!(!keys.add("jobs", "a"));
        keys.add("jobs", "b");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.names("jobs").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(keys.names("pipelines").count(), 0);
    }

    #[test]
    fn test_extend_and_contains() {
        let mut a: ResourceKeySet = [ResourceKey::new("jobs", "a")].into_iter().collect();
        let b: ResourceKeySet = [ResourceKey::new("jobs", "a"), ResourceKey::new("models", "m")]
            .into_iter()
            .collect();
        a.extend(&b);
        assert_eq!(a.len(), 2);
        assert!(a.contains("models", "m"));
        assert!(!a.contains("models", "x"));
    }

    #[test]
    fn test_difference_is_what_a_batch_added() {
        let before = ResourceKeySet::from_tree(&tree());
        let mut after = before.clone();
        after.add("jobs", "new_job");
        after.add("alerts", "cpu");

        let added = after.difference(&before);
        assert_eq!(
            added.to_vec(),
            vec![ResourceKey::new("jobs", "new_job"), ResourceKey::new("alerts", "cpu")]
        );
    }

    #[test]
    fn test_key_path() {
        let key = ResourceKey::new("jobs", "etl");
        assert_eq!(key.path().to_string(), "resources.jobs.etl");
        assert_eq!(key.to_string(), "jobs.etl");
    }
}
