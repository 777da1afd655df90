/*
 * selection.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Run passes against a subset of resources and merge the result back.
 */

//! Selection and snapshot merge-back.
//!
//! [`apply_to_selected`] lets a batch of passes see only some resources:
//!
//! 1. the full tree is kept as the snapshot,
//! 2. [`select_resources`] projects out the selected resources,
//! 3. the pipeline runs on the projection,
//! 4. [`merge_resources`] writes the mutated resources back into the
//!    snapshot.
//!
//! Resources outside the selection are never seen by the batch, so they
//! come back unchanged. Changes the batch makes outside `resources` are
//! discarded.

use crate::mutator::{MutatorContext, Pipeline};
use crate::resources::{RESOURCES_KEY, ResourceKeySet};
use crate::{Error, Result};
use bundle_dyn::{Kind, Mapping, Path, Value, ValueKind, get_by_path, set_by_path};

/// Project `tree` onto the resources in `keys`.
///
/// Every top-level key other than `resources` is kept as is. Under
/// `resources` only the selected types remain, and within them only the
/// selected names. A type with no selected resource present is omitted.
/// Keys that do not exist in the tree are ignored.
pub fn select_resources(tree: &Value, keys: &ResourceKeySet) -> Value {
    let Some(root) = tree.as_mapping() else {
        return tree.clone();
    };

    let mut selected = Mapping::with_capacity(root.len());
    for (key, value) in root {
        if key == RESOURCES_KEY {
            selected.insert(key.clone(), select_types(value, keys));
        } else {
            selected.insert(key.clone(), value.clone());
        }
    }
    Value::mapping(selected).with_locations(tree.locations.clone())
}

fn select_types(resources: &Value, keys: &ResourceKeySet) -> Value {
    let Some(types) = resources.as_mapping() else {
        return resources.clone();
    };

    let mut selected = Mapping::new();
    for (resource_type, instances) in types {
        let Some(instances) = instances.as_mapping() else {
            continue;
        };
        let names: Mapping = instances
            .iter()
            .filter(|(name, _)| keys.contains(resource_type, name))
            .map(|(name, resource)| (name.clone(), resource.clone()))
            .collect();
        if names.is_empty() {
            continue;
        }
        let locations = types[resource_type].locations.clone();
        selected.insert(
            resource_type.clone(),
            Value::mapping(names).with_locations(locations),
        );
    }
    Value::mapping(selected).with_locations(resources.locations.clone())
}

/// Write the resources of `mutated` back into `snapshot`.
///
/// Each resource is set at its exact path. When its type is missing from
/// the snapshot the whole type mapping is set instead, and when the
/// snapshot has no `resources` at all that key is set. Resources present in
/// the snapshot but not in `mutated` are left alone.
///
/// # Errors
///
/// Structural errors while setting a resource or type propagate as is.
/// Failing to set `resources` itself is [`Error::MergeBack`].
pub fn merge_resources(mutated: &Value, snapshot: Value) -> Result<Value> {
    let resources_path = Path::from_keys([RESOURCES_KEY]);
    let Some(types) = mutated.get(RESOURCES_KEY).and_then(Value::as_mapping) else {
        return Ok(snapshot);
    };

    let mut tree = snapshot;

    // Resource by resource, deferring types the snapshot lacks.
    let mut missing_types = Vec::new();
    for (resource_type, instances) in types {
        let type_path = resources_path.key(resource_type.as_str());
        if !exists(&tree, &type_path)? {
            tracing::trace!(%type_path, "type missing from snapshot, deferring");
            missing_types.push(resource_type);
            continue;
        }
        let Some(instances) = instances.as_mapping() else {
            continue;
        };
        for (name, resource) in instances {
            tree = set_by_path(tree, &type_path.key(name.as_str()), resource.clone())?;
        }
    }

    if missing_types.is_empty() {
        return Ok(tree);
    }

    // Whole types, deferring if `resources` itself is missing.
    if exists(&tree, &resources_path)? {
        for resource_type in missing_types {
            tree = set_by_path(
                tree,
                &resources_path.key(resource_type.as_str()),
                types[resource_type].clone(),
            )?;
        }
        return Ok(tree);
    }

    tracing::trace!("resources missing from snapshot, setting it whole");
    let resources = mutated
        .get(RESOURCES_KEY)
        .cloned()
        .unwrap_or_else(Value::invalid);
    set_by_path(tree, &resources_path, resources).map_err(|source| Error::MergeBack { source })
}

/// Whether a container exists at `path`.
///
/// A missing key, or a nil or invalid node on the way, counts as absent.
/// Other structural errors propagate.
fn exists(tree: &Value, path: &Path) -> Result<bool> {
    match get_by_path(tree, path) {
        Ok(value) => Ok(!matches!(value.kind, ValueKind::Invalid | ValueKind::Nil)),
        Err(bundle_dyn::Error::NoSuchKey { .. }) => Ok(false),
        Err(bundle_dyn::Error::KindMismatch {
            found: Kind::Nil | Kind::Invalid,
            ..
        }) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Run `pipeline` on the resources in `keys` only and merge the result
/// back into `tree`.
pub fn apply_to_selected(
    tree: Value,
    keys: &ResourceKeySet,
    pipeline: &Pipeline,
    ctx: &mut MutatorContext,
) -> Result<Value> {
    tracing::debug!(
        resources = keys.len(),
        mutators = pipeline.len(),
        "Applying mutators to selected resources"
    );
    let selected = select_resources(&tree, keys);
    let mutated = pipeline.run(selected, ctx)?;
    merge_resources(&mutated, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKey;
    use bundle_dyn::Location;
    use serde_json::json;

    fn tree() -> Value {
        Value::from_json(json!({
            "bundle": {"name": "demo"},
            "resources": {
                "jobs": {"etl": {"name": "ETL"}, "report": {"name": "Report"}},
                "pipelines": {"ingest": {"name": "Ingest"}}
            }
        }))
    }

    fn keys(items: &[(&str, &str)]) -> ResourceKeySet {
        items
            .iter()
            .map(|(t, n)| ResourceKey::new(*t, *n))
            .collect()
    }

    #[test]
    fn test_select_keeps_only_selected() {
        let selected = select_resources(&tree(), &keys(&[("jobs", "etl"), ("models", "m")]));
        assert_eq!(
            selected.to_json(),
            json!({
                "bundle": {"name": "demo"},
                "resources": {"jobs": {"etl": {"name": "ETL"}}}
            })
        );
    }

    #[test]
    fn test_select_empty_set() {
        let selected = select_resources(&tree(), &ResourceKeySet::new());
        assert_eq!(
            selected.to_json(),
            json!({"bundle": {"name": "demo"}, "resources": {}})
        );
    }

    #[test]
    fn test_select_keeps_locations() {
        let loc = Location::new("bundle.yml", 1, 1);
        let tree = tree().with_locations(vec![loc.clone()]);
        let selected = select_resources(&tree, &keys(&[("jobs", "etl")]));
        assert_eq!(selected.location(), Some(&loc));
    }

    #[test]
    fn test_merge_sets_each_resource() {
        let mutated = Value::from_json(json!({
            "resources": {"jobs": {"etl": {"name": "ETL v2"}}}
        }));
        let merged = merge_resources(&mutated, tree()).unwrap();
        assert_eq!(
            merged.to_json(),
            json!({
                "bundle": {"name": "demo"},
                "resources": {
                    "jobs": {"etl": {"name": "ETL v2"}, "report": {"name": "Report"}},
                    "pipelines": {"ingest": {"name": "Ingest"}}
                }
            })
        );
    }

    #[test]
    fn test_merge_sets_missing_type() {
        let mutated = Value::from_json(json!({
            "resources": {"models": {"m": {"name": "M"}}}
        }));
        let merged = merge_resources(&mutated, tree()).unwrap();
        assert_eq!(
            merged.get("resources").and_then(|r| r.get("models")).map(Value::to_json),
            Some(json!({"m": {"name": "M"}}))
        );
        assert!(merged.get("resources").and_then(|r| r.get("jobs")).is_some());
    }

    #[test]
    fn test_merge_sets_missing_resources() {
        let mutated = Value::from_json(json!({
            "resources": {"jobs": {"etl": {"name": "ETL"}}}
        }));
        let snapshot = Value::from_json(json!({"bundle": {"name": "demo"}}));
        let merged = merge_resources(&mutated, snapshot).unwrap();
        assert_eq!(
            merged.to_json(),
            json!({
                "bundle": {"name": "demo"},
                "resources": {"jobs": {"etl": {"name": "ETL"}}}
            })
        );
    }

    #[test]
    fn test_merge_ignores_changes_outside_resources() {
        let mutated = Value::from_json(json!({"bundle": {"name": "changed"}, "resources": {}}));
        let merged = merge_resources(&mutated, tree()).unwrap();
        assert_eq!(merged, tree());
    }

    #[test]
    fn test_merge_into_non_mapping_snapshot_fails() {
        let mutated = Value::from_json(json!({"resources": {"jobs": {"etl": {}}}}));
        let err = merge_resources(&mutated, Value::from("not a tree")).unwrap_err();
        assert!(matches!(err, Error::Dyn(bundle_dyn::Error::KindMismatch { .. })));
    }

    #[test]
    fn test_merge_replaces_nil_resources() {
        let mutated = Value::from_json(json!({"resources": {"jobs": {"etl": {}}}}));
        let snapshot = Value::from_json(json!({"bundle": {}, "resources": null}));
        let merged = merge_resources(&mutated, snapshot).unwrap();
        assert_eq!(
            merged.to_json(),
            json!({"bundle": {}, "resources": {"jobs": {"etl": {}}}})
        );
    }

    #[test]
    fn test_merge_into_invalid_snapshot_is_merge_back_error() {
        let mutated = Value::from_json(json!({"resources": {"jobs": {"etl": {}}}}));
        let err = merge_resources(&mutated, Value::invalid()).unwrap_err();
        assert!(matches!(err, Error::MergeBack { .. }));
        assert_eq!(err.to_string(), "failed to update resources");
    }
}
