//! Merging of value trees and identity-keyed sequences.
//!
//! [`merge`] combines two trees recursively: mappings field-wise, sequences
//! by concatenation, scalars by letting the later value win.
//!
//! Sequences of records (jobs' tasks, clusters, parameters) need a
//! different treatment: records that share an identity key describe the
//! same thing and must collapse into one. [`elements_by_key`] does that
//! under one of three [`MergePolicy`] variants. Which policy applies to
//! which field is decided by the caller through a table of [`MergeRule`]s;
//! nothing here infers it.
//!
//! # Example
//!
//! ```rust
//! use bundle_dyn::Value;
//! use bundle_dyn::merge::{MergePolicy, elements_by_key, key_field};
//! use serde_json::json;
//!
//! let tasks = vec![
//!     Value::from_json(json!({"task_key": "x", "retries": 1})),
//!     Value::from_json(json!({"task_key": "y"})),
//!     Value::from_json(json!({"task_key": "x", "timeout": 60})),
//! ];
//! let merged = elements_by_key(tasks, key_field("task_key"), MergePolicy::DeepMerge).unwrap();
//! assert_eq!(merged.len(), 2);
//! assert_eq!(merged[0].get("timeout").and_then(Value::as_int), Some(60));
//! ```

use crate::{Error, Kind, Path, Pattern, Result, Value, ValueKind, map_by_pattern};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How records sharing an identity key are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The first record with a key keeps its position; later records with
    /// the same key are merged into it with [`merge`].
    #[default]
    DeepMerge,

    /// Same merge semantics as `DeepMerge`, but output is ordered by key so
    /// it does not depend on input order.
    SortedDeepMerge,

    /// A later record with the same key replaces the earlier one entirely,
    /// at the earlier one's position.
    Override,
}

/// Merge `b` into `a`.
///
/// - mapping + mapping: field-wise, recursively
/// - sequence + sequence: `b`'s items appended to `a`'s
/// - scalar + scalar: `b` wins
/// - either side invalid: the other side
/// - container + nil: the container is kept
///
/// Locations of both sides are retained. A merged container keeps `a`'s
/// locations first; an overridden scalar lists `b`'s first.
///
/// # Errors
///
/// [`Error::CannotMerge`] when a container meets a value of another kind.
pub fn merge(a: Value, b: Value) -> Result<Value> {
    merge_at(a, b, &mut Path::new())
}

fn merge_at(a: Value, b: Value, path: &mut Path) -> Result<Value> {
    if !a.is_valid() {
        return Ok(b);
    }
    if !b.is_valid() {
        return Ok(a);
    }

    let (left, right) = (a.kind(), b.kind());
    match (a.kind, b.kind) {
        (ValueKind::Mapping(mut entries), ValueKind::Mapping(other)) => {
            for (key, value) in other {
                match entries.get_mut(&key) {
                    Some(slot) => {
                        path.push_key(key.as_str());
                        let existing = std::mem::take(slot);
                        let merged = merge_at(existing, value, path);
                        path.pop();
                        *slot = merged?;
                    }
                    None => {
                        entries.insert(key, value);
                    }
                }
            }
            Ok(Value::mapping(entries)
                .with_locations(a.locations)
                .add_locations(&b.locations))
        }
        (ValueKind::Sequence(mut items), ValueKind::Sequence(other)) => {
            items.extend(other);
            Ok(Value::sequence(items)
                .with_locations(a.locations)
                .add_locations(&b.locations))
        }
        (kind @ (ValueKind::Mapping(_) | ValueKind::Sequence(_)), ValueKind::Nil) => {
            Ok(Value::new(kind)
                .with_locations(a.locations)
                .add_locations(&b.locations))
        }
        (ValueKind::Mapping(_) | ValueKind::Sequence(_), _)
        | (_, ValueKind::Mapping(_) | ValueKind::Sequence(_))
            if left != Kind::Nil =>
        {
            Err(Error::CannotMerge {
                path: path.clone(),
                left,
                right,
            })
        }
        (_, kind) => Ok(Value::new(kind)
            .with_locations(b.locations)
            .add_locations(&a.locations)),
    }
}

/// Build a key extractor reading the string field `field` of each record.
///
/// An absent or nil field (or a record that is not a mapping) yields the
/// empty key, meaning "no identity, never merge". Any other non-string
/// kind is an error: identity keys are user-declared string labels.
pub fn key_field(field: &str) -> impl Fn(&Value) -> Result<String> + '_ {
    move |record: &Value| match record.get(field) {
        None => Ok(String::new()),
        Some(value) => match &value.kind {
            ValueKind::Invalid | ValueKind::Nil => Ok(String::new()),
            ValueKind::String(s) => Ok(s.clone()),
            _ => Err(Error::InvalidIdentityKey {
                path: Path::from_keys([field]),
                found: value.kind(),
            }),
        },
    }
}

/// Collapse records that share an identity key according to `policy`.
///
/// Records with an empty key are unique and keep their place.
pub fn elements_by_key<K>(elements: Vec<Value>, key: K, policy: MergePolicy) -> Result<Vec<Value>>
where
    K: Fn(&Value) -> Result<String>,
{
    elements_by_key_at(&Path::new(), elements, &key, policy)
}

/// Concatenate `a` and `b` and collapse records sharing an identity key.
pub fn merge_sequences_by_key<K>(
    a: Vec<Value>,
    b: Vec<Value>,
    key: K,
    policy: MergePolicy,
) -> Result<Vec<Value>>
where
    K: Fn(&Value) -> Result<String>,
{
    let mut elements = a;
    elements.extend(b);
    elements_by_key(elements, key, policy)
}

fn elements_by_key_at<K>(
    base: &Path,
    elements: Vec<Value>,
    key: &K,
    policy: MergePolicy,
) -> Result<Vec<Value>>
where
    K: Fn(&Value) -> Result<String>,
{
    let mut out: Vec<Value> = Vec::with_capacity(elements.len());
    let mut keys: Vec<String> = Vec::with_capacity(elements.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, element) in elements.into_iter().enumerate() {
        let k = key(&element).map_err(|err| relocate(err, &base.index(index)))?;
        if k.is_empty() {
            out.push(element);
            keys.push(k);
            continue;
        }
        match seen.get(&k) {
            Some(&position) => {
                tracing::trace!(key = %k, path = %base, ?policy, "combining duplicate element");
                let combined = match policy {
                    MergePolicy::Override => element,
                    MergePolicy::DeepMerge | MergePolicy::SortedDeepMerge => {
                        let existing = std::mem::take(&mut out[position]);
                        merge_at(existing, element, &mut base.index(position))?
                    }
                };
                out[position] = combined;
            }
            None => {
                seen.insert(k.clone(), out.len());
                out.push(element);
                keys.push(k);
            }
        }
    }

    if policy == MergePolicy::SortedDeepMerge {
        let mut keyed: Vec<(String, Value)> = keys.into_iter().zip(out).collect();
        keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
        out = keyed.into_iter().map(|(_, value)| value).collect();
    }

    Ok(out)
}

/// Prefix the path of a key extraction error with the record's path.
fn relocate(err: Error, record: &Path) -> Error {
    match err {
        Error::InvalidIdentityKey { path, found } => Error::InvalidIdentityKey {
            path: record.join(&path),
            found,
        },
        other => other,
    }
}

/// Which identity key and policy apply to the sequences matching `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    /// Location of the sequences, e.g. `resources.jobs.*.tasks`
    pub pattern: Pattern,

    /// Record field holding the identity key, e.g. `task_key`
    pub key: String,

    pub policy: MergePolicy,
}

impl MergeRule {
    pub fn new(pattern: Pattern, key: impl Into<String>, policy: MergePolicy) -> Self {
        Self {
            pattern,
            key: key.into(),
            policy,
        }
    }
}

/// Apply every rule in `rules` to `root`, in order.
///
/// Nil or absent sequences are left alone. A matched node that is neither
/// a sequence nor nil is a structural error.
pub fn apply_merge_rules(root: Value, rules: &[MergeRule]) -> Result<Value> {
    rules.iter().try_fold(root, |tree, rule| {
        let key = key_field(&rule.key);
        map_by_pattern(tree, &rule.pattern, |path, value| {
            let found = value.kind();
            match value.kind {
                ValueKind::Sequence(items) => {
                    let items = elements_by_key_at(path, items, &key, rule.policy)?;
                    Ok(Value::sequence(items).with_locations(value.locations))
                }
                ValueKind::Nil | ValueKind::Invalid => Ok(value),
                _ => Err(Error::KindMismatch {
                    path: path.clone(),
                    expected: Kind::Sequence,
                    found,
                }),
            }
        })
    })
}
