//! Reading and writing single locations by path.

use crate::{Error, Kind, Path, PathComponent, Result, Value, ValueKind};

/// Get the value at `path`.
///
/// # Errors
///
/// - [`Error::NoSuchKey`] if a mapping key along the path is absent. This is
///   distinct from a key that exists with a nil value.
/// - [`Error::IndexOutOfBounds`] if a sequence index is out of range.
/// - [`Error::KindMismatch`] if the path descends into a node of the wrong kind.
pub fn get_by_path<'a>(root: &'a Value, path: &Path) -> Result<&'a Value> {
    let mut node = root;
    for (depth, component) in path.components().iter().enumerate() {
        node = match component {
            PathComponent::Key(key) => {
                let entries = node.as_mapping().ok_or_else(|| Error::KindMismatch {
                    path: path.prefix(depth),
                    expected: Kind::Mapping,
                    found: node.kind(),
                })?;
                entries.get(key).ok_or_else(|| Error::NoSuchKey {
                    path: path.prefix(depth + 1),
                })?
            }
            PathComponent::Index(index) => {
                let items = node.as_sequence().ok_or_else(|| Error::KindMismatch {
                    path: path.prefix(depth),
                    expected: Kind::Sequence,
                    found: node.kind(),
                })?;
                items.get(*index).ok_or_else(|| Error::IndexOutOfBounds {
                    path: path.prefix(depth),
                    index: *index,
                    len: items.len(),
                })?
            }
        };
    }
    Ok(node)
}

/// Return a new tree with the value at `path` replaced by `value`.
///
/// The final key of a mapping may be new; every ancestor must already
/// exist. Structure is never synthesized: callers that need a missing
/// ancestor create it first.
///
/// # Errors
///
/// [`Error::NoSuchKey`] names the first missing ancestor, so callers can
/// fall back to setting that ancestor instead.
pub fn set_by_path(root: Value, path: &Path, value: Value) -> Result<Value> {
    set_at(root, path, 0, value)
}

fn set_at(node: Value, path: &Path, depth: usize, value: Value) -> Result<Value> {
    let Some(component) = path.components().get(depth) else {
        return Ok(value);
    };
    let is_last = depth + 1 == path.len();

    match component {
        PathComponent::Key(key) => {
            let found = node.kind();
            let Some((mut entries, locations)) = node.into_mapping() else {
                return Err(Error::KindMismatch {
                    path: path.prefix(depth),
                    expected: Kind::Mapping,
                    found,
                });
            };
            if is_last {
                entries.insert(key.clone(), value);
            } else {
                let slot = entries.get_mut(key).ok_or_else(|| Error::NoSuchKey {
                    path: path.prefix(depth + 1),
                })?;
                let child = std::mem::take(slot);
                *slot = set_at(child, path, depth + 1, value)?;
            }
            Ok(Value::mapping(entries).with_locations(locations))
        }
        PathComponent::Index(index) => {
            let found = node.kind();
            let Some((mut items, locations)) = node.into_sequence() else {
                return Err(Error::KindMismatch {
                    path: path.prefix(depth),
                    expected: Kind::Sequence,
                    found,
                });
            };
            let len = items.len();
            let slot = items.get_mut(*index).ok_or_else(|| Error::IndexOutOfBounds {
                path: path.prefix(depth),
                index: *index,
                len,
            })?;
            let child = std::mem::take(slot);
            *slot = set_at(child, path, depth + 1, value)?;
            Ok(Value::new(ValueKind::Sequence(items)).with_locations(locations))
        }
    }
}
