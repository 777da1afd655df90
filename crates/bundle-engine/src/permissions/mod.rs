/*
 * permissions/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Permission passes.
 */

//! Permission resolution.
//!
//! Resources carry a `permissions` list of entries, each granting a level
//! to exactly one principal. The passes here keep those lists
//! unambiguous:
//!
//! - [`ApplyBundlePermissions`] - copy the bundle-wide `permissions` onto
//!   every resource, translating levels per resource type
//! - [`EnsureOwnerPermissions`] - make the current user the owner (or at
//!   least a manager) of every resource
//! - [`ReducePermissions`] - keep one entry per principal, the highest
//!   ranked one
//! - [`FilterCurrentUser`] - remove the current user's entries
//!
//! Ordering matters: [`FilterCurrentUser`] must run after
//! [`ApplyBundlePermissions`], otherwise it cannot remove what the
//! bundle-wide list granted to the current user.

mod bundle;
mod filter;
pub mod level;
mod owner;
mod permission;
mod reduce;

pub use bundle::{ApplyBundlePermissions, permission_overlaps};
pub use filter::FilterCurrentUser;
pub use level::score_by_longest_prefix;
pub use owner::{EnsureOwnerPermissions, ensure_owner};
pub use permission::{CurrentUser, Permission, Principal, parse_permissions};
pub use reduce::{ReducePermissions, reduce_permissions};

use crate::resources::RESOURCES_KEY;
use crate::{Error, Result};
use bundle_dyn::{Kind, Path, Pattern, PatternComponent, Value, ValueKind, map_by_pattern, set_by_path};

pub const PERMISSIONS_KEY: &str = "permissions";

/// `resources.<type>.*`, or `resources.*.*` without a type.
pub(crate) fn resource_pattern(resource_type: Option<&str>) -> Pattern {
    let type_component = match resource_type {
        Some(resource_type) => PatternComponent::Key(resource_type.to_string()),
        None => PatternComponent::AnyKey,
    };
    Pattern::new(vec![
        PatternComponent::Key(RESOURCES_KEY.to_string()),
        type_component,
        PatternComponent::AnyKey,
    ])
}

/// The entries of a `permissions` field; absent or nil is empty.
pub(crate) fn permission_entries<'a>(resource: &'a Value, path: &Path) -> Result<&'a [Value]> {
    let Some(permissions) = resource.get(PERMISSIONS_KEY) else {
        return Ok(&[]);
    };
    match &permissions.kind {
        ValueKind::Sequence(entries) => Ok(entries),
        ValueKind::Nil | ValueKind::Invalid => Ok(&[]),
        _ => Err(bundle_dyn::Error::KindMismatch {
            path: path.key(PERMISSIONS_KEY),
            expected: Kind::Sequence,
            found: permissions.kind(),
        }
        .into()),
    }
}

/// Rewrite the `permissions` list of every resource matching `pattern`.
///
/// `f` receives the path of the list and its entries and returns the new
/// entries, or `None` to leave the resource untouched. Nil resources are
/// skipped.
pub(crate) fn rewrite_permissions<F>(tree: Value, pattern: &Pattern, mut f: F) -> Result<Value>
where
    F: FnMut(&Path, &[Value]) -> Result<Option<Vec<Value>>>,
{
    map_by_pattern(tree, pattern, |path, resource| {
        match resource.kind {
            ValueKind::Mapping(_) => {}
            ValueKind::Nil | ValueKind::Invalid => return Ok(resource),
            _ => {
                return Err(Error::from(bundle_dyn::Error::KindMismatch {
                    path: path.clone(),
                    expected: Kind::Mapping,
                    found: resource.kind(),
                }));
            }
        }

        let permissions_path = path.key(PERMISSIONS_KEY);
        let entries = permission_entries(&resource, path)?;
        let Some(updated) = f(&permissions_path, entries)? else {
            return Ok(resource);
        };

        let locations = resource
            .get(PERMISSIONS_KEY)
            .map(|permissions| permissions.locations.clone())
            .unwrap_or_default();
        let permissions = Value::sequence(updated).with_locations(locations);
        Ok(set_by_path(
            resource,
            &Path::from_keys([PERMISSIONS_KEY]),
            permissions,
        )?)
    })
}
