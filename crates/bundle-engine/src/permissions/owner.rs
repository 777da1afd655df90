/*
 * owner.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Owner invariant enforcement.
 */

use super::permission::{LEVEL_KEY, Permission, Principal, parse_permissions};
use super::{resource_pattern, rewrite_permissions};
use crate::Result;
use crate::mutator::{Mutator, MutatorContext};
use crate::settings::PermissionSettings;
use bundle_dyn::{Path, Value, set_by_path};

/// Make the current user the owner of every resource whose type supports
/// ownership, or at least a manager of every other configured resource.
pub struct EnsureOwnerPermissions;

impl Mutator for EnsureOwnerPermissions {
    fn name(&self) -> &str {
        "EnsureOwnerPermissions"
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        let principal = ctx.require_current_user(self.name())?.principal().clone();
        let settings = &ctx.settings.permissions;

        let mut tree = tree;
        for resource_type in settings.resource_types.keys() {
            let supports_owner = settings.supports_owner(resource_type);
            let pattern = resource_pattern(Some(resource_type.as_str()));
            tree = rewrite_permissions(tree, &pattern, |path, entries| {
                ensure_owner(entries, &principal, supports_owner, settings, path)
            })?;
        }
        Ok(tree)
    }
}

/// Enforce the owner invariant on one permission list.
///
/// - `principal` already owner: no change.
/// - ownership supported and nobody else is owner: the principal's manage
///   entry is raised to owner in place (failing that, its first entry);
///   with no entry at all an owner entry is appended.
/// - otherwise: unless the principal already ranks at least as manager, a
///   manage entry is appended.
///
/// Returns `None` when nothing changes.
pub fn ensure_owner(
    entries: &[Value],
    principal: &Principal,
    supports_owner: bool,
    settings: &PermissionSettings,
    path: &Path,
) -> Result<Option<Vec<Value>>> {
    let permissions = parse_permissions(entries, path)?;
    let owner = settings.owner_level.as_str();
    let manage = settings.manage_level.as_str();
    let is_mine = |p: &Permission| &p.principal == principal;

    if permissions.iter().any(|p| is_mine(p) && p.level == owner) {
        return Ok(None);
    }

    let owned_by_other = permissions.iter().any(|p| !is_mine(p) && p.level == owner);
    if supports_owner && !owned_by_other {
        let mut updated = entries.to_vec();
        let upgrade = permissions
            .iter()
            .position(|p| is_mine(p) && p.level == manage)
            .or_else(|| permissions.iter().position(is_mine));
        match upgrade {
            Some(i) => {
                tracing::trace!(%path, index = i, "upgrading entry to owner");
                updated[i] = with_level(entries[i].clone(), owner)?;
            }
            None => {
                tracing::trace!(%path, "appending owner entry");
                updated.push(Permission::new(owner, principal.clone()).to_value());
            }
        }
        return Ok(Some(updated));
    }

    let manage_score = settings.score(manage);
    if permissions
        .iter()
        .any(|p| is_mine(p) && settings.score(&p.level) >= manage_score)
    {
        return Ok(None);
    }
    tracing::trace!(%path, "appending manage entry");
    let mut updated = entries.to_vec();
    updated.push(Permission::new(manage, principal.clone()).to_value());
    Ok(Some(updated))
}

/// Replace the level of a permission entry, keeping the entry's other
/// fields and locations.
fn with_level(entry: Value, level: &str) -> Result<Value> {
    let locations = entry
        .get(LEVEL_KEY)
        .map(|old| old.locations.clone())
        .unwrap_or_default();
    Ok(set_by_path(
        entry,
        &Path::from_keys([LEVEL_KEY]),
        Value::from(level).with_locations(locations),
    )?)
}
