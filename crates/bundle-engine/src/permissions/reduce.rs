/*
 * reduce.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-principal permission reduction.
 */

use super::permission::Permission;
use super::{resource_pattern, rewrite_permissions};
use crate::Result;
use crate::mutator::{Mutator, MutatorContext};
use crate::settings::PermissionSettings;
use bundle_dyn::{Path, Value};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::cmp::Ordering;

/// Keep one entry per principal on every resource.
pub struct ReducePermissions;

impl Mutator for ReducePermissions {
    fn name(&self) -> &str {
        "ReducePermissions"
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        let settings = &ctx.settings.permissions;
        rewrite_permissions(tree, &resource_pattern(None), |path, entries| {
            let reduced = reduce_permissions(entries, settings, path)?;
            Ok((reduced.len() != entries.len()).then_some(reduced))
        })
    }
}

/// Reduce `entries` to the highest ranked entry per principal.
///
/// The surviving entry takes the position where its principal first
/// appeared. Ranking is [`PermissionSettings::compare_levels`]; on a full
/// tie the earlier entry stays.
pub fn reduce_permissions(
    entries: &[Value],
    settings: &PermissionSettings,
    path: &Path,
) -> Result<Vec<Value>> {
    let mut kept: IndexMap<_, (String, &Value)> = IndexMap::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let permission = Permission::from_value(entry, &path.index(i))?;
        match kept.entry(permission.principal) {
            Entry::Vacant(slot) => {
                slot.insert((permission.level, entry));
            }
            Entry::Occupied(mut slot) => {
                let (level, _) = slot.get();
                if settings.compare_levels(&permission.level, level) == Ordering::Greater {
                    tracing::trace!(
                        principal = %slot.key(),
                        from = %level,
                        to = %permission.level,
                        %path,
                        "raising permission level"
                    );
                    slot.insert((permission.level, entry));
                }
            }
        }
    }
    Ok(kept.into_values().map(|(_, entry)| entry.clone()).collect())
}
