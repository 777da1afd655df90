/*
 * filter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Removal of the current user's permission entries.
 */

use super::PERMISSIONS_KEY;
use super::permission::Principal;
use crate::Result;
use crate::mutator::{Mutator, MutatorContext};
use crate::resources::RESOURCES_KEY;
use bundle_dyn::{Pattern, PatternComponent, Value, Visit, walk};
use std::convert::Infallible;

/// Remove the current user's entries from every resource's permissions.
///
/// The deploying principal gets access implicitly, so explicit entries
/// for it are redundant. Entries that do not name exactly one principal
/// are left for the other passes to report.
pub struct FilterCurrentUser;

impl Mutator for FilterCurrentUser {
    fn name(&self) -> &str {
        "FilterCurrentUser"
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        let principal = ctx.require_current_user(self.name())?.principal();
        let entries = Pattern::new(vec![
            PatternComponent::Key(RESOURCES_KEY.to_string()),
            PatternComponent::AnyKey,
            PatternComponent::AnyKey,
            PatternComponent::Key(PERMISSIONS_KEY.to_string()),
            PatternComponent::AnyIndex,
        ]);

        let tree = walk(tree, |path, value| {
            if entries.matches(path) {
                if Principal::from_value(&value).as_ref() == Some(principal) {
                    tracing::trace!(%path, "removing current user entry");
                    return Ok(Visit::Drop);
                }
                return Ok(Visit::Skip(value));
            }
            if entries.matches_prefix(path) {
                Ok(Visit::Continue(value))
            } else {
                Ok(Visit::Skip(value))
            }
        })
        .unwrap_or_else(|never: Infallible| match never {});
        Ok(tree)
    }
}
