/*
 * merge_rules.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Identity-keyed sequence merging as a pass.
 */

use crate::Result;
use crate::mutator::{Mutator, MutatorContext};
use bundle_dyn::Value;
use bundle_dyn::merge::apply_merge_rules;

/// Collapse records that share an identity key, per the configured
/// merge rule table (tasks by `task_key`, clusters by `label`, ...).
pub struct MergeSequencesByKey;

impl Mutator for MergeSequencesByKey {
    fn name(&self) -> &str {
        "MergeSequencesByKey"
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        let rules = ctx.settings.merge_rules()?;
        Ok(apply_merge_rules(tree, &rules)?)
    }
}
