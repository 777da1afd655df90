/*
 * settings.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Engine configuration tables.
 */

//! Engine configuration.
//!
//! Every lookup table the passes consult (permission level remaps, level
//! scores, the bundle-wide allow-list, per-field merge policies) lives in
//! [`EngineSettings`] and is handed to the passes through the mutator
//! context. Nothing is compiled in as global state, so tests can
//! substitute their own tables.
//!
//! Settings deserialize from YAML; omitted sections keep their defaults:
//!
//! ```yaml
//! permissions:
//!   allowed_levels: [CAN_MANAGE, CAN_VIEW, CAN_RUN, IS_OWNER]
//! merge_rules:
//!   - pattern: resources.jobs.*.tasks
//!     key: task_key
//!     policy: deep_merge
//! ```

use crate::Result;
use crate::permissions::level::{default_scores, score_by_longest_prefix};
use bundle_dyn::merge::{MergePolicy, MergeRule};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const OWNER_LEVEL: &str = "IS_OWNER";
pub const MANAGE_LEVEL: &str = "CAN_MANAGE";
pub const VIEW_LEVEL: &str = "CAN_VIEW";
pub const RUN_LEVEL: &str = "CAN_RUN";

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub permissions: PermissionSettings,
    pub merge_rules: Vec<MergeRuleSpec>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            permissions: PermissionSettings::default(),
            merge_rules: default_merge_rules(),
        }
    }
}

impl EngineSettings {
    /// Parse settings from a YAML document.
    ///
    /// Merge rule patterns are checked here so a bad pattern is reported
    /// when the settings are loaded rather than when the pass runs.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: EngineSettings = serde_yaml::from_str(yaml)?;
        settings.merge_rules()?;
        Ok(settings)
    }

    /// The merge rule table with parsed patterns.
    pub fn merge_rules(&self) -> Result<Vec<MergeRule>> {
        self.merge_rules.iter().map(MergeRuleSpec::to_rule).collect()
    }
}

/// Tables consulted by the permission passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSettings {
    /// Level that marks a principal as the resource owner.
    pub owner_level: String,

    /// Level that grants full management without ownership.
    pub manage_level: String,

    /// Levels accepted in the bundle-wide `permissions` list.
    pub allowed_levels: Vec<String>,

    /// Per resource type: how bundle-wide levels map to the type's own
    /// levels, and whether the type has an owner level. Types missing here
    /// receive nothing from the bundle-wide list.
    pub resource_types: IndexMap<String, TypeSettings>,

    /// Rank of each known level; higher is more permissive.
    pub scores: IndexMap<String, i32>,
}

impl Default for PermissionSettings {
    fn default() -> Self {
        Self {
            owner_level: OWNER_LEVEL.to_string(),
            manage_level: MANAGE_LEVEL.to_string(),
            allowed_levels: vec![
                MANAGE_LEVEL.to_string(),
                VIEW_LEVEL.to_string(),
                RUN_LEVEL.to_string(),
            ],
            resource_types: default_resource_types(),
            scores: default_scores(),
        }
    }
}

impl PermissionSettings {
    /// Default tables, with the owner level also accepted bundle-wide.
    pub fn with_owner_level_allowed() -> Self {
        let mut settings = Self::default();
        settings.allowed_levels.push(settings.owner_level.clone());
        settings
    }

    pub fn is_allowed(&self, level: &str) -> bool {
        self.allowed_levels.iter().any(|allowed| allowed == level)
    }

    pub fn type_settings(&self, resource_type: &str) -> Option<&TypeSettings> {
        self.resource_types.get(resource_type)
    }

    pub fn supports_owner(&self, resource_type: &str) -> bool {
        self.type_settings(resource_type)
            .is_some_and(|t| t.supports_owner)
    }

    /// Translate a bundle-wide level into `resource_type`'s level.
    ///
    /// Returns `None` when the type is unknown or has no counterpart for
    /// the level. The owner level maps to itself on types that support it.
    pub fn remap_level(&self, resource_type: &str, level: &str) -> Option<&str> {
        let settings = self.type_settings(resource_type)?;
        if level == self.owner_level {
            return settings.supports_owner.then_some(self.owner_level.as_str());
        }
        settings.levels.get(level).map(String::as_str)
    }

    /// Rank of `level`: exact table entry, else the longest known prefix,
    /// else 0.
    pub fn score(&self, level: &str) -> i32 {
        self.scores
            .get(level)
            .copied()
            .or_else(|| score_by_longest_prefix(&self.scores, level))
            .unwrap_or(0)
    }

    /// Order two levels by score, then by string so the result does not
    /// depend on input order.
    pub fn compare_levels(&self, a: &str, b: &str) -> Ordering {
        self.score(a).cmp(&self.score(b)).then_with(|| a.cmp(b))
    }
}

/// Permission settings for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeSettings {
    /// Bundle-wide level to this type's level.
    pub levels: IndexMap<String, String>,

    pub supports_owner: bool,
}

impl TypeSettings {
    fn new(levels: &[(&str, &str)], supports_owner: bool) -> Self {
        Self {
            levels: levels
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            supports_owner,
        }
    }
}

fn default_resource_types() -> IndexMap<String, TypeSettings> {
    let mut types = IndexMap::new();
    types.insert(
        "jobs".to_string(),
        TypeSettings::new(
            &[
                (MANAGE_LEVEL, "CAN_MANAGE"),
                (VIEW_LEVEL, "CAN_VIEW"),
                (RUN_LEVEL, "CAN_MANAGE_RUN"),
            ],
            true,
        ),
    );
    types.insert(
        "pipelines".to_string(),
        TypeSettings::new(
            &[
                (MANAGE_LEVEL, "CAN_MANAGE"),
                (VIEW_LEVEL, "CAN_VIEW"),
                (RUN_LEVEL, "CAN_RUN"),
            ],
            true,
        ),
    );
    for name in ["experiments", "models"] {
        types.insert(
            name.to_string(),
            TypeSettings::new(&[(MANAGE_LEVEL, "CAN_MANAGE"), (VIEW_LEVEL, "CAN_READ")], false),
        );
    }
    types.insert(
        "model_serving_endpoints".to_string(),
        TypeSettings::new(
            &[
                (MANAGE_LEVEL, "CAN_MANAGE"),
                (VIEW_LEVEL, "CAN_VIEW"),
                (RUN_LEVEL, "CAN_QUERY"),
            ],
            false,
        ),
    );
    types
}

/// Serializable form of a [`MergeRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRuleSpec {
    /// Pattern string, e.g. `resources.jobs.*.tasks`
    pub pattern: String,

    /// Identity key field of the records
    pub key: String,

    #[serde(default)]
    pub policy: MergePolicy,
}

impl MergeRuleSpec {
    pub fn new(pattern: impl Into<String>, key: impl Into<String>, policy: MergePolicy) -> Self {
        Self {
            pattern: pattern.into(),
            key: key.into(),
            policy,
        }
    }

    pub fn to_rule(&self) -> Result<MergeRule> {
        Ok(MergeRule::new(
            self.pattern.parse()?,
            self.key.clone(),
            self.policy,
        ))
    }
}

fn default_merge_rules() -> Vec<MergeRuleSpec> {
    vec![
        MergeRuleSpec::new("resources.jobs.*.tasks", "task_key", MergePolicy::DeepMerge),
        MergeRuleSpec::new(
            "resources.jobs.*.job_clusters",
            "job_cluster_key",
            MergePolicy::DeepMerge,
        ),
        MergeRuleSpec::new("resources.jobs.*.parameters", "name", MergePolicy::Override),
        MergeRuleSpec::new(
            "resources.jobs.*.environments",
            "environment_key",
            MergePolicy::DeepMerge,
        ),
        MergeRuleSpec::new(
            "resources.pipelines.*.clusters",
            "label",
            MergePolicy::SortedDeepMerge,
        ),
    ]
}
