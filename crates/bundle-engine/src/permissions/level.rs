/*
 * level.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Permission level ranking.
 */

use indexmap::IndexMap;

/// Known levels and their rank, least to most permissive.
const KNOWN_LEVELS: &[(&str, i32)] = &[
    ("CAN_VIEW", 1),
    ("CAN_READ", 2),
    ("CAN_RUN", 3),
    ("CAN_QUERY", 4),
    ("CAN_MONITOR", 4),
    ("CAN_USE", 5),
    ("CAN_ATTACH_TO", 5),
    ("CAN_RESTART", 6),
    ("CAN_EDIT", 7),
    ("CAN_CREATE", 8),
    ("CAN_MANAGE_RUN", 9),
    ("CAN_MANAGE_STAGING_VERSIONS", 9),
    ("CAN_MANAGE_PRODUCTION_VERSIONS", 10),
    ("CAN_MANAGE", 11),
    ("IS_OWNER", 12),
];

pub fn default_scores() -> IndexMap<String, i32> {
    KNOWN_LEVELS
        .iter()
        .map(|(level, score)| (level.to_string(), *score))
        .collect()
}

/// Score of the longest known level that is a prefix of `level`.
///
/// Fallback for levels missing from the table, so that
/// `CAN_MANAGE_SOMETHING_CUSTOM` ranks like `CAN_MANAGE`. This is a
/// heuristic: a new level that happens to extend a weaker one inherits
/// the weaker rank.
pub fn score_by_longest_prefix(scores: &IndexMap<String, i32>, level: &str) -> Option<i32> {
    scores
        .iter()
        .filter(|(known, _)| !known.is_empty() && level.starts_with(known.as_str()))
        .max_by_key(|(known, _)| known.len())
        .map(|(_, score)| *score)
}
