/*
 * level_scores.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Regression fixture for permission level ranking.
 *
 * Unknown levels are ranked by their longest known prefix. Any change to
 * the level table or to that fallback shows up here.
 */

use bundle_engine::PermissionSettings;
use bundle_engine::permissions::score_by_longest_prefix;

#[test]
fn known_levels() {
    let settings = PermissionSettings::default();
    let scores: Vec<(&str, i32)> = [
        "CAN_VIEW",
        "CAN_READ",
        "CAN_RUN",
        "CAN_QUERY",
        "CAN_MONITOR",
        "CAN_USE",
        "CAN_ATTACH_TO",
        "CAN_RESTART",
        "CAN_EDIT",
        "CAN_CREATE",
        "CAN_MANAGE_RUN",
        "CAN_MANAGE_STAGING_VERSIONS",
        "CAN_MANAGE_PRODUCTION_VERSIONS",
        "CAN_MANAGE",
        "IS_OWNER",
    ]
    .into_iter()
    .map(|level| (level, settings.score(level)))
    .collect();

    assert_eq!(
        scores,
        vec![
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
        ]
    );
}

#[test]
fn unknown_levels_use_longest_prefix() {
    let settings = PermissionSettings::default();
    let cases = [
        ("CAN_MANAGE_SOMETHING_CUSTOM", 11),
        ("CAN_MANAGE_RUN_AND_MORE", 9),
        ("CAN_VIEWER", 1),
        ("CAN_EDIT_METADATA", 7),
        ("CAN_USE_CATALOG", 5),
        ("IS_OWNER_OF_EVERYTHING", 12),
        ("CAN_", 0),
        ("UNKNOWN", 0),
        ("can_manage", 0),
        ("", 0),
    ];
    for (level, expected) in cases {
        assert_eq!(settings.score(level), expected, "{level:?}");
    }
}

#[test]
fn exact_match_wins_over_prefix() {
    // CAN_MANAGE is a prefix of CAN_MANAGE_RUN but must not decide its rank.
    let settings = PermissionSettings::default();
    assert!(settings.score("CAN_MANAGE_RUN") < settings.score("CAN_MANAGE"));
    assert_eq!(score_by_longest_prefix(&settings.scores, "CAN_MANAGE_RUN"), Some(9));
}

#[test]
fn substituted_table() {
    let mut settings = PermissionSettings::default();
    settings.scores.clear();
    settings.scores.insert("LOW".to_string(), 1);
    settings.scores.insert("HIGH".to_string(), 2);

    assert_eq!(settings.score("HIGHEST"), 2);
    assert_eq!(settings.score("CAN_MANAGE"), 0);
}
