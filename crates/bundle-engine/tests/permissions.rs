/*
 * permissions.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the permission passes.
 */

mod common;

use bundle_engine::permissions::{
    ApplyBundlePermissions, CurrentUser, EnsureOwnerPermissions, FilterCurrentUser,
    ReducePermissions, permission_overlaps,
};
use bundle_engine::{Error, EngineSettings, Mutator, MutatorContext, PermissionSettings, Pipeline};
use common::{ME, ctx, tree};
use serde_json::json;

#[test]
fn owner_upgrade_leaves_a_single_entry() {
    let input = tree(json!({
        "resources": {"jobs": {"etl": {"permissions": [
            {"level": "CAN_MANAGE", "user_name": ME}
        ]}}}
    }));
    let out = EnsureOwnerPermissions.apply(input, &mut ctx()).unwrap();
    assert_eq!(
        out.to_json()["resources"]["jobs"]["etl"]["permissions"],
        json!([{"level": "IS_OWNER", "user_name": ME}])
    );
}

#[test]
fn owner_pass_adds_owner_or_manage_per_type() {
    let input = tree(json!({
        "resources": {
            "jobs": {"etl": {}},
            "experiments": {"exp": {}},
            "alerts": {"cpu": {}}
        }
    }));
    let out = EnsureOwnerPermissions.apply(input, &mut ctx()).unwrap();
    assert_eq!(
        out.to_json()["resources"],
        json!({
            "jobs": {"etl": {"permissions": [{"level": "IS_OWNER", "user_name": ME}]}},
            "experiments": {"exp": {"permissions": [{"level": "CAN_MANAGE", "user_name": ME}]}},
            "alerts": {"cpu": {}}
        })
    );
}

#[test]
fn owner_pass_requires_current_user() {
    let err = EnsureOwnerPermissions
        .apply(tree(json!({})), &mut MutatorContext::default())
        .unwrap_err();
    assert!(matches!(err, Error::MissingCurrentUser { .. }));
}

#[test]
fn reduction_keeps_highest_level_per_principal() {
    let input = tree(json!({
        "resources": {"pipelines": {"p": {"permissions": [
            {"level": "CAN_VIEW", "user_name": "a"},
            {"level": "CAN_MANAGE", "user_name": "a"},
            {"level": "CAN_VIEW", "user_name": "a"}
        ]}}}
    }));
    let out = ReducePermissions.apply(input, &mut ctx()).unwrap();
    assert_eq!(
        out.to_json()["resources"]["pipelines"]["p"]["permissions"],
        json!([{"level": "CAN_MANAGE", "user_name": "a"}])
    );
}

#[test]
fn invalid_bundle_level_fails_before_any_change() {
    let input = tree(json!({
        "permissions": [
            {"level": "CAN_VIEW", "group_name": "ok"},
            {"level": "CAN_DO_EVERYTHING", "user_name": "a"}
        ],
        "resources": {"jobs": {"etl": {}}}
    }));
    let mut ctx = ctx();
    let err = ApplyBundlePermissions.apply(input, &mut ctx).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid permission level: CAN_DO_EVERYTHING, allowed values: [CAN_MANAGE, CAN_VIEW, CAN_RUN]"
    );
    assert!(ctx.diagnostics.is_empty());
}

#[test]
fn owner_level_needs_the_strict_allow_list() {
    let input = json!({
        "permissions": [{"level": "IS_OWNER", "user_name": "a"}],
        "resources": {"jobs": {"etl": {}}, "models": {"m": {}}}
    });

    let err = ApplyBundlePermissions
        .apply(tree(input.clone()), &mut ctx())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPermissionLevel { .. }));

    let mut strict = MutatorContext::new(EngineSettings {
        permissions: PermissionSettings::with_owner_level_allowed(),
        ..EngineSettings::default()
    });
    let out = ApplyBundlePermissions.apply(tree(input), &mut strict).unwrap();
    assert_eq!(
        out.to_json()["resources"],
        json!({
            "jobs": {"etl": {"permissions": [{"level": "IS_OWNER", "user_name": "a"}]}},
            "models": {"m": {}}
        })
    );
}

#[test]
fn bundle_owner_never_adds_a_second_owner() {
    let input = tree(json!({
        "permissions": [{"level": "IS_OWNER", "user_name": "a"}],
        "resources": {"jobs": {
            "etl": {"permissions": [{"level": "IS_OWNER", "user_name": "b"}]},
            "report": {}
        }}
    }));
    let mut ctx = MutatorContext::new(EngineSettings {
        permissions: PermissionSettings::with_owner_level_allowed(),
        ..EngineSettings::default()
    })
    .with_current_user(CurrentUser::user(ME));
    let pipeline = Pipeline::new()
        .with(ApplyBundlePermissions)
        .with(EnsureOwnerPermissions)
        .with(ReducePermissions);
    let out = pipeline.run(input, &mut ctx).unwrap().to_json();

    for name in ["etl", "report"] {
        let permissions = out["resources"]["jobs"][name]["permissions"]
            .as_array()
            .unwrap();
        let owners = permissions
            .iter()
            .filter(|p| p["level"] == "IS_OWNER")
            .count();
        assert_eq!(owners, 1, "{name}: {permissions:?}");
    }
    assert_eq!(
        out["resources"]["jobs"]["etl"]["permissions"],
        json!([
            {"level": "IS_OWNER", "user_name": "b"},
            {"level": "CAN_MANAGE", "user_name": ME}
        ])
    );
    assert_eq!(
        out["resources"]["jobs"]["report"]["permissions"],
        json!([
            {"level": "IS_OWNER", "user_name": "a"},
            {"level": "CAN_MANAGE", "user_name": ME}
        ])
    );

    let codes: Vec<_> = ctx.diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
    assert_eq!(codes, ["B-2-4"]);
}

#[test]
fn unsupported_type_gets_nothing() {
    let input = tree(json!({
        "permissions": [{"level": "CAN_MANAGE", "group_name": "admins"}],
        "resources": {"alerts": {"cpu": {"name": "CPU"}}}
    }));
    let out = ApplyBundlePermissions.apply(input, &mut ctx()).unwrap();
    assert_eq!(
        out.to_json()["resources"],
        json!({"alerts": {"cpu": {"name": "CPU"}}})
    );
}

#[test]
fn run_is_omitted_for_types_without_run() {
    let input = tree(json!({
        "permissions": [
            {"level": "CAN_RUN", "user_name": "a"},
            {"level": "CAN_VIEW", "user_name": "b"}
        ],
        "resources": {
            "experiments": {"exp": {}},
            "model_serving_endpoints": {"ep": {}}
        }
    }));
    let out = ApplyBundlePermissions.apply(input, &mut ctx()).unwrap();
    assert_eq!(
        out.to_json()["resources"],
        json!({
            "experiments": {"exp": {"permissions": [{"level": "CAN_READ", "user_name": "b"}]}},
            "model_serving_endpoints": {"ep": {"permissions": [
                {"level": "CAN_QUERY", "user_name": "a"},
                {"level": "CAN_VIEW", "user_name": "b"}
            ]}}
        })
    );
}

#[test]
fn bundle_permissions_are_idempotent() {
    let input = tree(json!({
        "permissions": [{"level": "CAN_VIEW", "group_name": "g"}],
        "resources": {"jobs": {"etl": {}}}
    }));
    let once = ApplyBundlePermissions.apply(input, &mut ctx()).unwrap();
    let mut second = ctx();
    let twice = ApplyBundlePermissions.apply(once.clone(), &mut second).unwrap();
    assert_eq!(once, twice);
    assert!(second.diagnostics.is_empty());
}

#[test]
fn overlap_report_lists_each_resource() {
    let input = tree(json!({
        "permissions": [{"level": "CAN_MANAGE", "group_name": "ops"}],
        "resources": {
            "jobs": {
                "a": {"permissions": [{"level": "CAN_VIEW", "group_name": "ops"}]},
                "b": {"permissions": [{"level": "CAN_MANAGE", "group_name": "ops"}]}
            },
            "pipelines": {"p": {"permissions": [{"level": "CAN_RUN", "group_name": "ops"}]}}
        }
    }));
    let report = permission_overlaps(&input, &PermissionSettings::default()).unwrap();
    let paths: Vec<String> = report
        .iter()
        .filter_map(|d| d.path.as_ref().map(ToString::to_string))
        .collect();
    assert_eq!(
        paths,
        ["resources.jobs.a.permissions", "resources.pipelines.p.permissions"]
    );
    assert!(!report.has_errors());
}

#[test]
fn full_permission_pipeline() {
    let input = tree(json!({
        "permissions": [
            {"level": "CAN_MANAGE", "user_name": ME},
            {"level": "CAN_VIEW", "group_name": "analysts"},
            {"level": "CAN_RUN", "group_name": "ops"}
        ],
        "resources": {
            "jobs": {"etl": {"permissions": [
                {"level": "CAN_VIEW", "group_name": "ops"},
                {"level": "CAN_VIEW", "group_name": "analysts"}
            ]}},
            "pipelines": {"ingest": {}}
        }
    }));
    let pipeline = Pipeline::new()
        .with(ApplyBundlePermissions)
        .with(ReducePermissions)
        .with(FilterCurrentUser);
    let mut ctx = ctx();
    let out = pipeline.run(input, &mut ctx).unwrap();

    assert_eq!(
        out.to_json()["resources"],
        json!({
            "jobs": {"etl": {"permissions": [
                {"level": "CAN_VIEW", "group_name": "ops"},
                {"level": "CAN_VIEW", "group_name": "analysts"}
            ]}},
            "pipelines": {"ingest": {"permissions": [
                {"level": "CAN_VIEW", "group_name": "analysts"},
                {"level": "CAN_RUN", "group_name": "ops"}
            ]}}
        })
    );
    // ops: bundle CAN_RUN maps to CAN_MANAGE_RUN on jobs, resource says CAN_VIEW
    assert_eq!(ctx.diagnostics.warnings().count(), 1);

    // Running the whole pipeline again changes nothing.
    let again = pipeline.run(out.clone(), &mut ctx).unwrap();
    assert_eq!(again, out);
}
