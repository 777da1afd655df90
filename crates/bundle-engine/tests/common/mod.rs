/*
 * common/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Shared helpers for bundle-engine integration tests.
 */

#![allow(dead_code)]

use bundle_dyn::Value;
use bundle_engine::MutatorContext;
use bundle_engine::permissions::CurrentUser;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn tree(json: serde_json::Value) -> Value {
    Value::from_json(json)
}

pub const ME: &str = "me@example.com";

pub fn ctx() -> MutatorContext {
    init_tracing();
    MutatorContext::default().with_current_user(CurrentUser::user(ME))
}
