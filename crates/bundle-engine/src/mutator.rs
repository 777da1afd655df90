/*
 * mutator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Mutator pipeline infrastructure.
 */

//! Mutator pipeline infrastructure.
//!
//! - [`Mutator`] - A single pass over the configuration tree
//! - [`Pipeline`] - Ordered collection of passes to execute
//! - [`MutatorContext`] - Settings, current user and collected diagnostics
//!
//! # Architecture
//!
//! Passes run in a flat, ordered sequence (insertion order). Each pass
//! consumes the tree produced by the previous one and returns a new tree.
//! The first error stops the pipeline; nothing after it runs. Warnings are
//! pushed to the context's [`Diagnostics`] and survive a successful run.
//!
//! # Example
//!
//! ```
//! use bundle_dyn::Value;
//! use bundle_engine::{MutatorContext, Pipeline, from_fn};
//!
//! let pipeline = Pipeline::new().with(from_fn("noop", |tree, _ctx| Ok(tree)));
//! let mut ctx = MutatorContext::default();
//! let tree = pipeline.run(Value::nil(), &mut ctx).unwrap();
//! assert!(tree.is_nil());
//! ```

use crate::Result;
use crate::permissions::CurrentUser;
use crate::settings::EngineSettings;
use bundle_dyn::Value;
use bundle_error_reporting::Diagnostics;

/// Everything a pass may consult besides the tree.
#[derive(Debug, Clone, Default)]
pub struct MutatorContext {
    pub settings: EngineSettings,

    /// Principal the configuration is processed for, when known.
    pub current_user: Option<CurrentUser>,

    /// Warnings collected across the whole pipeline.
    pub diagnostics: Diagnostics,
}

impl MutatorContext {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            current_user: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_current_user(mut self, user: CurrentUser) -> Self {
        self.current_user = Some(user);
        self
    }

    /// The current user, or an error naming the pass that needed it.
    pub fn require_current_user(&self, pass: &str) -> Result<&CurrentUser> {
        self.current_user
            .as_ref()
            .ok_or_else(|| crate::Error::MissingCurrentUser {
                pass: pass.to_string(),
            })
    }
}

/// Trait for passes over the configuration tree.
pub trait Mutator: Send + Sync {
    /// Human-readable name for this pass.
    ///
    /// Used for logging and in error messages.
    fn name(&self) -> &str;

    /// Apply the pass, returning the rewritten tree.
    ///
    /// # Errors
    ///
    /// Structural and validation problems are errors and stop the
    /// pipeline. Anything recoverable goes to `ctx.diagnostics` instead.
    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value>;
}

/// A pass built from a closure. See [`from_fn`].
pub struct FnMutator<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a [`Mutator`].
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnMutator<F>
where
    F: Fn(Value, &mut MutatorContext) -> Result<Value> + Send + Sync,
{
    FnMutator {
        name: name.into(),
        f,
    }
}

impl<F> Mutator for FnMutator<F>
where
    F: Fn(Value, &mut MutatorContext) -> Result<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        (self.f)(tree, ctx)
    }
}

/// A pipeline of passes to execute in order.
#[derive(Default)]
pub struct Pipeline {
    mutators: Vec<Box<dyn Mutator>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            mutators: Vec::new(),
        }
    }

    /// Add a pass to the pipeline.
    ///
    /// Passes run in the order they are added.
    pub fn push(&mut self, mutator: Box<dyn Mutator>) {
        self.mutators.push(mutator);
    }

    /// Builder form of [`Pipeline::push`].
    pub fn with(mut self, mutator: impl Mutator + 'static) -> Self {
        self.mutators.push(Box::new(mutator));
        self
    }

    pub fn extend(&mut self, mutators: impl IntoIterator<Item = Box<dyn Mutator>>) {
        self.mutators.extend(mutators);
    }

    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }

    /// Execute all passes in insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Execution stops on error.
    pub fn run(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        self.mutators.iter().try_fold(tree, |tree, mutator| {
            tracing::debug!(mutator = mutator.name(), "Running mutator");
            mutator.apply(tree, ctx)
        })
    }

    /// List the names of all passes in execution order.
    pub fn mutator_names(&self) -> Vec<&str> {
        self.mutators.iter().map(|m| m.name()).collect()
    }
}

impl Mutator for Pipeline {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        self.run(tree, ctx)
    }
}
