//! Action system: externally implemented executable units.
//!
//! The reasoning core knows nothing about an action beyond the [`Action`] trait.
//! Actions are registered by name in an [`ActionRegistry`] owned by the agent.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::fuzzy::FuzzyResult;
use crate::path::Path;
use crate::term::Term;

use super::context::Context;
use super::error::ExecutionResult;

/// An executable action.
pub trait Action: Send + Sync {
    /// Name the action is called by.
    fn name(&self) -> Path;

    /// Fewest arguments a call must pass.
    fn minimal_argument_count(&self) -> usize {
        0
    }

    /// Run the action. `parallel` is set when the calling body fans out.
    /// Values pushed to `returns` are bound to the call site's return variables.
    fn execute(
        &self,
        parallel: bool,
        context: &mut Context<'_>,
        arguments: &[Term],
        returns: &mut Vec<Term>,
    ) -> ExecutionResult<FuzzyResult>;
}

type ActionFnBody = dyn Fn(bool, &mut Context<'_>, &[Term], &mut Vec<Term>) -> ExecutionResult<FuzzyResult>
    + Send
    + Sync;

/// An action backed by a closure.
pub struct FnAction {
    name: Path,
    minimal_argument_count: usize,
    body: Box<ActionFnBody>,
}

impl FnAction {
    pub fn new<F>(name: impl Into<Path>, minimal_argument_count: usize, body: F) -> Self
    where
        F: Fn(bool, &mut Context<'_>, &[Term], &mut Vec<Term>) -> ExecutionResult<FuzzyResult>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            minimal_argument_count,
            body: Box::new(body),
        }
    }
}

impl Action for FnAction {
    fn name(&self) -> Path {
        self.name.clone()
    }

    fn minimal_argument_count(&self) -> usize {
        self.minimal_argument_count
    }

    fn execute(
        &self,
        parallel: bool,
        context: &mut Context<'_>,
        arguments: &[Term],
        returns: &mut Vec<Term>,
    ) -> ExecutionResult<FuzzyResult> {
        (self.body)(parallel, context, arguments, returns)
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .field("minimal_argument_count", &self.minimal_argument_count)
            .finish()
    }
}

/// Registry of available actions.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<Path, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. An action with the same name is replaced.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name(), action);
    }

    pub fn get(&self, name: &Path) -> Option<&Arc<dyn Action>> {
        self.actions.get(name)
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<Path> {
        let mut names: Vec<Path> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
