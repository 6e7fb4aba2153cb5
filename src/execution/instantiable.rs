//! Shared base of plans and rules: instantiation and body execution.

use rayon::prelude::*;

use crate::agent::Agent;
use crate::fuzzy::{FuzzyResult, FuzzyValue};
use crate::path::Path;
use crate::term::{Literal, Term};
use crate::unify::Bindings;

use super::Execution;
use super::context::Context;
use super::error::ExecutionResult;

/// Declarative flags and metadata attached to a plan or rule at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declaration {
    /// Fan body items out concurrently.
    pub parallel: bool,
    /// Report success whatever the body items return.
    pub atomic: bool,
    pub description: String,
    pub tags: Vec<String>,
    /// Bound into every new context.
    pub constants: Vec<(Path, Term)>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn constant(mut self, name: impl Into<Path>, value: impl Into<Term>) -> Self {
        self.constants.push((name.into(), value.into()));
        self
    }
}

/// A static body that is turned into a running invocation per call.
pub trait Instantiable: Send + Sync {
    /// Literal the caller's literal is unified against.
    fn pattern(&self) -> &Literal;

    fn body(&self) -> &[Execution];

    fn declaration(&self) -> &Declaration;

    /// Name used in diagnostics.
    fn instance_name(&self) -> String {
        self.pattern().to_string()
    }

    /// Constants bound into each new context.
    fn constants(&self) -> Vec<(Path, Term)> {
        self.declaration().constants.clone()
    }

    /// Fresh, isolated context: every variable of the pattern and body declared
    /// unbound, then constants and the unification result bound.
    fn instantiate<'a>(
        &self,
        agent: &'a Agent,
        bindings: &Bindings,
        depth: usize,
    ) -> ExecutionResult<Context<'a>> {
        let mut context = Context::new(agent, self.instance_name(), depth);
        for var in self.pattern().variables() {
            context.declare(var.name());
        }
        for item in self.body() {
            for name in item.variables() {
                context.declare(&name);
            }
        }
        for (name, value) in self.constants() {
            context.bind(&name, value)?;
        }
        context.apply(bindings)?;
        Ok(context)
    }

    /// Run the body in `context`. The declaration's `parallel` flag selects
    /// the body mode; `parallel` only reports how the caller runs. Bodies take
    /// no arguments and return nothing; results flow back through relocation.
    fn execute(&self, parallel: bool, context: &mut Context<'_>) -> ExecutionResult<FuzzyResult> {
        let declaration = self.declaration();
        tracing::trace!(
            instance = %context.instance(),
            caller_parallel = parallel,
            parallel = declaration.parallel,
            atomic = declaration.atomic,
            "executing body"
        );
        if declaration.parallel {
            execute_parallel(self.body(), declaration.atomic, context)
        } else {
            execute_sequential(self.body(), declaration.atomic, context)
        }
    }
}

/// Items in order, each seeing the bindings of the earlier ones. A non-atomic
/// body stops at the first failing item.
pub fn execute_sequential(
    body: &[Execution],
    atomic: bool,
    context: &mut Context<'_>,
) -> ExecutionResult<FuzzyResult> {
    let fuzzy = context.agent().fuzzy();
    let mut level = 1.0_f64;
    for item in body {
        match item.execute(false, context) {
            Ok(result) => {
                level = level.min(fuzzy.level(&result));
                if !atomic && !fuzzy.is_success(&result) {
                    break;
                }
            }
            Err(error) if atomic => {
                tracing::warn!(error = %error, instance = %context.instance(), "fault inside atomic body");
                level = 0.0;
            }
            Err(error) => return Err(error),
        }
    }
    Ok(aggregate(context, atomic, level))
}

/// All items at once on the agent's pool, each in its own copy of the context.
/// Sibling bindings are discarded.
pub fn execute_parallel(
    body: &[Execution],
    atomic: bool,
    context: &mut Context<'_>,
) -> ExecutionResult<FuzzyResult> {
    let agent = context.agent();
    let fuzzy = agent.fuzzy();
    let snapshot = &*context;
    let outcomes: Vec<ExecutionResult<FuzzyResult>> = agent.pool().install(|| {
        body.par_iter()
            .map(|item| {
                let mut local = snapshot.clone();
                item.execute(true, &mut local)
            })
            .collect()
    });

    let mut level = 1.0_f64;
    let mut first_error = None;
    for result in outcomes {
        match result {
            Ok(result) => level = level.min(fuzzy.level(&result)),
            Err(error) => {
                level = 0.0;
                if atomic {
                    tracing::warn!(error = %error, instance = %context.instance(), "fault inside atomic body");
                } else if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(aggregate(context, atomic, level)),
    }
}

/// Conjunction of the item levels, or plain success for atomic bodies.
fn aggregate(context: &Context<'_>, atomic: bool, level: f64) -> FuzzyResult {
    if atomic {
        context.agent().fuzzy().success()
    } else {
        vec![FuzzyValue::new(true, level)]
    }
}
