//! Running plan and rule bodies.
//!
//! A body is an ordered list of [`Execution`] items. The [`Instantiable`] base
//! turns a static plan or rule into a [`Context`] and runs its body sequentially
//! or in parallel; [`Action`]s are the externally implemented items.

pub mod action;
pub mod context;
pub mod error;
pub mod expression;
pub mod instantiable;

use crate::agent::dispatch::ActionDepth;
use crate::fuzzy::FuzzyResult;
use crate::path::Path;
use crate::rule::RuleRef;
use crate::term::{Literal, Term};
use crate::trigger::Trigger;

pub use action::{Action, ActionRegistry, FnAction};
pub use context::Context;
pub use error::{ExecutionError, ExecutionResult};
pub use expression::{ArithmeticOp, CompareOp, Expression};
pub use instantiable::{Declaration, Instantiable, execute_parallel, execute_sequential};

/// One item of a plan or rule body.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Call a registered action; its return values bind `returns` in order.
    Action {
        name: Path,
        arguments: Vec<Term>,
        returns: Vec<Path>,
    },
    /// `!goal` (queued) or `!!goal` (immediate).
    Achieve { literal: Literal, immediate: bool },
    /// Call a rule by identifier literal.
    Rule { literal: Literal, target: RuleRef },
    /// `+belief` or `-belief`.
    Belief { add: bool, literal: Literal },
    /// `>>literal`: unify against the beliefbase, optionally filtered.
    Unify {
        literal: Literal,
        filter: Option<Expression>,
    },
    /// Succeeds when the expression is true.
    Test(Expression),
    /// Bind a variable to an expression value.
    Assign {
        variable: Path,
        expression: Expression,
    },
    /// `a << b << c`: the first alternative that succeeds, failure if none does.
    /// A failed or faulting alternative leaves no bindings behind.
    Repair(Vec<Execution>),
    /// `condition ? then : otherwise`.
    Ternary {
        condition: Expression,
        then: Box<Execution>,
        otherwise: Box<Execution>,
    },
}

impl Execution {
    pub fn action(name: impl Into<Path>, arguments: Vec<Term>) -> Self {
        Execution::Action {
            name: name.into(),
            arguments,
            returns: Vec::new(),
        }
    }

    pub fn action_returning(
        name: impl Into<Path>,
        arguments: Vec<Term>,
        returns: Vec<Path>,
    ) -> Self {
        Execution::Action {
            name: name.into(),
            arguments,
            returns,
        }
    }

    pub fn achieve(literal: Literal) -> Self {
        Execution::Achieve {
            literal,
            immediate: false,
        }
    }

    pub fn achieve_immediately(literal: Literal) -> Self {
        Execution::Achieve {
            literal,
            immediate: true,
        }
    }

    pub fn rule(literal: Literal) -> Self {
        Execution::Rule {
            literal,
            target: RuleRef::Unresolved,
        }
    }

    pub fn add_belief(literal: Literal) -> Self {
        Execution::Belief { add: true, literal }
    }

    pub fn delete_belief(literal: Literal) -> Self {
        Execution::Belief {
            add: false,
            literal,
        }
    }

    pub fn unify(literal: Literal, filter: Option<Expression>) -> Self {
        Execution::Unify { literal, filter }
    }

    pub fn assign(variable: impl Into<Path>, expression: Expression) -> Self {
        Execution::Assign {
            variable: variable.into(),
            expression,
        }
    }

    pub fn repair(alternatives: Vec<Execution>) -> Self {
        Execution::Repair(alternatives)
    }

    pub fn ternary(condition: Expression, then: Execution, otherwise: Execution) -> Self {
        Execution::Ternary {
            condition,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Variable names this item reads or binds.
    pub fn variables(&self) -> Vec<Path> {
        let mut names: Vec<Path> = Vec::new();
        let mut push = |name: &Path| {
            if !names.contains(name) {
                names.push(name.clone());
            }
        };
        match self {
            Execution::Action {
                arguments, returns, ..
            } => {
                let call = Literal::new(Path::empty(), arguments.clone());
                call.variables().into_iter().for_each(|v| push(v.name()));
                returns.iter().for_each(|name| push(name));
            }
            Execution::Achieve { literal, .. }
            | Execution::Rule { literal, .. }
            | Execution::Belief { literal, .. } => {
                literal.variables().into_iter().for_each(|v| push(v.name()));
            }
            Execution::Unify { literal, filter } => {
                literal.variables().into_iter().for_each(|v| push(v.name()));
                if let Some(filter) = filter {
                    filter.variables().iter().for_each(|name| push(name));
                }
            }
            Execution::Test(expression) => {
                expression.variables().iter().for_each(|name| push(name));
            }
            Execution::Assign {
                variable,
                expression,
            } => {
                push(variable);
                expression.variables().iter().for_each(|name| push(name));
            }
            Execution::Repair(alternatives) => {
                alternatives
                    .iter()
                    .flat_map(Execution::variables)
                    .for_each(|name| push(&name));
            }
            Execution::Ternary {
                condition,
                then,
                otherwise,
            } => {
                condition.variables().iter().for_each(|name| push(name));
                then.variables().iter().for_each(|name| push(name));
                otherwise.variables().iter().for_each(|name| push(name));
            }
        }
        names
    }

    /// Run the item in `context`.
    pub fn execute(&self, parallel: bool, context: &mut Context<'_>) -> ExecutionResult<FuzzyResult> {
        let agent = context.agent();
        let fuzzy = agent.fuzzy();
        match self {
            Execution::Action {
                name,
                arguments,
                returns,
            } => {
                let action = agent
                    .actions()
                    .get(name)
                    .ok_or_else(|| ExecutionError::UnknownAction {
                        name: name.to_string(),
                    })?;
                if arguments.len() < action.minimal_argument_count() {
                    return Err(ExecutionError::ArgumentCount {
                        name: name.to_string(),
                        expected: action.minimal_argument_count(),
                        actual: arguments.len(),
                    });
                }
                let allocated: Vec<Term> =
                    arguments.iter().map(|a| a.substitute(&*context)).collect();
                let mut out = Vec::new();
                let result = {
                    let _depth = ActionDepth::enter(context.depth());
                    action.execute(parallel, context, &allocated, &mut out)?
                };
                if out.len() < returns.len() {
                    return Err(ExecutionError::ActionFault {
                        action: name.to_string(),
                        message: format!(
                            "returned {} values, {} expected",
                            out.len(),
                            returns.len()
                        ),
                        context: context.dump(),
                    });
                }
                for (variable, value) in returns.iter().zip(out) {
                    if !context.assign(variable, value) {
                        return Ok(fuzzy.fail());
                    }
                }
                Ok(result)
            }
            Execution::Achieve { literal, immediate } => {
                let trigger = Trigger::add_goal(context.allocate(literal));
                if *immediate {
                    agent.achieve(context, &trigger)
                } else {
                    agent.enqueue(trigger)
                }
            }
            Execution::Rule { literal, target } => {
                let literal = context.allocate(literal);
                agent.call_rule(context, &literal, target)
            }
            Execution::Belief { add, literal } => {
                let literal = context.allocate(literal);
                let trigger = if *add {
                    Trigger::add_belief(literal)
                } else {
                    Trigger::delete_belief(literal)
                };
                if !trigger.is_ground() {
                    return Err(ExecutionError::NonGroundTrigger {
                        trigger: trigger.to_string(),
                    });
                }
                if *add {
                    agent.add_belief(trigger.into_literal());
                } else {
                    agent.delete_belief(&trigger.into_literal());
                }
                Ok(fuzzy.success())
            }
            Execution::Unify { literal, filter } => {
                let pattern = context.allocate(literal);
                for bindings in agent.beliefbase().query(&pattern) {
                    let mut trial = context.clone();
                    if !trial.commit(&bindings) {
                        continue;
                    }
                    let accepted = match filter {
                        None => true,
                        Some(filter) => match filter.evaluate_bool(&trial) {
                            Ok(accepted) => accepted,
                            Err(error) => {
                                tracing::debug!(error = %error, "belief query filter faulted");
                                false
                            }
                        },
                    };
                    if accepted {
                        *context = trial;
                        return Ok(fuzzy.success());
                    }
                }
                Ok(fuzzy.fail())
            }
            Execution::Test(expression) => Ok(if expression.evaluate_bool(context)? {
                fuzzy.success()
            } else {
                fuzzy.fail()
            }),
            Execution::Assign {
                variable,
                expression,
            } => {
                let value = expression.evaluate(context)?;
                context.bind(variable, value)?;
                Ok(fuzzy.success())
            }
            Execution::Repair(alternatives) => {
                for alternative in alternatives {
                    let mut trial = context.clone();
                    match alternative.execute(parallel, &mut trial) {
                        Ok(result) if fuzzy.is_success(&result) => {
                            *context = trial;
                            return Ok(result);
                        }
                        Ok(_) => {}
                        Err(error) => {
                            tracing::debug!(error = %error, instance = %context.instance(), "repair alternative faulted");
                        }
                    }
                }
                Ok(fuzzy.fail())
            }
            Execution::Ternary {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate_bool(context)? {
                    then.execute(parallel, context)
                } else {
                    otherwise.execute(parallel, context)
                }
            }
        }
    }
}
