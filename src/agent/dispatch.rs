//! Trigger dispatch: candidate lookup, unification, guard, body, decision.
//!
//! For one trigger the candidates are tried in declaration order (or all at
//! once when `parallel_candidates` is set). A candidate that does not unify,
//! whose guard is false or faults, or whose body fails is skipped. The first
//! successful candidate ends the search and hands its relocated bindings back
//! to the caller. When every executed candidate failed, one `-!goal` trigger
//! carrying the failed plan's unified literal is queued.

use std::cell::Cell;
use std::sync::Arc;

use rayon::prelude::*;

use crate::execution::{Context, ExecutionError, ExecutionResult, Instantiable};
use crate::fuzzy::FuzzyResult;
use crate::path::Path;
use crate::plan::Plan;
use crate::rule::{RuleId, RuleRef};
use crate::term::{Literal, Term};
use crate::trigger::{EventType, Trigger};
use crate::unify::Unifier;

use super::error::{AgentError, AgentResult};
use super::Agent;

thread_local! {
    /// Dispatch depth of the action running on this thread, if any.
    static ACTION_DEPTH: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Marks the current thread as running an action at a dispatch depth. Immediate
/// triggers the action submits through [`Agent::trigger`] continue from there
/// instead of starting over at depth 0. Restores the previous mark on drop.
pub(crate) struct ActionDepth {
    previous: Option<usize>,
}

impl ActionDepth {
    pub(crate) fn enter(depth: usize) -> Self {
        let previous = ACTION_DEPTH.with(|current| current.replace(Some(depth)));
        Self { previous }
    }

    fn current() -> Option<usize> {
        ACTION_DEPTH.with(Cell::get)
    }
}

impl Drop for ActionDepth {
    fn drop(&mut self) {
        ACTION_DEPTH.with(|current| current.set(self.previous));
    }
}

/// Result of trying one candidate.
enum Outcome {
    /// Pattern did not unify.
    NoMatch,
    /// Guard false or faulting, or the context could not be built.
    Rejected,
    /// Body ran and failed; carries the unified trigger literal.
    Failed(Literal),
    Succeeded(FuzzyResult, Vec<(Path, Term)>),
}

impl Agent {
    /// Submit a ground trigger. Queued triggers run in the next [`cycle`](Agent::cycle);
    /// immediate ones are dispatched now. While asleep the result is failure.
    ///
    /// Called from inside an action, an immediate trigger is nested one level
    /// below the action's plan and counts against `max_dispatch_depth`.
    pub fn trigger(&self, trigger: Trigger, immediate: bool) -> AgentResult<FuzzyResult> {
        if self.is_sleeping() {
            tracing::debug!(trigger = %trigger, "agent sleeps, trigger rejected");
            return Ok(self.fuzzy.fail());
        }
        if !trigger.is_ground() {
            return Err(AgentError::NonGroundTrigger {
                trigger: trigger.to_string(),
            });
        }
        if immediate {
            let depth = ActionDepth::current().map_or(0, |depth| depth + 1);
            let (result, _) = self.dispatch(&trigger, depth)?;
            Ok(result)
        } else {
            self.queue(trigger);
            Ok(self.fuzzy.success())
        }
    }

    /// Queue a goal from inside a body.
    pub(crate) fn enqueue(&self, trigger: Trigger) -> ExecutionResult<FuzzyResult> {
        if self.is_sleeping() {
            return Ok(self.fuzzy.fail());
        }
        if !trigger.is_ground() {
            return Err(ExecutionError::NonGroundTrigger {
                trigger: trigger.to_string(),
            });
        }
        self.queue(trigger);
        Ok(self.fuzzy.success())
    }

    /// Dispatch a goal from inside a body and adopt the relocated bindings.
    /// Unbound variables of the goal may be bound by the chosen plan.
    pub(crate) fn achieve(
        &self,
        context: &mut Context<'_>,
        trigger: &Trigger,
    ) -> ExecutionResult<FuzzyResult> {
        if self.is_sleeping() {
            return Ok(self.fuzzy.fail());
        }
        let (result, relocated) = self.dispatch(trigger, context.depth() + 1)?;
        context.adopt(relocated)?;
        Ok(result)
    }

    /// The dispatch state machine for one trigger.
    pub(crate) fn dispatch(
        &self,
        trigger: &Trigger,
        depth: usize,
    ) -> ExecutionResult<(FuzzyResult, Vec<(Path, Term)>)> {
        if depth > self.config.max_dispatch_depth {
            return Err(ExecutionError::DispatchDepth { depth });
        }

        let mut literal = trigger.literal().clone();
        let mut candidates = self.plans_by_trigger(trigger);
        if candidates.is_empty() {
            if let Some(suffix) = trigger.suffix_copy() {
                candidates = self.plans_by_trigger(&suffix);
                literal = suffix.into_literal();
            }
        }
        if candidates.is_empty() {
            tracing::debug!(trigger = %trigger, "no plan for trigger");
            return Ok((self.fuzzy.fail(), Vec::new()));
        }

        let outcomes: Vec<Outcome> = if self.config.parallel_candidates {
            self.pool.install(|| {
                candidates
                    .par_iter()
                    .map(|plan| self.run_plan(plan, &literal, depth))
                    .collect()
            })
        } else {
            let mut outcomes = Vec::with_capacity(candidates.len());
            for plan in &candidates {
                let outcome = self.run_plan(plan, &literal, depth);
                let done = matches!(outcome, Outcome::Succeeded(..));
                outcomes.push(outcome);
                if done {
                    break;
                }
            }
            outcomes
        };

        let mut failed = None;
        for outcome in outcomes {
            match outcome {
                Outcome::Succeeded(result, relocated) => {
                    tracing::debug!(trigger = %trigger, "trigger succeeded");
                    return Ok((result, relocated));
                }
                Outcome::Failed(unified) => {
                    failed.get_or_insert(unified);
                }
                Outcome::NoMatch | Outcome::Rejected => {}
            }
        }

        tracing::debug!(trigger = %trigger, "no candidate succeeded");
        if let Some(unified) = failed {
            if trigger.event() != EventType::DeleteGoal {
                self.queue(Trigger::delete_goal(unified));
            }
        }
        Ok((self.fuzzy.fail(), Vec::new()))
    }

    fn run_plan(&self, plan: &Arc<Plan>, literal: &Literal, depth: usize) -> Outcome {
        let Some(bindings) = Unifier.unify(plan.trigger().literal(), literal) else {
            return Outcome::NoMatch;
        };
        let mut context = match plan.instantiate(self, &bindings, depth) {
            Ok(context) => context,
            Err(error) => {
                tracing::warn!(error = %error, plan = %plan, "plan could not be instantiated");
                return Outcome::Rejected;
            }
        };
        if let Some(guard) = plan.guard() {
            match guard.evaluate_bool(&context) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(plan = %plan, "guard is false");
                    return Outcome::Rejected;
                }
                Err(error) => {
                    tracing::warn!(error = %error, plan = %plan, "guard faulted");
                    return Outcome::Rejected;
                }
            }
        }

        let run = self.begin_run(literal);
        let result = plan.execute(false, &mut context);
        self.end_run(run);

        match result {
            Ok(result) if self.fuzzy.is_success(&result) => {
                plan.statistic().record_success();
                tracing::debug!(plan = %plan, "plan succeeded");
                Outcome::Succeeded(result, context.relocated())
            }
            Ok(_) => {
                plan.statistic().record_fail();
                tracing::debug!(plan = %plan, "plan failed");
                Outcome::Failed(plan.unified_literal(&context))
            }
            Err(error) => {
                plan.statistic().record_fail();
                tracing::warn!(error = %error, plan = %plan, "plan faulted");
                Outcome::Failed(plan.unified_literal(&context))
            }
        }
    }

    /// Call a rule: first candidate whose identifier unifies and whose body
    /// succeeds wins; its relocated bindings are copied into `context`. No
    /// successful candidate is a plain failure.
    pub(crate) fn call_rule(
        &self,
        context: &mut Context<'_>,
        literal: &Literal,
        target: &RuleRef,
    ) -> ExecutionResult<FuzzyResult> {
        let ids: Vec<RuleId> = match target {
            RuleRef::Resolved(ids) => ids.clone(),
            RuleRef::Unresolved => self.rules.candidates(literal).to_vec(),
        };
        if ids.is_empty() {
            return Err(ExecutionError::UnresolvedRule {
                name: literal.to_string(),
            });
        }
        let depth = context.depth() + 1;
        if depth > self.config.max_dispatch_depth {
            return Err(ExecutionError::DispatchDepth { depth });
        }

        let attempt = |id: &RuleId| -> Option<(FuzzyResult, Vec<(Path, Term)>)> {
            let rule = self.rules.get(*id)?;
            let bindings = Unifier.unify(rule.identifier(), literal)?;
            let mut callee = rule
                .instantiate(self, &bindings, depth)
                .map_err(|error| {
                    tracing::warn!(error = %error, rule = %rule, "rule could not be instantiated");
                })
                .ok()?;
            match rule.execute(false, &mut callee) {
                Ok(result) if self.fuzzy.is_success(&result) => Some((result, callee.relocated())),
                Ok(_) => None,
                Err(error) => {
                    tracing::warn!(error = %error, rule = %rule, "rule faulted");
                    None
                }
            }
        };

        let found = if self.config.parallel_candidates {
            self.pool.install(|| ids.par_iter().find_map_first(attempt))
        } else {
            ids.iter().find_map(attempt)
        };

        match found {
            Some((result, relocated)) => {
                tracing::debug!(rule = %literal, "rule succeeded");
                context.adopt(relocated)?;
                Ok(result)
            }
            None => {
                tracing::debug!(rule = %literal, "no rule candidate succeeded");
                Ok(self.fuzzy.fail())
            }
        }
    }
}
