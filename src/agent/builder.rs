//! Agent construction.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::beliefbase::BeliefBase;
use crate::config::AgentConfig;
use crate::execution::{Action, ActionRegistry};
use crate::fuzzy::FuzzyBundle;
use crate::plan::Plan;
use crate::rule::{Rule, RuleTableBuilder};
use crate::term::Literal;
use crate::trigger::Trigger;

use super::error::{AgentError, AgentResult};
use super::Agent;

/// Collects the static parts of an agent, then builds it in one step.
#[derive(Debug, Default)]
pub struct AgentBuilder {
    config: AgentConfig,
    fuzzy: Option<FuzzyBundle>,
    plans: Vec<Plan>,
    rules: RuleTableBuilder,
    actions: ActionRegistry,
    beliefs: Vec<Literal>,
    goals: Vec<Literal>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Override the membership and defuzzification derived from the config.
    pub fn fuzzy(mut self, fuzzy: FuzzyBundle) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    pub fn plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.add(rule);
        self
    }

    pub fn action(mut self, action: impl Action + 'static) -> Self {
        self.actions.register(Arc::new(action));
        self
    }

    pub fn action_arc(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.register(action);
        self
    }

    /// Initial belief. Initial beliefs raise no trigger.
    pub fn belief(mut self, literal: Literal) -> Self {
        self.beliefs.push(literal);
        self
    }

    /// Goal queued as `+!goal` for the first cycle.
    pub fn initial_goal(mut self, literal: Literal) -> Self {
        self.goals.push(literal);
        self
    }

    /// Validate the config, resolve all rule calls, start the worker pool.
    pub fn build(self) -> AgentResult<Agent> {
        self.config.validate()?;
        let rules = Arc::new(self.rules.build()?);

        let plans: DashMap<_, Vec<Arc<Plan>>> = DashMap::new();
        let plan_count = self.plans.len();
        for mut plan in self.plans {
            plan.resolve_rules(&rules)?;
            plans
                .entry(plan.trigger().key())
                .or_default()
                .push(Arc::new(plan));
        }

        let thread_prefix = self.config.name.clone();
        let mut pool = rayon::ThreadPoolBuilder::new()
            .thread_name(move |i| format!("{thread_prefix}-worker-{i}"));
        if let Some(threads) = self.config.worker_threads {
            pool = pool.num_threads(threads);
        }
        let pool = pool.build().map_err(|e| AgentError::ThreadPool {
            message: e.to_string(),
        })?;

        let beliefbase = BeliefBase::new();
        for literal in self.beliefs {
            if literal.has_variable() {
                return Err(AgentError::NonGroundTrigger {
                    trigger: Trigger::add_belief(literal).to_string(),
                });
            }
            beliefbase.add(literal);
        }

        let fuzzy = self.fuzzy.unwrap_or_else(|| self.config.fuzzy());
        let agent = Agent {
            fuzzy,
            beliefbase,
            plans,
            rules,
            actions: self.actions,
            pending: DashMap::new(),
            running: DashMap::new(),
            run_counter: AtomicU64::new(0),
            storage: DashMap::new(),
            pool,
            cycle: AtomicU64::new(0),
            sleep: RwLock::new(None),
            config: self.config,
        };
        for literal in self.goals {
            let trigger = Trigger::add_goal(literal);
            if !trigger.is_ground() {
                return Err(AgentError::NonGroundTrigger {
                    trigger: trigger.to_string(),
                });
            }
            agent.queue(trigger);
        }

        tracing::info!(
            agent = %agent.config.name,
            plans = plan_count,
            rules = agent.rules.len(),
            actions = agent.actions.len(),
            threads = agent.pool.current_num_threads(),
            "agent built"
        );
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Execution;
    use crate::term::Term;

    #[test]
    fn unresolved_rule_call_fails_the_build() {
        let plan = Plan::new(
            Trigger::add_goal(Literal::atom("main")),
            vec![Execution::rule(Literal::new("missing", vec![Term::var("X")]))],
        );
        let err = AgentBuilder::new().plan(plan).build().unwrap_err();
        assert!(matches!(err, AgentError::Rule(_)));
    }

    #[test]
    fn non_ground_initial_belief_is_rejected() {
        let err = AgentBuilder::new()
            .belief(Literal::new("at", vec![Term::var("X")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::NonGroundTrigger { .. }));
    }

    #[test]
    fn initial_goals_are_queued() {
        let agent = AgentBuilder::with_config(AgentConfig {
            worker_threads: Some(2),
            ..AgentConfig::with_name("bob")
        })
        .initial_goal(Literal::atom("start"))
        .build()
        .unwrap();
        assert_eq!(agent.name(), "bob");
        assert_eq!(agent.pool().current_num_threads(), 2);
        assert_eq!(agent.pending_triggers()[0].to_string(), "+!start");
    }
}
