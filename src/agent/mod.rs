//! The agent: beliefs, plans, rules and actions behind one dispatch loop.
//!
//! - [`Agent::trigger`] submits an event, queued or executed immediately
//! - [`Agent::cycle`] drains the queued triggers and dispatches them in parallel
//! - [`Agent::plans_by_trigger`] is the indexed candidate lookup
//!
//! The beliefbase, the plan index, the pending-trigger table and the storage are
//! concurrent maps, so running plans can read and write them freely.

pub mod builder;
pub mod cycle;
pub mod dispatch;
pub mod error;

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use crate::beliefbase::BeliefBase;
use crate::config::AgentConfig;
use crate::execution::ActionRegistry;
use crate::fuzzy::FuzzyBundle;
use crate::plan::Plan;
use crate::rule::RuleTable;
use crate::term::{Literal, Term};
use crate::trigger::{Trigger, TriggerKey};

pub use builder::AgentBuilder;
pub use cycle::CycleSummary;
pub use error::{AgentError, AgentResult};

/// Sleep state: remaining cycles and the terms to wake up with.
#[derive(Debug, Clone)]
struct Sleep {
    remaining: u64,
    terms: Vec<Term>,
}

/// A running BDI agent.
pub struct Agent {
    config: AgentConfig,
    fuzzy: FuzzyBundle,
    beliefbase: BeliefBase,
    plans: DashMap<TriggerKey, Vec<Arc<Plan>>>,
    rules: Arc<RuleTable>,
    actions: ActionRegistry,
    /// Queued triggers keyed by content hash, so equal triggers collapse.
    pending: DashMap<u64, Trigger>,
    running: DashMap<u64, Literal>,
    run_counter: AtomicU64,
    storage: DashMap<String, Arc<dyn Any + Send + Sync>>,
    pool: rayon::ThreadPool,
    cycle: AtomicU64,
    sleep: RwLock<Option<Sleep>>,
}

impl Agent {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn fuzzy(&self) -> &FuzzyBundle {
        &self.fuzzy
    }

    pub fn beliefbase(&self) -> &BeliefBase {
        &self.beliefbase
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Worker pool running parallel bodies, candidates and cycles.
    pub fn pool(&self) -> &rayon::ThreadPool {
        &self.pool
    }

    // -----------------------------------------------------------------------
    // Beliefs
    // -----------------------------------------------------------------------

    /// Assert a belief, queueing its `+belief` trigger. Returns `false` if the
    /// belief was already known.
    pub fn add_belief(&self, literal: Literal) -> bool {
        match self.beliefbase.add(literal) {
            Some(trigger) => {
                self.queue(trigger);
                true
            }
            None => false,
        }
    }

    /// Retract a belief, queueing its `-belief` trigger.
    pub fn delete_belief(&self, literal: &Literal) -> bool {
        match self.beliefbase.remove(literal) {
            Some(trigger) => {
                self.queue(trigger);
                true
            }
            None => false,
        }
    }

    pub fn beliefs(&self) -> Vec<Literal> {
        self.beliefbase.literals()
    }

    // -----------------------------------------------------------------------
    // Plan index
    // -----------------------------------------------------------------------

    /// Candidate plans for a trigger, in declaration order.
    pub fn plans_by_trigger(&self, trigger: &Trigger) -> Vec<Arc<Plan>> {
        self.plans
            .get(&trigger.key())
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Add a plan at runtime. Its rule calls are resolved against the rule table.
    pub fn add_plan(&self, mut plan: Plan) -> AgentResult<Arc<Plan>> {
        plan.resolve_rules(&self.rules)?;
        let plan = Arc::new(plan);
        self.plans
            .entry(plan.trigger().key())
            .or_default()
            .push(Arc::clone(&plan));
        tracing::debug!(plan = %plan, "plan added");
        Ok(plan)
    }

    /// Remove every plan whose trigger pattern equals `trigger`. Running
    /// instances finish undisturbed. Returns the number removed.
    pub fn remove_plan(&self, trigger: &Trigger) -> usize {
        let Some(mut entry) = self.plans.get_mut(&trigger.key()) else {
            return 0;
        };
        let before = entry.len();
        entry.retain(|plan| plan.trigger() != trigger);
        let removed = before - entry.len();
        let now_empty = entry.is_empty();
        drop(entry);
        if now_empty {
            self.plans.remove_if(&trigger.key(), |_, plans| plans.is_empty());
        }
        tracing::debug!(trigger = %trigger, removed, "plans removed");
        removed
    }

    /// All plans, grouped by trigger key.
    pub fn plans(&self) -> Vec<Arc<Plan>> {
        let mut all: Vec<Arc<Plan>> = self
            .plans
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|plan| plan.trigger().to_string());
        all
    }

    // -----------------------------------------------------------------------
    // Triggers and runs
    // -----------------------------------------------------------------------

    pub(crate) fn queue(&self, trigger: Trigger) {
        tracing::trace!(trigger = %trigger, "trigger queued");
        self.pending.insert(trigger.content_hash(), trigger);
    }

    /// Snapshot of queued triggers.
    pub fn pending_triggers(&self) -> Vec<Trigger> {
        let mut all: Vec<Trigger> = self
            .pending
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(ToString::to_string);
        all
    }

    /// Trigger literals of plans executing right now.
    pub fn running_plans(&self) -> Vec<Literal> {
        self.running
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub(crate) fn begin_run(&self, literal: &Literal) -> u64 {
        let id = self.run_counter.fetch_add(1, Ordering::Relaxed);
        self.running.insert(id, literal.clone());
        id
    }

    pub(crate) fn end_run(&self, id: u64) {
        self.running.remove(&id);
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle.load(Ordering::Relaxed)
    }

    // -----------------------------------------------------------------------
    // Sleep
    // -----------------------------------------------------------------------

    pub fn is_sleeping(&self) -> bool {
        self.sleep
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Suspend the agent. While asleep every trigger fails. The `cycles`-th
    /// following cycle wakes the agent and dispatches `+!wakeup`, or
    /// `+!wakeup(term)` once per term; `u64::MAX` sleeps until [`wakeup`](Agent::wakeup).
    /// Terms that are not ground are dropped.
    pub fn sleep(&self, cycles: u64, terms: Vec<Term>) {
        let terms = ground_terms(terms);
        let mut state = self.sleep.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(agent = %self.config.name, cycles, "agent falls asleep");
        *state = Some(Sleep {
            remaining: cycles,
            terms,
        });
    }

    /// Wake the agent before its sleep ends. Returns `false` if it was awake.
    pub fn wakeup(&self, terms: Vec<Term>) -> bool {
        let taken = self
            .sleep
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(mut sleep) => {
                sleep.terms.extend(ground_terms(terms));
                self.raise_wakeup(sleep.terms);
                true
            }
            None => false,
        }
    }

    /// Count one sleeping cycle down. Returns `true` while the agent stays asleep;
    /// the cycle that reaches zero raises the wakeup goals and runs.
    fn tick_sleep(&self) -> bool {
        let mut state = self.sleep.write().unwrap_or_else(PoisonError::into_inner);
        let Some(sleep) = state.as_mut() else {
            return false;
        };
        if sleep.remaining == u64::MAX {
            return true;
        }
        sleep.remaining = sleep.remaining.saturating_sub(1);
        if sleep.remaining > 0 {
            return true;
        }
        let terms = std::mem::take(&mut sleep.terms);
        *state = None;
        drop(state);
        self.raise_wakeup(terms);
        false
    }

    fn raise_wakeup(&self, terms: Vec<Term>) {
        tracing::debug!(agent = %self.config.name, terms = terms.len(), "agent wakes up");
        if terms.is_empty() {
            self.queue(Trigger::add_goal(Literal::atom(WAKEUP)));
        } else {
            for term in terms {
                self.queue(Trigger::add_goal(Literal::new(WAKEUP, vec![term])));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    /// Opaque key-value state shared by the actions of this agent.
    pub fn storage(&self) -> &DashMap<String, Arc<dyn Any + Send + Sync>> {
        &self.storage
    }

    pub fn store<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.storage.insert(key.into(), Arc::new(value));
    }

    /// Typed read; `None` if absent or of another type.
    pub fn fetch<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.storage.get(key)?.value().clone();
        value.downcast::<T>().ok()
    }
}

/// Functor of the goal raised on wakeup.
pub const WAKEUP: &str = "wakeup";

fn ground_terms(terms: Vec<Term>) -> Vec<Term> {
    terms
        .into_iter()
        .filter(|term| {
            let ground = term.is_ground();
            if !ground {
                tracing::debug!(term = %term, "wake term is not ground, dropped");
            }
            ground
        })
        .collect()
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.config.name)
            .field("beliefs", &self.beliefbase.len())
            .field("plans", &self.plans.iter().map(|e| e.len()).sum::<usize>())
            .field("rules", &self.rules.len())
            .field("actions", &self.actions)
            .field("pending", &self.pending.len())
            .field("cycle", &self.cycle_count())
            .field("sleeping", &self.is_sleeping())
            .finish()
    }
}
