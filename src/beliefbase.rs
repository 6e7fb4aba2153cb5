//! Concurrent belief store.
//!
//! Beliefs are ground literals grouped by functor in a sharded `DashMap`, so
//! many concurrent readers and the occasional writer never contend on one lock.
//! Every effective change yields the belief trigger to dispatch.

use dashmap::DashMap;

use crate::path::Path;
use crate::term::Literal;
use crate::trigger::Trigger;
use crate::unify::{Bindings, Unifier};

/// Ground facts of one agent.
#[derive(Debug, Default)]
pub struct BeliefBase {
    beliefs: DashMap<Path, Vec<Literal>>,
}

impl BeliefBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert a belief. Returns the `+belief` trigger if it was not known yet.
    pub fn add(&self, literal: Literal) -> Option<Trigger> {
        let mut group = self.beliefs.entry(literal.functor().clone()).or_default();
        if group.contains(&literal) {
            return None;
        }
        group.push(literal.clone());
        Some(Trigger::add_belief(literal))
    }

    /// Retract a belief. Returns the `-belief` trigger if it was known.
    pub fn remove(&self, literal: &Literal) -> Option<Trigger> {
        let mut group = self.beliefs.get_mut(literal.functor())?;
        let position = group.iter().position(|known| known == literal)?;
        let removed = group.remove(position);
        Some(Trigger::delete_belief(removed))
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        self.beliefs
            .get(literal.functor())
            .is_some_and(|group| group.contains(literal))
    }

    /// Unification results of `pattern` against every belief with its functor,
    /// in assertion order.
    pub fn query(&self, pattern: &Literal) -> Vec<Bindings> {
        let Some(group) = self.beliefs.get(pattern.functor()) else {
            return Vec::new();
        };
        group
            .iter()
            .filter_map(|belief| Unifier.unify(pattern, belief))
            .collect()
    }

    /// Whether some belief unifies with `pattern`.
    pub fn exists(&self, pattern: &Literal) -> bool {
        self.beliefs.get(pattern.functor()).is_some_and(|group| {
            group
                .iter()
                .any(|belief| Unifier.unify(pattern, belief).is_some())
        })
    }

    /// Snapshot of all beliefs.
    pub fn literals(&self) -> Vec<Literal> {
        let mut all: Vec<Literal> = self
            .beliefs
            .iter()
            .flat_map(|group| group.value().clone())
            .collect();
        all.sort_by_key(ToString::to_string);
        all
    }

    pub fn len(&self) -> usize {
        self.beliefs.iter().map(|group| group.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
