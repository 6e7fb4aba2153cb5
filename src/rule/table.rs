//! Two-pass rule table construction.

use std::collections::HashMap;

use crate::execution::Execution;
use crate::term::Literal;

use super::error::{RuleError, RuleResult};
use super::{Rule, RuleId, RuleRef};

/// Collects rules, then resolves every rule call at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<Rule>,
    index: HashMap<u64, Vec<RuleId>>,
}

impl RuleTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// First pass: register the rule under its identifier shape.
    pub fn add(&mut self, rule: Rule) -> RuleId {
        let id = RuleId(self.rules.len());
        self.index
            .entry(rule.identifier().structure_hash())
            .or_default()
            .push(id);
        self.rules.push(rule);
        id
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Second pass: point every rule call at its candidates and freeze.
    pub fn build(self) -> RuleResult<RuleTable> {
        let mut table = RuleTable {
            rules: Vec::new(),
            index: self.index,
        };
        let mut rules = self.rules;
        for rule in &mut rules {
            let caller = rule.identifier().to_string();
            table.resolve_body(&mut rule.body, &caller)?;
        }
        table.rules = rules;
        tracing::debug!(rules = table.rules.len(), "rule table built");
        Ok(table)
    }
}

/// Immutable, fully resolved rule arena.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    index: HashMap<u64, Vec<RuleId>>,
}

impl RuleTable {
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// Rules whose identifier has the literal's shape, in declaration order.
    pub fn candidates(&self, literal: &Literal) -> &[RuleId] {
        self.index
            .get(&literal.structure_hash())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the rule calls of a body against this table.
    pub(crate) fn resolve_body(&self, body: &mut [Execution], caller: &str) -> RuleResult<()> {
        for item in body {
            match item {
                Execution::Rule { literal, target } => {
                    let candidates = self.candidates(literal);
                    if candidates.is_empty() {
                        return Err(RuleError::Unresolved {
                            name: literal.to_string(),
                            caller: caller.to_string(),
                        });
                    }
                    *target = RuleRef::Resolved(candidates.to_vec());
                }
                Execution::Repair(alternatives) => self.resolve_body(alternatives, caller)?,
                Execution::Ternary { then, otherwise, .. } => {
                    self.resolve_body(std::slice::from_mut(then.as_mut()), caller)?;
                    self.resolve_body(std::slice::from_mut(otherwise.as_mut()), caller)?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}
