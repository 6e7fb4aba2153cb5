//! Unification: pattern terms against concrete terms.
//!
//! Two matchers share one contract ([`Matcher`]): given a pattern sequence and a
//! concrete sequence of equal arity, produce a [`Bindings`] set or `None`.
//!
//! - [`HashMatcher`]: binds top-level variables positionally and compares every
//!   other position by content hash. Only sound when neither side has a nested
//!   variable term, bound or not.
//! - [`RecursiveMatcher`]: full structural descent.
//!
//! A mismatch is never an error, just `None`. Neither matcher commits anything
//! on failure; the scratch binding set is dropped. There is no occurs-check.

pub mod hash;
pub mod recursive;

use std::collections::BTreeMap;

use crate::path::Path;
use crate::term::{Literal, Substitution, Term, Variable};

pub use hash::HashMatcher;
pub use recursive::RecursiveMatcher;

/// A single variable binding produced by unification.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    value: Term,
    relocate_to: Option<Path>,
}

impl Binding {
    pub fn value(&self) -> &Term {
        &self.value
    }

    /// Caller-side variable that receives this binding after a successful call.
    pub fn relocate_to(&self) -> Option<&Path> {
        self.relocate_to.as_ref()
    }

    /// Whether the pattern variable was bound to a still-unbound caller variable.
    /// Such a binding is filled in by the callee's body and copied back.
    pub fn is_open(&self) -> bool {
        matches!(&self.value, Term::Variable(var) if !var.is_bound())
    }
}

/// The result of a successful unification, keyed by pattern variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: BTreeMap<Path, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value bound to `name`.
    pub fn get(&self, name: &Path) -> Option<&Term> {
        self.entries.get(name).map(|b| &b.value)
    }

    pub fn binding(&self, name: &Path) -> Option<&Binding> {
        self.entries.get(name)
    }

    /// Add an already-bound variable. Mutex variables relocate under their own
    /// name. Returns `false` when the name is bound to a different value; the
    /// set is left unchanged in that case. Unbound and anonymous variables are
    /// ignored.
    pub fn bind(&mut self, variable: Variable) -> bool {
        if variable.is_anonymous() {
            return true;
        }
        let Ok(value) = variable.value() else {
            return true;
        };
        let relocate_to = variable.is_mutex().then(|| variable.name().clone());
        self.insert(variable.name().clone(), value.clone(), relocate_to)
    }

    pub(crate) fn insert(&mut self, name: Path, value: Term, relocate_to: Option<Path>) -> bool {
        match self.entries.get(&name) {
            Some(existing) => existing.value == value,
            None => {
                self.entries.insert(name, Binding { value, relocate_to });
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Binding)> {
        self.entries.iter()
    }

    /// `(callee name, caller name)` pairs marked for relocation.
    pub fn relocations(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.entries
            .iter()
            .filter_map(|(name, b)| b.relocate_to.as_ref().map(|to| (name, to)))
    }

    /// Bound variable copies, mutex flag set on relocatable ones.
    pub fn to_variables(&self) -> Vec<Variable> {
        self.entries
            .iter()
            .map(|(name, b)| {
                Variable::bound(name.clone(), b.value.clone()).with_mutex(b.relocate_to.is_some())
            })
            .collect()
    }
}

impl Substitution for Bindings {
    fn lookup(&self, name: &Path) -> Option<&Term> {
        self.get(name)
    }
}

/// Common contract of both matchers.
pub trait Matcher {
    /// Unify `pattern` against `concrete`, position by position.
    fn unify(&self, pattern: &[Term], concrete: &[Term]) -> Option<Bindings>;
}

/// Picks the matcher for a literal pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unifier;

impl Unifier {
    /// Unify two literals. Takes the hash path when the structural hashes agree
    /// and neither side holds a nested variable term, the recursive path otherwise.
    pub fn unify(&self, pattern: &Literal, concrete: &Literal) -> Option<Bindings> {
        let hash_path = pattern.structure_hash() == concrete.structure_hash()
            && !pattern.has_nested_variable()
            && !concrete.has_nested_variable();
        let result = if hash_path {
            HashMatcher.unify_literal(pattern, concrete)
        } else {
            RecursiveMatcher.unify_literal(pattern, concrete)
        };
        tracing::trace!(
            pattern = %pattern,
            concrete = %concrete,
            hash_path,
            matched = result.is_some(),
            "unify"
        );
        result
    }

    /// Unify two term sequences with the recursive matcher.
    pub fn unify_terms(&self, pattern: &[Term], concrete: &[Term]) -> Option<Bindings> {
        RecursiveMatcher.unify(pattern, concrete)
    }
}
