//! The term model: a closed set of term kinds.
//!
//! - [`Atom`]: a scalar value (`3`, `2.5`, `"text"`, `true`)
//! - [`Variable`]: a named placeholder with a set-once binding
//! - [`Literal`]: `functor(arguments)[annotations]`
//! - [`RawTerm`]: an opaque wrapped value the core only compares for equality
//!
//! Every consumer matches on [`Term`] exhaustively; there is no open hierarchy.

pub mod error;
pub mod literal;
pub mod variable;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::path::Path;

pub use error::{TermError, TermResult};
pub use literal::Literal;
pub use variable::Variable;

// ---------------------------------------------------------------------------
// Atom
// ---------------------------------------------------------------------------

/// A scalar value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Atom {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Atom {
    /// Numeric view used by expressions.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Atom::Int(v) => Some(*v as f64),
            Atom::Float(v) => Some(*v),
            Atom::Bool(_) | Atom::Str(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Atom::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atom::Bool(a), Atom::Bool(b)) => a == b,
            (Atom::Int(a), Atom::Int(b)) => a == b,
            (Atom::Float(a), Atom::Float(b)) => a.to_bits() == b.to_bits(),
            (Atom::Str(a), Atom::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Atom::Bool(v) => v.hash(state),
            Atom::Int(v) => v.hash(state),
            Atom::Float(v) => v.to_bits().hash(state),
            Atom::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Bool(v) => write!(f, "{v}"),
            Atom::Int(v) => write!(f, "{v}"),
            Atom::Float(v) => write!(f, "{v:?}"),
            Atom::Str(v) => write!(f, "{v:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTerm
// ---------------------------------------------------------------------------

/// An opaque value wrapped into the term model.
///
/// The reasoning core never looks inside; it only clones, hashes and compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTerm(Arc<serde_json::Value>);

impl RawTerm {
    pub fn new(value: serde_json::Value) -> Self {
        Self(Arc::new(value))
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl Hash for RawTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // serde_json renders object keys in a stable order
        self.0.to_string().hash(state);
    }
}

impl fmt::Display for RawTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// Any term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Atom(Atom),
    Variable(Variable),
    Literal(Literal),
    Raw(RawTerm),
}

/// Read access to variable values, implemented by binding sets and contexts.
pub trait Substitution {
    /// The value bound to `name`, if any.
    fn lookup(&self, name: &Path) -> Option<&Term>;
}

impl Term {
    /// Unbound variable term.
    pub fn var(name: impl Into<Path>) -> Self {
        Term::Variable(Variable::new(name))
    }

    /// Unbound mutex (relocatable) variable term.
    pub fn mutex_var(name: impl Into<Path>) -> Self {
        Term::Variable(Variable::mutex(name))
    }

    /// Opaque wrapped value.
    pub fn raw(value: serde_json::Value) -> Self {
        Term::Raw(RawTerm::new(value))
    }

    /// Whether this term contains an unbound, named variable.
    pub fn has_variable(&self) -> bool {
        match self {
            Term::Atom(_) | Term::Raw(_) => false,
            Term::Variable(var) => match var.value() {
                Ok(value) => value.has_variable(),
                Err(_) => !var.is_anonymous(),
            },
            Term::Literal(literal) => literal.has_variable(),
        }
    }

    pub fn is_ground(&self) -> bool {
        !self.has_variable()
    }

    /// Hash over the complete content, variables and values included.
    pub fn content_hash(&self) -> u64 {
        match self {
            Term::Literal(literal) => literal.content_hash(),
            Term::Variable(var) => var.content_hash(),
            Term::Atom(atom) => {
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                0u8.hash(&mut hasher);
                atom.hash(&mut hasher);
                hasher.finish()
            }
            Term::Raw(raw) => {
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                3u8.hash(&mut hasher);
                raw.hash(&mut hasher);
                hasher.finish()
            }
        }
    }

    /// Replace known variables with their values. A variable that carries its
    /// own binding is replaced by that binding.
    pub fn substitute(&self, substitution: &dyn Substitution) -> Term {
        match self {
            Term::Atom(_) | Term::Raw(_) => self.clone(),
            Term::Literal(literal) => Term::Literal(literal.substitute(substitution)),
            Term::Variable(var) => {
                if let Ok(value) = var.value() {
                    return value.substitute(substitution);
                }
                match substitution.lookup(var.name()) {
                    Some(value) => value.clone(),
                    None => self.clone(),
                }
            }
        }
    }

    /// Copy with every variable reset to unbound.
    pub fn fresh(&self) -> Term {
        match self {
            Term::Atom(_) | Term::Raw(_) => self.clone(),
            Term::Variable(var) => Term::Variable(var.fresh()),
            Term::Literal(literal) => Term::Literal(literal.fresh()),
        }
    }

    pub(crate) fn collect_variables<'a>(&'a self, found: &mut Vec<&'a Variable>) {
        match self {
            Term::Atom(_) | Term::Raw(_) => {}
            Term::Literal(literal) => literal.collect_variables(found),
            Term::Variable(var) => match var.value() {
                Ok(value) => value.collect_variables(found),
                Err(_) => {
                    if !var.is_anonymous() && !found.iter().any(|v| v.name() == var.name()) {
                        found.push(var);
                    }
                }
            },
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(atom) => write!(f, "{atom}"),
            Term::Variable(var) => write!(f, "{var}"),
            Term::Literal(literal) => write!(f, "{literal}"),
            Term::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

impl From<Atom> for Term {
    fn from(atom: Atom) -> Self {
        Term::Atom(atom)
    }
}

impl From<bool> for Term {
    fn from(v: bool) -> Self {
        Term::Atom(Atom::Bool(v))
    }
}

impl From<i32> for Term {
    fn from(v: i32) -> Self {
        Term::Atom(Atom::Int(i64::from(v)))
    }
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Term::Atom(Atom::Int(v))
    }
}

impl From<f64> for Term {
    fn from(v: f64) -> Self {
        Term::Atom(Atom::Float(v))
    }
}

impl From<&str> for Term {
    fn from(v: &str) -> Self {
        Term::Atom(Atom::Str(v.to_string()))
    }
}

impl From<String> for Term {
    fn from(v: String) -> Self {
        Term::Atom(Atom::Str(v))
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Term::Variable(var)
    }
}
