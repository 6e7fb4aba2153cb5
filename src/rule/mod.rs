//! Rules: reusable literal-to-body mappings, called like subroutines.
//!
//! Rules may call each other, themselves included, in any order of
//! declaration. The [`RuleTableBuilder`] resolves this in two passes: every rule
//! is first registered into an arena, then every rule call is pointed at its
//! arena indices. The resulting [`RuleTable`] is frozen.

pub mod error;
pub mod table;

use std::fmt;

use crate::execution::{Declaration, Execution, Instantiable};
use crate::term::Literal;

pub use error::{RuleError, RuleResult};
pub use table::{RuleTable, RuleTableBuilder};

/// Arena index of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub usize);

/// Target of a rule call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleRef {
    /// Looked up by identifier shape when called.
    Unresolved,
    /// Candidate rules in declaration order.
    Resolved(Vec<RuleId>),
}

/// An identifier literal and a body.
#[derive(Debug, Clone)]
pub struct Rule {
    identifier: Literal,
    body: Vec<Execution>,
    declaration: Declaration,
}

impl Rule {
    pub fn new(identifier: Literal, body: Vec<Execution>) -> Self {
        Self {
            identifier,
            body,
            declaration: Declaration::default(),
        }
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn identifier(&self) -> &Literal {
        &self.identifier
    }
}

impl Instantiable for Rule {
    fn pattern(&self) -> &Literal {
        &self.identifier
    }

    fn body(&self) -> &[Execution] {
        &self.body
    }

    fn declaration(&self) -> &Declaration {
        &self.declaration
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}
