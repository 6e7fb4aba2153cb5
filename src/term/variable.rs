//! Logic variables.
//!
//! A [`Variable`] is a named placeholder with an optional, set-once binding.
//! Variables inside plan and rule patterns are always unbound; bound copies live in
//! a [`Bindings`](crate::unify::Bindings) set or an execution
//! [`Context`](crate::execution::Context) frame.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::path::Path;

use super::Term;
use super::error::{TermError, TermResult};

/// Name of the anonymous variable, which matches anything and never binds.
pub const ANONYMOUS: &str = "_";

/// A named logic variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: Path,
    binding: Option<Box<Term>>,
    mutex: bool,
}

impl Variable {
    /// Unbound variable.
    pub fn new(name: impl Into<Path>) -> Self {
        Self {
            name: name.into(),
            binding: None,
            mutex: false,
        }
    }

    /// Unbound variable whose binding is relocated to the caller after a
    /// successful nested call.
    pub fn mutex(name: impl Into<Path>) -> Self {
        Self {
            mutex: true,
            ..Self::new(name)
        }
    }

    /// Already-bound variable.
    pub fn bound(name: impl Into<Path>, value: Term) -> Self {
        Self {
            binding: Some(Box::new(value)),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn is_mutex(&self) -> bool {
        self.mutex
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.len() == 1 && self.name.suffix() == ANONYMOUS
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The bound value, or [`TermError::NotAllocated`].
    pub fn value(&self) -> TermResult<&Term> {
        self.binding
            .as_deref()
            .ok_or_else(|| TermError::NotAllocated {
                name: self.name.to_string(),
            })
    }

    /// Bind the variable. Fails with [`TermError::AlreadyBound`] on a second call.
    pub fn bind(&mut self, value: Term) -> TermResult<()> {
        if self.binding.is_some() {
            return Err(TermError::AlreadyBound {
                name: self.name.to_string(),
            });
        }
        self.binding = Some(Box::new(value));
        Ok(())
    }

    /// Copy with the same name and flag but no binding.
    pub fn fresh(&self) -> Self {
        Self {
            name: self.name.clone(),
            binding: None,
            mutex: self.mutex,
        }
    }

    /// Copy carrying `flag` as its mutex marker.
    pub fn with_mutex(mut self, flag: bool) -> Self {
        self.mutex = flag;
        self
    }

    pub(crate) fn content_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        1u8.hash(&mut hasher);
        self.name.hash(&mut hasher);
        if let Some(value) = &self.binding {
            value.content_hash().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(value) => write!(f, "{}({})", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}
