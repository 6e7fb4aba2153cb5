//! Per-invocation binding environment.
//!
//! A [`Context`] owns its variable frame outright. Nested calls get their own
//! context; the only cross-context write is copying relocated bindings back into
//! the caller after a successful call.

use std::collections::BTreeMap;
use std::fmt;

use crate::agent::Agent;
use crate::path::Path;
use crate::term::{Literal, Substitution, Term, TermError, TermResult, Variable};
use crate::unify::Bindings;

/// Variable frame of one running plan or rule.
#[derive(Clone)]
pub struct Context<'a> {
    agent: &'a Agent,
    instance: String,
    frame: BTreeMap<Path, Variable>,
    /// `(own variable, caller variable)`
    relocations: Vec<(Path, Path)>,
    depth: usize,
}

impl<'a> Context<'a> {
    /// Empty context. `instance` names the running plan or rule in diagnostics.
    pub fn new(agent: &'a Agent, instance: impl Into<String>, depth: usize) -> Self {
        Self {
            agent,
            instance: instance.into(),
            frame: BTreeMap::new(),
            relocations: Vec::new(),
            depth,
        }
    }

    pub fn agent(&self) -> &'a Agent {
        self.agent
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Nesting depth of immediate dispatch.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Make `name` known as an unbound variable. No effect if already present.
    pub fn declare(&mut self, name: &Path) {
        if !self.frame.contains_key(name) {
            self.frame.insert(name.clone(), Variable::new(name.clone()));
        }
    }

    /// Bind `name` once. Unknown names are declared on the fly; binding the
    /// anonymous variable is a no-op.
    pub fn bind(&mut self, name: &Path, value: Term) -> TermResult<()> {
        let variable = self
            .frame
            .entry(name.clone())
            .or_insert_with(|| Variable::new(name.clone()));
        if variable.is_anonymous() {
            return Ok(());
        }
        variable.bind(value)
    }

    /// Bind `name` unless it already holds an equal value.
    /// Returns `false` when it holds a different one.
    pub fn assign(&mut self, name: &Path, value: Term) -> bool {
        match self.frame.get(name).map(Variable::value) {
            Some(Ok(existing)) => *existing == value,
            _ => self.bind(name, value).is_ok(),
        }
    }

    /// Bound value of `name`.
    pub fn value(&self, name: &Path) -> TermResult<&Term> {
        self.frame
            .get(name)
            .ok_or_else(|| TermError::UnknownVariable {
                name: name.to_string(),
            })?
            .value()
    }

    pub fn is_bound(&self, name: &Path) -> bool {
        self.frame.get(name).is_some_and(Variable::is_bound)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.frame.values()
    }

    /// Seed the frame from a unification result.
    ///
    /// A pattern variable that was matched against a still-unbound caller
    /// variable stays unbound here and is recorded for relocation; every other
    /// binding is bound directly, and mutex ones are recorded as well.
    pub fn apply(&mut self, bindings: &Bindings) -> TermResult<()> {
        for (name, binding) in bindings.iter() {
            if binding.is_open() {
                self.declare(name);
            } else if !self.assign(name, binding.value().clone()) {
                return Err(TermError::AlreadyBound {
                    name: name.to_string(),
                });
            }
            if let Some(target) = binding.relocate_to() {
                self.relocations.push((name.clone(), target.clone()));
            }
        }
        Ok(())
    }

    /// Commit a unification result into this frame, failing on the first
    /// conflict. Nothing is recorded for relocation.
    pub(crate) fn commit(&mut self, bindings: &Bindings) -> bool {
        bindings
            .iter()
            .filter(|(_, binding)| !binding.is_open())
            .all(|(name, binding)| self.assign(name, binding.value().clone()))
    }

    /// Caller-side bindings this context hands back after success: the value
    /// of every relocation source that ended up bound.
    pub fn relocated(&self) -> Vec<(Path, Term)> {
        self.relocations
            .iter()
            .filter_map(|(own, target)| {
                let value = self.frame.get(own)?.value().ok()?;
                Some((target.clone(), value.clone()))
            })
            .collect()
    }

    /// Adopt bindings handed back by a successful nested call.
    pub fn adopt(&mut self, relocated: Vec<(Path, Term)>) -> TermResult<()> {
        for (name, value) in relocated {
            if !self.assign(&name, value) {
                return Err(TermError::AlreadyBound {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Literal with every bound variable of this frame replaced by its value.
    pub fn allocate(&self, literal: &Literal) -> Literal {
        literal.substitute(self)
    }

    /// Bindings rendered for diagnostics.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl Substitution for Context<'_> {
    fn lookup(&self, name: &Path) -> Option<&Term> {
        self.frame.get(name).and_then(|v| v.value().ok())
    }
}

impl fmt::Display for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vars: Vec<String> = self
            .frame
            .values()
            .map(|v| match v.value() {
                Ok(value) => format!("{}={}", v.name(), value),
                Err(_) => format!("{}=?", v.name()),
            })
            .collect();
        write!(f, "{} {{{}}}", self.instance, vars.join(", "))
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("instance", &self.instance)
            .field("frame", &self.frame)
            .field("relocations", &self.relocations)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentBuilder;

    #[test]
    fn variables_bind_once() {
        let agent = AgentBuilder::new().build().unwrap();
        let mut ctx = Context::new(&agent, "test", 0);
        let x = Path::parse("X");
        ctx.declare(&x);
        assert!(matches!(ctx.value(&x), Err(TermError::NotAllocated { .. })));
        ctx.bind(&x, Term::from(1)).unwrap();
        assert!(matches!(
            ctx.bind(&x, Term::from(2)),
            Err(TermError::AlreadyBound { .. })
        ));
        assert!(ctx.assign(&x, Term::from(1)));
        assert!(!ctx.assign(&x, Term::from(2)));
        assert!(matches!(
            ctx.value(&Path::parse("Nope")),
            Err(TermError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn open_bindings_are_relocated_after_binding() {
        let agent = AgentBuilder::new().build().unwrap();
        let mut bindings = Bindings::new();
        bindings.insert(Path::parse("Y"), Term::var("X"), Some(Path::parse("X")));
        bindings.insert(Path::parse("L"), Term::from(1), None);

        let mut callee = Context::new(&agent, "rule", 1);
        callee.apply(&bindings).unwrap();
        assert!(!callee.is_bound(&Path::parse("Y")));
        assert!(callee.relocated().is_empty());

        callee.bind(&Path::parse("Y"), Term::from(42)).unwrap();
        assert_eq!(
            callee.relocated(),
            vec![(Path::parse("X"), Term::from(42))]
        );
    }

    #[test]
    fn allocate_substitutes_bound_values() {
        let agent = AgentBuilder::new().build().unwrap();
        let mut ctx = Context::new(&agent, "test", 0);
        ctx.bind(&Path::parse("X"), Term::from(3)).unwrap();
        let literal = Literal::new("f", vec![Term::var("X"), Term::var("Y")]);
        assert_eq!(ctx.allocate(&literal).to_string(), "f(3, Y)");
    }
}
