//! Literals: `functor(arguments)[annotations]`.
//!
//! A literal is immutable once built. Both hashes are computed at construction:
//!
//! - the **structural hash** covers functor, negation, arity and the annotation
//!   shape, and is what the plan index and the hash-fast-path matcher key on;
//! - the **content hash** additionally covers every argument and annotation value,
//!   and is used for exact equality.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::path::Path;

use super::variable::Variable;
use super::{Substitution, Term};

/// Prefix marking a negated literal in its textual form.
pub const NEGATION: &str = "~";

/// A structured predicate.
#[derive(Debug, Clone)]
pub struct Literal {
    functor: Path,
    negated: bool,
    arguments: Vec<Term>,
    annotations: Vec<Literal>,
    structure_hash: u64,
    content_hash: u64,
}

impl Literal {
    /// Positive literal without annotations.
    pub fn new(functor: impl Into<Path>, arguments: Vec<Term>) -> Self {
        Self::build(functor.into(), false, arguments, Vec::new())
    }

    /// Literal without arguments or annotations.
    pub fn atom(functor: impl Into<Path>) -> Self {
        Self::new(functor, Vec::new())
    }

    /// Fully specified literal.
    pub fn build(
        functor: Path,
        negated: bool,
        arguments: Vec<Term>,
        mut annotations: Vec<Literal>,
    ) -> Self {
        // annotation order is irrelevant, so keep them in a canonical order
        annotations.sort_by(|a, b| {
            a.content_hash
                .cmp(&b.content_hash)
                .then_with(|| a.to_string().cmp(&b.to_string()))
        });

        let structure_hash = structure_hash(&functor, negated, arguments.len(), &annotations);

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        structure_hash.hash(&mut hasher);
        for argument in &arguments {
            argument.content_hash().hash(&mut hasher);
        }
        for annotation in &annotations {
            annotation.content_hash.hash(&mut hasher);
        }
        let content_hash = hasher.finish();

        Self {
            functor,
            negated,
            arguments,
            annotations,
            structure_hash,
            content_hash,
        }
    }

    /// Attach annotations, replacing any existing ones.
    pub fn with_annotations(self, annotations: Vec<Literal>) -> Self {
        Self::build(self.functor, self.negated, self.arguments, annotations)
    }

    /// Negated copy.
    pub fn negate(self) -> Self {
        let negated = !self.negated;
        Self::build(self.functor, negated, self.arguments, self.annotations)
    }

    pub fn functor(&self) -> &Path {
        &self.functor
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn arguments(&self) -> &[Term] {
        &self.arguments
    }

    pub fn annotations(&self) -> &[Literal] {
        &self.annotations
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn structure_hash(&self) -> u64 {
        self.structure_hash
    }

    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }

    /// Whether any argument or annotation (at any depth) is an unbound variable.
    pub fn has_variable(&self) -> bool {
        self.arguments.iter().any(Term::has_variable)
            || self.annotations.iter().any(Literal::has_variable)
    }

    /// Whether some nested literal argument holds a variable term, bound,
    /// unbound or anonymous. Top-level variables do not count.
    pub fn has_nested_variable(&self) -> bool {
        self.arguments.iter().any(|argument| match argument {
            Term::Literal(inner) => inner.mentions_variable(),
            _ => false,
        }) || self.annotations.iter().any(Literal::mentions_variable)
    }

    /// Whether a variable term occurs anywhere, whatever its binding state.
    fn mentions_variable(&self) -> bool {
        self.arguments.iter().any(|argument| match argument {
            Term::Variable(_) => true,
            Term::Literal(inner) => inner.mentions_variable(),
            Term::Atom(_) | Term::Raw(_) => false,
        }) || self.annotations.iter().any(Literal::mentions_variable)
    }

    /// All unbound, named variables in order of first occurrence.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut found: Vec<&Variable> = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    pub(crate) fn collect_variables<'a>(&'a self, found: &mut Vec<&'a Variable>) {
        for argument in &self.arguments {
            argument.collect_variables(found);
        }
        for annotation in &self.annotations {
            annotation.collect_variables(found);
        }
    }

    /// Replace every variable the substitution knows with its value.
    pub fn substitute(&self, substitution: &dyn Substitution) -> Literal {
        Self::build(
            self.functor.clone(),
            self.negated,
            self.arguments
                .iter()
                .map(|argument| argument.substitute(substitution))
                .collect(),
            self.annotations
                .iter()
                .map(|annotation| annotation.substitute(substitution))
                .collect(),
        )
    }

    /// Copy with every variable reset to unbound, for a new instantiation.
    pub fn fresh(&self) -> Literal {
        Self::build(
            self.functor.clone(),
            self.negated,
            self.arguments.iter().map(Term::fresh).collect(),
            self.annotations.iter().map(Literal::fresh).collect(),
        )
    }

    /// Shallow copy whose functor is prefixed with `prefix`.
    pub fn with_prefix(&self, prefix: &Path) -> Literal {
        Self::build(
            self.functor.with_prefix(prefix),
            self.negated,
            self.arguments.clone(),
            self.annotations.clone(),
        )
    }

    /// Shallow copy whose functor is reduced to its last segment.
    pub fn suffix_copy(&self) -> Literal {
        Self::build(
            self.functor.suffix_path(),
            self.negated,
            self.arguments.clone(),
            self.annotations.clone(),
        )
    }
}

fn structure_hash(functor: &Path, negated: bool, arity: usize, annotations: &[Literal]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    functor.hash(&mut hasher);
    negated.hash(&mut hasher);
    arity.hash(&mut hasher);
    let mut shape: Vec<u64> = annotations.iter().map(|a| a.structure_hash).collect();
    shape.sort_unstable();
    shape.hash(&mut hasher);
    hasher.finish()
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.content_hash == other.content_hash
            && self.functor == other.functor
            && self.negated == other.negated
            && self.arguments == other.arguments
            && self.annotations == other.annotations
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash.hash(state);
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{NEGATION}")?;
        }
        write!(f, "{}", self.functor)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        if !self.annotations.is_empty() {
            let anns: Vec<String> = self.annotations.iter().map(ToString::to_string).collect();
            write!(f, "[{}]", anns.join(", "))?;
        }
        Ok(())
    }
}
