//! Hash-fast-path matcher.

use crate::term::{Literal, Term};

use super::{Bindings, Matcher};

/// Binds top-level pattern variables positionally and compares every other
/// position by content hash, without descending into nested literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashMatcher;

impl HashMatcher {
    /// Literal-level entry: requires equal structural hashes first.
    pub fn unify_literal(&self, pattern: &Literal, concrete: &Literal) -> Option<Bindings> {
        if pattern.structure_hash() != concrete.structure_hash() {
            return None;
        }
        let annotations_equal = pattern.annotations().len() == concrete.annotations().len()
            && pattern
                .annotations()
                .iter()
                .zip(concrete.annotations())
                .all(|(p, c)| p.content_hash() == c.content_hash());
        if !annotations_equal {
            return None;
        }
        self.unify(pattern.arguments(), concrete.arguments())
    }
}

impl Matcher for HashMatcher {
    fn unify(&self, pattern: &[Term], concrete: &[Term]) -> Option<Bindings> {
        if pattern.len() != concrete.len() {
            return None;
        }
        let mut scratch = Bindings::new();
        for (p, c) in pattern.iter().zip(concrete) {
            let ok = match p {
                Term::Variable(var) if !var.is_bound() => {
                    if var.is_anonymous() {
                        true
                    } else {
                        let (value, relocate_to) = match c {
                            Term::Variable(target) if !target.is_bound() && !target.is_anonymous() => {
                                (c.clone(), Some(target.name().clone()))
                            }
                            Term::Variable(target) => match target.value() {
                                Ok(v) => (v.clone(), var.is_mutex().then(|| var.name().clone())),
                                Err(_) => (c.clone(), None),
                            },
                            _ => (c.clone(), var.is_mutex().then(|| var.name().clone())),
                        };
                        scratch.insert(var.name().clone(), value, relocate_to)
                    }
                }
                Term::Literal(lp) => match c {
                    Term::Literal(lc) => {
                        lp.structure_hash() == lc.structure_hash()
                            && lp.content_hash() == lc.content_hash()
                    }
                    _ => false,
                },
                _ => resolved(p).content_hash() == resolved(c).content_hash(),
            };
            if !ok {
                return None;
            }
        }
        Some(scratch)
    }
}

fn resolved(term: &Term) -> &Term {
    match term {
        Term::Variable(var) => var.value().unwrap_or(term),
        _ => term,
    }
}
