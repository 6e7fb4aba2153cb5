//! Recursive structural matcher.

use crate::term::{Literal, Term};

use super::{Bindings, Matcher};

/// Full single-pass structural descent.
///
/// - a variable position binds whatever concrete sub-term occupies it
/// - a literal position needs a concrete literal with equal functor, negation
///   and arity, then recurses into every argument pair
/// - atoms and raw terms need value equality
///
/// Pattern annotations are matched against concrete annotations of the same
/// structural hash, each concrete annotation used once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveMatcher;

impl RecursiveMatcher {
    pub fn unify_literal(&self, pattern: &Literal, concrete: &Literal) -> Option<Bindings> {
        let mut scratch = Bindings::new();
        match_literal(pattern, concrete, &mut scratch).then_some(scratch)
    }
}

impl Matcher for RecursiveMatcher {
    fn unify(&self, pattern: &[Term], concrete: &[Term]) -> Option<Bindings> {
        if pattern.len() != concrete.len() {
            return None;
        }
        let mut scratch = Bindings::new();
        pattern
            .iter()
            .zip(concrete)
            .all(|(p, c)| match_term(p, c, &mut scratch))
            .then_some(scratch)
    }
}

fn match_term(pattern: &Term, concrete: &Term, scratch: &mut Bindings) -> bool {
    // a bound concrete variable stands for its value
    let concrete = match concrete {
        Term::Variable(var) => var.value().unwrap_or(concrete),
        _ => concrete,
    };

    match pattern {
        Term::Variable(var) => {
            if let Ok(value) = var.value() {
                return match_term(value, concrete, scratch);
            }
            if var.is_anonymous() {
                return true;
            }
            let relocate_to = match concrete {
                Term::Variable(target) if !target.is_anonymous() => Some(target.name().clone()),
                Term::Variable(_) => None,
                _ => var.is_mutex().then(|| var.name().clone()),
            };
            scratch.insert(var.name().clone(), concrete.clone(), relocate_to)
        }
        Term::Literal(lp) => match concrete {
            Term::Literal(lc) => match_literal(lp, lc, scratch),
            _ => false,
        },
        Term::Atom(ap) => matches!(concrete, Term::Atom(ac) if ap == ac),
        Term::Raw(rp) => matches!(concrete, Term::Raw(rc) if rp == rc),
    }
}

fn match_literal(pattern: &Literal, concrete: &Literal, scratch: &mut Bindings) -> bool {
    if pattern.functor() != concrete.functor()
        || pattern.is_negated() != concrete.is_negated()
        || pattern.arity() != concrete.arity()
        || pattern.annotations().len() > concrete.annotations().len()
    {
        return false;
    }
    let arguments_match = pattern
        .arguments()
        .iter()
        .zip(concrete.arguments())
        .all(|(p, c)| match_term(p, c, scratch));
    arguments_match && match_annotations(pattern.annotations(), concrete.annotations(), scratch)
}

fn match_annotations(pattern: &[Literal], concrete: &[Literal], scratch: &mut Bindings) -> bool {
    let mut used = vec![false; concrete.len()];
    for p in pattern {
        let found = concrete.iter().enumerate().find_map(|(i, c)| {
            if used[i] || c.structure_hash() != p.structure_hash() {
                return None;
            }
            // try on a copy so a failed candidate leaves no trace
            let mut attempt = scratch.clone();
            match_literal(p, c, &mut attempt).then_some((i, attempt))
        });
        match found {
            Some((i, attempt)) => {
                used[i] = true;
                *scratch = attempt;
            }
            None => return false,
        }
    }
    true
}
