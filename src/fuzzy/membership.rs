//! Membership functions: graded categories and their representative numbers.

use std::fmt;

use super::FuzzyValue;

/// Maps a category value onto its representative numbers.
pub trait Membership<T>: Send + Sync + fmt::Debug {
    /// Representative numbers ("range") of `value`.
    fn range(&self, value: &T) -> &[f64];

    /// Upper end of the numeric scale.
    fn scale_maximum(&self) -> f64;

    /// Canonical success result.
    fn success(&self) -> Vec<FuzzyValue<T>>;

    /// Canonical failure result.
    fn fail(&self) -> Vec<FuzzyValue<T>>;
}

/// Two-valued membership: `true` is represented by `1`, `false` by `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrispBoolean;

const TRUE_RANGE: [f64; 1] = [1.0];
const FALSE_RANGE: [f64; 1] = [0.0];

impl Membership<bool> for CrispBoolean {
    fn range(&self, value: &bool) -> &[f64] {
        if *value { &TRUE_RANGE } else { &FALSE_RANGE }
    }

    fn scale_maximum(&self) -> f64 {
        1.0
    }

    fn success(&self) -> Vec<FuzzyValue<bool>> {
        vec![FuzzyValue::crisp(true)]
    }

    fn fail(&self) -> Vec<FuzzyValue<bool>> {
        vec![FuzzyValue::crisp(false)]
    }
}
