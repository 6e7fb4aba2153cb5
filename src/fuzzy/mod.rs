//! Graded results.
//!
//! Every executable unit returns a sequence of [`FuzzyValue`]s instead of a
//! boolean. A [`Defuzzification`] strategy reduces such a sequence to one number
//! and decides success against the [`Membership`] scale. The pair is carried per
//! agent as a [`FuzzyBundle`].

pub mod defuzzification;
pub mod membership;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use defuzzification::{CenterOfGravity, Defuzzification, DefuzzificationKind, FirstOfMaxima};
pub use membership::{CrispBoolean, Membership};

/// A value with a degree of truth in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyValue<T> {
    value: T,
    degree: f64,
}

impl<T> FuzzyValue<T> {
    /// Degree is clamped into `[0, 1]`; NaN becomes `0`.
    pub fn new(value: T, degree: f64) -> Self {
        let degree = if degree.is_nan() {
            0.0
        } else {
            degree.clamp(0.0, 1.0)
        };
        Self { value, degree }
    }

    /// Full-degree value.
    pub fn crisp(value: T) -> Self {
        Self::new(value, 1.0)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn degree(&self) -> f64 {
        self.degree
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FuzzyValue<U> {
        FuzzyValue {
            value: f(self.value),
            degree: self.degree,
        }
    }
}

impl<T: fmt::Display> fmt::Display for FuzzyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.3})", self.value, self.degree)
    }
}

/// Universal result of executable units.
pub type FuzzyResult = Vec<FuzzyValue<bool>>;

/// Membership function and defuzzification strategy of one agent.
#[derive(Clone)]
pub struct FuzzyBundle {
    membership: Arc<dyn Membership<bool>>,
    defuzzification: Arc<dyn Defuzzification<bool>>,
}

impl FuzzyBundle {
    pub fn new(
        membership: Arc<dyn Membership<bool>>,
        defuzzification: Arc<dyn Defuzzification<bool>>,
    ) -> Self {
        Self {
            membership,
            defuzzification,
        }
    }

    /// Crisp boolean membership with the configured strategy.
    pub fn from_kind(kind: DefuzzificationKind, default_value: f64) -> Self {
        Self::new(Arc::new(CrispBoolean), kind.build(default_value))
    }

    pub fn membership(&self) -> &dyn Membership<bool> {
        self.membership.as_ref()
    }

    pub fn defuzzification(&self) -> &dyn Defuzzification<bool> {
        self.defuzzification.as_ref()
    }

    /// Defuzzified decision number.
    pub fn defuzzify(&self, values: &[FuzzyValue<bool>]) -> f64 {
        self.defuzzification.defuzzify(values, self.membership.as_ref())
    }

    /// Decision number scaled into `[0, 1]`.
    pub fn level(&self, values: &[FuzzyValue<bool>]) -> f64 {
        let max = self.membership.scale_maximum();
        if max <= 0.0 {
            return 0.0;
        }
        (self.defuzzify(values) / max).clamp(0.0, 1.0)
    }

    pub fn is_success(&self, values: &[FuzzyValue<bool>]) -> bool {
        self.defuzzification
            .is_success(self.defuzzify(values), self.membership.as_ref())
    }

    pub fn success(&self) -> FuzzyResult {
        self.membership.success()
    }

    pub fn fail(&self) -> FuzzyResult {
        self.membership.fail()
    }
}

impl Default for FuzzyBundle {
    fn default() -> Self {
        Self::from_kind(DefuzzificationKind::default(), 0.0)
    }
}

impl fmt::Debug for FuzzyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyBundle")
            .field("membership", &self.membership)
            .field("defuzzification", &self.defuzzification)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_is_clamped() {
        assert_eq!(FuzzyValue::new(true, 1.7).degree(), 1.0);
        assert_eq!(FuzzyValue::new(true, -0.2).degree(), 0.0);
        assert_eq!(FuzzyValue::new(true, f64::NAN).degree(), 0.0);
    }

    #[test]
    fn bundle_decides_on_half_scale() {
        let bundle = FuzzyBundle::default();
        assert!(bundle.is_success(&[FuzzyValue::new(true, 0.5)]));
        assert!(!bundle.is_success(&[FuzzyValue::new(true, 0.49)]));
        assert!(!bundle.is_success(&[FuzzyValue::crisp(false)]));
        assert!(bundle.is_success(&bundle.success()));
        assert!(!bundle.is_success(&bundle.fail()));
    }

    #[test]
    fn level_is_scaled() {
        let bundle = FuzzyBundle::from_kind(DefuzzificationKind::FirstOfMaxima, 0.0);
        assert!((bundle.level(&[FuzzyValue::new(true, 0.8)]) - 0.8).abs() < 1e-12);
        assert_eq!(bundle.level(&[]), 0.0);
    }
}
