//! Defuzzification strategies.
//!
//! | strategy            | reduction                                              |
//! |---------------------|--------------------------------------------------------|
//! | [`CenterOfGravity`] | Σ degree·Σrange / Σ\|range\| over all values           |
//! | [`FirstOfMaxima`]   | value with the largest degree (earliest on ties), scaled by its mean range |
//!
//! Both return their configured default for an empty sequence. Success is
//! `defuzzified / scale_maximum >= 0.5`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::FuzzyValue;
use super::membership::Membership;

/// Threshold on the scaled decision number.
pub const SUCCESS_THRESHOLD: f64 = 0.5;

/// Reduces a fuzzy sequence to one decision number.
pub trait Defuzzification<T>: Send + Sync + fmt::Debug {
    fn defuzzify(&self, values: &[FuzzyValue<T>], membership: &dyn Membership<T>) -> f64;

    fn is_success(&self, decision: f64, membership: &dyn Membership<T>) -> bool {
        let max = membership.scale_maximum();
        max > 0.0 && decision / max >= SUCCESS_THRESHOLD
    }
}

/// Selectable strategy, used by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefuzzificationKind {
    #[default]
    CenterOfGravity,
    FirstOfMaxima,
}

impl DefuzzificationKind {
    pub fn build(self, default_value: f64) -> Arc<dyn Defuzzification<bool>> {
        match self {
            DefuzzificationKind::CenterOfGravity => Arc::new(CenterOfGravity::new(default_value)),
            DefuzzificationKind::FirstOfMaxima => Arc::new(FirstOfMaxima::new(default_value)),
        }
    }
}

// ---------------------------------------------------------------------------
// Center of gravity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct CenterOfGravity {
    default_value: f64,
}

impl CenterOfGravity {
    pub fn new(default_value: f64) -> Self {
        Self { default_value }
    }
}

impl<T> Defuzzification<T> for CenterOfGravity {
    fn defuzzify(&self, values: &[FuzzyValue<T>], membership: &dyn Membership<T>) -> f64 {
        let (weighted, cardinality) =
            values
                .iter()
                .fold((0.0_f64, 0usize), |(weighted, cardinality), v| {
                    let range = membership.range(v.value());
                    (
                        weighted + v.degree() * range.iter().sum::<f64>(),
                        cardinality + range.len(),
                    )
                });
        if cardinality == 0 {
            return self.default_value;
        }
        weighted / cardinality as f64
    }
}

// ---------------------------------------------------------------------------
// First of maxima
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOfMaxima {
    default_value: f64,
}

impl FirstOfMaxima {
    pub fn new(default_value: f64) -> Self {
        Self { default_value }
    }
}

impl<T> Defuzzification<T> for FirstOfMaxima {
    fn defuzzify(&self, values: &[FuzzyValue<T>], membership: &dyn Membership<T>) -> f64 {
        let best = values.iter().fold(None::<&FuzzyValue<T>>, |best, v| match best {
            Some(b) if b.degree() >= v.degree() => Some(b),
            _ => Some(v),
        });
        let Some(best) = best else {
            return self.default_value;
        };
        let range = membership.range(best.value());
        if range.is_empty() {
            return self.default_value;
        }
        best.degree() * range.iter().sum::<f64>() / range.len() as f64
    }
}
