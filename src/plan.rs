//! Plans: trigger-conditioned, optionally guarded bodies.
//!
//! A plan is immutable once loaded, apart from its lock-free run statistics.
//! Every dispatch instantiates it afresh.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::execution::{Execution, Expression, Instantiable};
use crate::path::Path;
use crate::rule::{RuleResult, RuleTable};
use crate::term::{Literal, Term};
use crate::trigger::Trigger;

pub use crate::execution::Declaration;

/// Constant holding the number of successful runs.
pub const PLAN_SUCCESSFUL: &str = "PlanSuccessful";
/// Constant holding the number of failed runs.
pub const PLAN_FAIL: &str = "PlanFail";
/// Constant holding the number of runs.
pub const PLAN_RUNS: &str = "PlanRuns";
/// Constant holding successful / runs.
pub const PLAN_SUCCESSFUL_RATIO: &str = "PlanSuccessfulRatio";
/// Constant holding failed / runs.
pub const PLAN_FAIL_RATIO: &str = "PlanFailRatio";

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Success and failure counters of one plan.
#[derive(Debug, Default)]
pub struct PlanStatistic {
    successful: AtomicU64,
    fail: AtomicU64,
}

impl PlanStatistic {
    pub fn record_success(&self) {
        self.successful.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fail(&self) {
        self.fail.fetch_add(1, Ordering::Relaxed);
    }

    pub fn successful(&self) -> u64 {
        self.successful.load(Ordering::Relaxed)
    }

    pub fn fail(&self) -> u64 {
        self.fail.load(Ordering::Relaxed)
    }

    pub fn runs(&self) -> u64 {
        self.successful() + self.fail()
    }

    pub fn successful_ratio(&self) -> f64 {
        ratio(self.successful(), self.runs())
    }

    pub fn fail_ratio(&self) -> f64 {
        ratio(self.fail(), self.runs())
    }

    /// The statistic constants handed to each instantiation.
    pub fn constants(&self) -> Vec<(Path, Term)> {
        let successful = self.successful();
        let fail = self.fail();
        let runs = successful + fail;
        vec![
            (Path::parse(PLAN_SUCCESSFUL), Term::from(saturating_i64(successful))),
            (Path::parse(PLAN_FAIL), Term::from(saturating_i64(fail))),
            (Path::parse(PLAN_RUNS), Term::from(saturating_i64(runs))),
            (Path::parse(PLAN_SUCCESSFUL_RATIO), Term::from(ratio(successful, runs))),
            (Path::parse(PLAN_FAIL_RATIO), Term::from(ratio(fail, runs))),
        ]
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A trigger pattern, an optional guard and an ordered body.
#[derive(Debug)]
pub struct Plan {
    trigger: Trigger,
    guard: Option<Expression>,
    body: Vec<Execution>,
    declaration: Declaration,
    statistic: PlanStatistic,
}

impl Plan {
    pub fn new(trigger: Trigger, body: Vec<Execution>) -> Self {
        Self {
            trigger,
            guard: None,
            body,
            declaration: Declaration::default(),
            statistic: PlanStatistic::default(),
        }
    }

    pub fn with_guard(mut self, guard: Expression) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn guard(&self) -> Option<&Expression> {
        self.guard.as_ref()
    }

    pub fn statistic(&self) -> &PlanStatistic {
        &self.statistic
    }

    /// Point every rule call of the body at the rule table.
    pub(crate) fn resolve_rules(&mut self, table: &RuleTable) -> RuleResult<()> {
        let caller = self.trigger.to_string();
        table.resolve_body(&mut self.body, &caller)
    }

    /// Plan trigger literal with the context's bindings substituted, used for
    /// the delete-goal event after a failure.
    pub(crate) fn unified_literal(&self, context: &crate::execution::Context<'_>) -> Literal {
        context.allocate(self.trigger.literal())
    }
}

impl Instantiable for Plan {
    fn pattern(&self) -> &Literal {
        self.trigger.literal()
    }

    fn body(&self) -> &[Execution] {
        &self.body
    }

    fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    fn instance_name(&self) -> String {
        self.trigger.to_string()
    }

    fn constants(&self) -> Vec<(Path, Term)> {
        let mut constants = self.declaration.constants.clone();
        constants.extend(self.statistic.constants());
        constants
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.trigger)?;
        if !self.declaration.description.is_empty() {
            write!(f, " ({})", self.declaration.description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistic_ratios() {
        let stat = PlanStatistic::default();
        assert_eq!(stat.successful_ratio(), 0.0);
        stat.record_success();
        stat.record_success();
        stat.record_success();
        stat.record_fail();
        assert_eq!(stat.runs(), 4);
        assert_eq!(stat.successful_ratio(), 0.75);
        assert_eq!(stat.fail_ratio(), 0.25);
    }

    #[test]
    fn statistic_constants_are_named() {
        let stat = PlanStatistic::default();
        stat.record_fail();
        let constants = stat.constants();
        let runs = constants
            .iter()
            .find(|(name, _)| name.to_string() == PLAN_RUNS)
            .unwrap();
        assert_eq!(runs.1, Term::from(1));
        assert_eq!(constants.len(), 5);
    }

    #[test]
    fn plan_constants_include_declaration_and_statistics() {
        let plan = Plan::new(Trigger::add_goal(Literal::atom("goal")), Vec::new())
            .with_declaration(Declaration::new().constant("Limit", 3).description("demo"));
        let names: Vec<String> = plan
            .constants()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        assert_eq!(names[0], "Limit");
        assert!(names.contains(&PLAN_SUCCESSFUL.to_string()));
        assert_eq!(plan.to_string(), "+!goal (demo)");
    }
}
