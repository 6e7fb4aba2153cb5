// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # akh-bdi
//!
//! The reasoning engine of a belief-desire-intention agent language: structured
//! terms, unification, trigger-indexed plan and rule selection, per-invocation
//! contexts and a fuzzy success algebra.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): atoms, variables, literals and opaque raw values
//! - **Unification** (`unify`): hash-fast-path and recursive matchers
//! - **Triggers** (`trigger`): typed events keying the plan index
//! - **Fuzzy results** (`fuzzy`): graded values and defuzzification strategies
//! - **Execution** (`execution`): contexts, body items, actions, sequential and parallel bodies
//! - **Plans and rules** (`plan`, `rule`): guarded plans, two-pass rule tables
//! - **Agent** (`agent`): concurrent beliefbase, dispatch state machine, reasoning cycle
//!
//! ## Library usage
//!
//! ```no_run
//! use akh_bdi::agent::AgentBuilder;
//! use akh_bdi::execution::Execution;
//! use akh_bdi::plan::Plan;
//! use akh_bdi::term::{Literal, Term};
//! use akh_bdi::trigger::Trigger;
//!
//! let agent = AgentBuilder::new()
//!     .plan(Plan::new(
//!         Trigger::add_goal(Literal::new("greet", vec![Term::var("Who")])),
//!         vec![Execution::add_belief(Literal::new("greeted", vec![Term::var("Who")]))],
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let goal = Trigger::add_goal(Literal::new("greet", vec![Term::from("world")]));
//! let result = agent.trigger(goal, true).unwrap();
//! assert!(agent.fuzzy().is_success(&result));
//! ```

pub mod agent;
pub mod beliefbase;
pub mod config;
pub mod error;
pub mod execution;
pub mod fuzzy;
pub mod path;
pub mod plan;
pub mod rule;
pub mod term;
pub mod trigger;
pub mod unify;
