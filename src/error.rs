//! Rich diagnostic error types for the akh-bdi reasoning engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. [`BdiError`] wraps them transparently so
//! the full diagnostic reaches the user unchanged.

use miette::Diagnostic;
use thiserror::Error;

use crate::agent::AgentError;
use crate::config::ConfigError;
use crate::execution::ExecutionError;
use crate::rule::RuleError;
use crate::term::TermError;

/// Top-level error type.
#[derive(Debug, Error, Diagnostic)]
pub enum BdiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience result alias.
pub type BdiResult<T> = std::result::Result<T, BdiError>;
