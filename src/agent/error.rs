//! Agent-level error types with rich miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::execution::ExecutionError;
use crate::rule::RuleError;

/// Errors surfaced by the agent: construction and trigger submission.
#[derive(Debug, Error, Diagnostic)]
pub enum AgentError {
    #[error("trigger {trigger} still contains unbound variables")]
    #[diagnostic(
        code(akh::bdi::agent::non_ground_trigger),
        help("Only ground triggers can be submitted to an agent. Bind every variable first.")
    )]
    NonGroundTrigger { trigger: String },

    #[error("failed to start the worker pool: {message}")]
    #[diagnostic(
        code(akh::bdi::agent::thread_pool),
        help("Check `worker_threads` in the agent config and the process thread limits.")
    )]
    ThreadPool { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for agent operations.
pub type AgentResult<T> = std::result::Result<T, AgentError>;
