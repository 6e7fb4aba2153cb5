//! Structural faults raised while executing plan and rule bodies.
//!
//! A low-degree result is not an error; these are the faults that abort the
//! current invocation. The dispatcher absorbs them as candidate failure.

use miette::Diagnostic;
use thiserror::Error;

use crate::term::TermError;

#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("action {action} faulted: {message}")]
    #[diagnostic(
        code(akh::bdi::execution::action_fault),
        help("The action raised a structural fault. The context dump shows the bindings at the time: {context}")
    )]
    ActionFault {
        action: String,
        message: String,
        context: String,
    },

    #[error("unknown action: \"{name}\"")]
    #[diagnostic(
        code(akh::bdi::execution::unknown_action),
        help("Register the action on the agent builder with `AgentBuilder::action(...)`.")
    )]
    UnknownAction { name: String },

    #[error("action {name} needs at least {expected} arguments, got {actual}")]
    #[diagnostic(
        code(akh::bdi::execution::argument_count),
        help("Check the call site against the action's minimal argument count.")
    )]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("no rule matches the identifier {name}")]
    #[diagnostic(
        code(akh::bdi::execution::unresolved_rule),
        help("Declare a rule with this functor and arity before building the agent.")
    )]
    UnresolvedRule { name: String },

    #[error("trigger {trigger} still contains unbound variables")]
    #[diagnostic(
        code(akh::bdi::execution::non_ground_trigger),
        help("Queued goals and belief changes must be ground. Bind every variable first.")
    )]
    NonGroundTrigger { trigger: String },

    #[error("expression failed: {message}")]
    #[diagnostic(
        code(akh::bdi::execution::expression),
        help("Bindings at the time of evaluation: {context}")
    )]
    Expression { message: String, context: String },

    #[error("dispatch depth {depth} exceeds the configured maximum")]
    #[diagnostic(
        code(akh::bdi::execution::dispatch_depth),
        help(
            "Immediate goals nest deeper than `max_dispatch_depth`. Look for a plan that \
             achieves its own trigger, or raise the limit in the agent configuration."
        )
    )]
    DispatchDepth { depth: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),
}

/// Result type for execution.
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
