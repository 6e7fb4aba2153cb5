//! Error types for the term model.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while reading or binding variables.
#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    #[error("variable {name} is not allocated")]
    #[diagnostic(
        code(akh::bdi::term::not_allocated),
        help(
            "The variable has no bound value in this context. Bind it through \
             unification or an assignment before reading it."
        )
    )]
    NotAllocated { name: String },

    #[error("variable {name} is already bound")]
    #[diagnostic(
        code(akh::bdi::term::already_bound),
        help(
            "A variable is bound exactly once per instantiation. Use a fresh variable \
             or a new instantiation instead of rebinding."
        )
    )]
    AlreadyBound { name: String },

    #[error("variable {name} is not part of this context")]
    #[diagnostic(
        code(akh::bdi::term::unknown_variable),
        help("Only variables that occur in the plan or rule (or were seeded into it) can be read.")
    )]
    UnknownVariable { name: String },
}

/// Result type for term operations.
pub type TermResult<T> = std::result::Result<T, TermError>;
