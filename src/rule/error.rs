//! Rule table errors.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("{caller} calls rule {name}, which is never defined")]
    #[diagnostic(
        code(akh::bdi::rule::unresolved),
        help(
            "Every rule call must match a rule identifier with the same functor and arity. \
             Add the missing rule or fix the call site."
        )
    )]
    Unresolved { name: String, caller: String },
}

/// Result type for rule table operations.
pub type RuleResult<T> = std::result::Result<T, RuleError>;
