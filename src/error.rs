//! Error types for the expression engine.
//!
//! All failures are local and synchronous: an operation either fully succeeds
//! or fails without touching previously published (shared) expressions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// `trivial_value` was called on an expression that does not reduce to a constant.
    #[error("expression is not trivial")]
    NotTrivial,

    /// The operation is not defined for this node variant
    /// (e.g. substitution into a named boolean function).
    #[error("{what} is not supported for {kind}")]
    Unsupported { kind: &'static str, what: &'static str },

    /// A caller-supplied argument does not satisfy the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operand index out of range for the node's arity (leaves have none).
    #[error("operand index {index} out of range for arity {arity}")]
    OperandIndex { index: usize, arity: usize },

    /// Truth-table enumeration would overflow the row counter.
    #[error("truth table over {vars} variables exceeds the enumeration ceiling")]
    TruthTableTooLarge { vars: usize },

    /// A truth-table row failed to reduce to a constant after full
    /// substitution. This indicates a bug in the simplifier, not user error.
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),
}

pub type Result<T> = std::result::Result<T, Error>;
