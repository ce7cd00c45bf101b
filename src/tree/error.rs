use thiserror::Error;

use crate::tree::{Operator, Value};

/// Everything that can go wrong while walking a tree.
///
/// Parse failures are a separate type
/// ([`ParseError`](crate::parser::ParseError)); by the time a walker runs,
/// the tree is structurally valid and errors are about values and operator
/// placement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalkError {
    /// An operand had the wrong runtime kind for its operator.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// The lookup declined an identifier.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// `operation` is `"division"` or `"modulus"`.
    #[error("{operation} by zero")]
    DivisionByZero { operation: String },

    /// A structurally valid operator appeared where this walker cannot
    /// handle it, for example an arithmetic operator in a document filter.
    #[error("unexpected operator: {operator}")]
    UnexpectedOperator { operator: Operator },

    /// A `~=` / `~!` pattern failed to compile.
    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// The tree nests deeper than the walker's configured limit.
    #[error("expression tree deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },
}

impl WalkError {
    pub(crate) fn mismatch(expected: &str, got: &Value) -> WalkError {
        WalkError::TypeMismatch { expected: expected.to_string(), got: got.kind_name().to_string() }
    }
}

/// Shorthand for walker results.
pub type WalkResult<T> = Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_read_like_diagnostics() {
        let err = WalkError::mismatch("number", &Value::from("abc"));
        assert_eq!(err.to_string(), "type mismatch: expected number, got string");

        let err = WalkError::DivisionByZero { operation: "modulus".into() };
        assert_eq!(err.to_string(), "modulus by zero");

        let err = WalkError::UnexpectedOperator { operator: Operator::Add };
        assert_eq!(err.to_string(), "unexpected operator: +");

        let err = WalkError::DepthLimitExceeded { limit: 512 };
        assert_eq!(err.to_string(), "expression tree deeper than 512 levels");
    }
}
