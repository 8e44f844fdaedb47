//! Query error types
//!
//! Errors raised while parsing or evaluating tag expressions. The index
//! itself never fails; these only cover malformed input and operators the
//! evaluator has been told to refuse.

use crate::query::Op;
use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Expression could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operator is part of the grammar but has no evaluation
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(Op),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::Parse("no operator in 'dc'".to_string());
        assert_eq!(err.to_string(), "Parse error: no operator in 'dc'");

        let err = QueryError::UnsupportedOperator(Op::NotMatch);
        assert_eq!(err.to_string(), "Unsupported operator: !=~");
    }
}
