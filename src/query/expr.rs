//! Tag expressions
//!
//! Parses `tag<op>value` filter expressions as used by `seriesByTag`.
//!
//! # Supported Syntax
//!
//! ```text
//! dc=ams        equal
//! dc!=ams       not equal
//! host=~web.*   regex match      (parsed, not evaluated)
//! host!=~db.*   regex not match  (parsed, not evaluated)
//! ```
//!
//! `=` is a substring of every operator and `=~` of `!=~`, so detection
//! tries the longest spelling first. There is no escaping: a value that
//! itself contains an operator spelling is split at the wrong place.

use crate::query::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a tag expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `=~`
    Match,
    /// `!=~`
    NotMatch,
}

impl Op {
    /// Detection order, most specific spelling first
    const PRECEDENCE: [Op; 4] = [Op::NotMatch, Op::Match, Op::NotEq, Op::Eq];

    /// Operator spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "!=",
            Op::Match => "=~",
            Op::NotMatch => "!=~",
        }
    }

    /// Whether the evaluator has an implementation for this operator
    pub fn is_supported(&self) -> bool {
        matches!(self, Op::Eq | Op::NotEq)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `tag<op>value` expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagValueExpr {
    pub tag: String,
    pub op: Op,
    pub value: String,
}

impl TagValueExpr {
    /// Build an expression from parts
    pub fn new(tag: impl Into<String>, op: Op, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            op,
            value: value.into(),
        }
    }

    /// Parse `tag<op>value`
    ///
    /// Splits on the first occurrence of the most specific operator found.
    pub fn parse(expr: &str) -> QueryResult<Self> {
        let op = Op::PRECEDENCE
            .into_iter()
            .find(|op| expr.contains(op.as_str()))
            .ok_or_else(|| QueryError::Parse(format!("no operator in expression '{}'", expr)))?;

        let (tag, value) = expr
            .split_once(op.as_str())
            .ok_or_else(|| QueryError::Parse(format!("no operator in expression '{}'", expr)))?;

        Ok(Self::new(tag, op, value))
    }
}

impl fmt::Display for TagValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.tag, self.op, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eq() {
        let expr = TagValueExpr::parse("a=b").unwrap();
        assert_eq!(expr, TagValueExpr::new("a", Op::Eq, "b"));
    }

    #[test]
    fn test_parse_not_eq() {
        let expr = TagValueExpr::parse("a!=b").unwrap();
        assert_eq!(expr, TagValueExpr::new("a", Op::NotEq, "b"));
    }

    #[test]
    fn test_parse_match() {
        let expr = TagValueExpr::parse("host=~web.*").unwrap();
        assert_eq!(expr, TagValueExpr::new("host", Op::Match, "web.*"));
    }

    #[test]
    fn test_parse_not_match_takes_precedence() {
        let expr = TagValueExpr::parse("a!=~b").unwrap();
        assert_eq!(expr.op, Op::NotMatch);
        assert_eq!(expr.tag, "a");
        assert_eq!(expr.value, "b");
    }

    #[test]
    fn test_parse_empty_value() {
        let expr = TagValueExpr::parse("name=").unwrap();
        assert_eq!(expr, TagValueExpr::new("name", Op::Eq, ""));
    }

    #[test]
    fn test_parse_splits_on_first_occurrence() {
        let expr = TagValueExpr::parse("a=b=c").unwrap();
        assert_eq!(expr, TagValueExpr::new("a", Op::Eq, "b=c"));
    }

    #[test]
    fn test_operator_inside_value_misparses() {
        // No escaping: the `!=` inside the value wins over the leading `=`
        let expr = TagValueExpr::parse("a=x!=y").unwrap();
        assert_eq!(expr, TagValueExpr::new("a=x", Op::NotEq, "y"));
    }

    #[test]
    fn test_parse_error_no_operator() {
        let err = TagValueExpr::parse("dc").unwrap_err();
        assert!(matches!(err, QueryError::Parse(_)));
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["dc=ams", "dc!=ams", "host=~web", "host!=~db"] {
            assert_eq!(TagValueExpr::parse(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn test_supported_operators() {
        assert!(Op::Eq.is_supported());
        assert!(Op::NotEq.is_supported());
        assert!(!Op::Match.is_supported());
        assert!(!Op::NotMatch.is_supported());
    }
}
