//! Tag Query Engine
//!
//! Resolves `seriesByTag` filter expressions against the tag index:
//!
//! - **Expr**: parse `tag<op>value` into [`TagValueExpr`]
//! - **Join**: Cartesian product of per-expression candidates
//! - **Evaluator**: posting-list intersection, union and metric filter
//!
//! # Expression Language
//!
//! ```text
//! dc=ams          tag equals value
//! dc!=ams         tag differs from value
//! host=~web.*     regex match (parsed only)
//! host!=~db.*     regex not match (parsed only)
//! ```
//!
//! # Example
//!
//! ```rust
//! use carbon_tags::index::TagIndex;
//! use carbon_tags::query::TagValueExpr;
//!
//! let index = TagIndex::from_series(["disk.used;dc=ams;rack=1", "disk.used;dc=sh;rack=1"]);
//! let exprs = [
//!     TagValueExpr::parse("dc=ams").unwrap(),
//!     TagValueExpr::parse("rack=1").unwrap(),
//! ];
//!
//! let matches = index.list_metrics(None, &exprs, 100).unwrap();
//! assert_eq!(matches[0].path, "disk.used;dc=ams;rack=1");
//! ```

mod error;
mod evaluator;
mod expr;
mod join;

pub use error::{QueryError, QueryResult};
pub use evaluator::{EvaluatorConfig, MetricPath, QueryEvaluator, UnsupportedOperatorPolicy};
pub use expr::{Op, TagValueExpr};
pub use join::{combination_count, join, Combinations};
