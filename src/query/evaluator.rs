//! Query Evaluator
//!
//! Resolves a set of tag expressions (AND semantics) against a [`TagIndex`]:
//!
//! ```text
//! [dc=ams, rack!=2]
//!        ↓  per expression: matching value nodes
//! dc:   [ams]            rack: [1, 3]
//!        ↓  Cartesian join
//! (ams, 1)   (ams, 3)
//!        ↓  per combination: intersect path-id posting lists
//! {p0, p4}   {p7}
//!        ↓  union, sort, dedup, metric-name filter
//! [p0, p4, p7]
//! ```
//!
//! The join grows with the product of candidates per expression, so wide
//! `!=` filters on high-cardinality tags are expensive. A warning is logged
//! above [`EvaluatorConfig::combination_warn_threshold`].

use crate::index::{TagIndex, ValueNode};
use crate::query::error::{QueryError, QueryResult};
use crate::query::expr::{Op, TagValueExpr};
use crate::query::join::{combination_count, join};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// What to do with operators that have no evaluation (`=~`, `!=~`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedOperatorPolicy {
    /// Regex expressions match no value nodes, a regex metric filter keeps
    /// no series
    #[default]
    MatchNothing,
    /// Fail the query with [`QueryError::UnsupportedOperator`]
    Reject,
}

/// Evaluator settings
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub unsupported_operators: UnsupportedOperatorPolicy,
    /// Log a warning when a query expands to more combinations than this
    pub combination_warn_threshold: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            unsupported_operators: UnsupportedOperatorPolicy::default(),
            combination_warn_threshold: 10_000,
        }
    }
}

/// A matched series: metric name and the path it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricPath {
    pub name: String,
    pub path: String,
}

/// Evaluates tag expressions against a [`TagIndex`]
#[derive(Debug, Clone, Default)]
pub struct QueryEvaluator {
    config: EvaluatorConfig,
}

impl QueryEvaluator {
    /// Create an evaluator with custom settings
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Find series matching every expression in `exprs`
    ///
    /// `metric_expr`, when given, is applied to the metric name of each
    /// surviving series; only its operator and value are used. Results are
    /// ordered by path id. `limit` is accepted but not applied.
    pub fn list_metrics(
        &self,
        index: &TagIndex,
        metric_expr: Option<&TagValueExpr>,
        exprs: &[TagValueExpr],
        limit: usize,
    ) -> QueryResult<Vec<MetricPath>> {
        let _ = limit;
        let started = Instant::now();

        self.check_operators(metric_expr.into_iter().chain(exprs))?;

        let candidates: Vec<Vec<&ValueNode>> = exprs
            .iter()
            .map(|expr| self.find_tag_values(index, expr))
            .collect();

        let total = combination_count(&candidates);
        if total > self.config.combination_warn_threshold {
            let per_expr: Vec<usize> = candidates.iter().map(Vec::len).collect();
            tracing::warn!(
                combinations = total,
                candidates = ?per_expr,
                "Tag query expands to a large number of combinations; avoid wide != filters"
            );
        }

        let mut combinations = join(&candidates);
        let mut path_ids = Vec::new();
        for combination in combinations.iter_mut() {
            path_ids.extend(intersect(combination));
        }
        path_ids.sort_unstable();
        path_ids.dedup();

        let result: Vec<MetricPath> = path_ids
            .into_iter()
            .filter_map(|path_id| {
                let name = index.metric_for_path(path_id)?;
                if let Some(expr) = metric_expr {
                    if !metric_name_matches(expr, name) {
                        return None;
                    }
                }
                Some(MetricPath {
                    name: name.to_string(),
                    path: index.path(path_id)?.to_string(),
                })
            })
            .collect();

        tracing::debug!(
            expressions = exprs.len(),
            combinations = total,
            matched = result.len(),
            runtime_us = started.elapsed().as_micros() as u64,
            "Evaluated tag query"
        );

        Ok(result)
    }

    /// Distinct metric names matching `exprs`, in first-seen order
    pub fn resolve_metrics(
        &self,
        index: &TagIndex,
        exprs: &[TagValueExpr],
    ) -> QueryResult<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .list_metrics(index, None, exprs, usize::MAX)?
            .into_iter()
            .filter(|m| seen.insert(m.name.clone()))
            .map(|m| m.name)
            .collect())
    }

    /// Value nodes of `expr.tag` satisfying the expression
    ///
    /// Unknown tags yield nothing. Value ids are compared, and a value that
    /// was never interned under any tag yields nothing for both `=` and `!=`.
    /// A value known only under another tag differs from every node here.
    pub fn find_tag_values<'a>(&self, index: &'a TagIndex, expr: &TagValueExpr) -> Vec<&'a ValueNode> {
        let Some(tag) = index.tag(&expr.tag) else {
            return Vec::new();
        };
        let Some(wanted) = index.value_id(&expr.value) else {
            return Vec::new();
        };

        tag.values
            .cursor()
            .filter_map(|(_, node)| match expr.op {
                Op::Eq => (node.id == wanted).then_some(node),
                Op::NotEq => (node.id != wanted).then_some(node),
                // No regex evaluation
                Op::Match | Op::NotMatch => None,
            })
            .collect()
    }

    fn check_operators<'e>(
        &self,
        exprs: impl IntoIterator<Item = &'e TagValueExpr>,
    ) -> QueryResult<()> {
        if self.config.unsupported_operators != UnsupportedOperatorPolicy::Reject {
            return Ok(());
        }
        match exprs.into_iter().find(|expr| !expr.op.is_supported()) {
            Some(expr) => Err(QueryError::UnsupportedOperator(expr.op)),
            None => Ok(()),
        }
    }
}

/// Path ids present under every value node of one combination
///
/// Nodes are visited smallest metric set first. A path id's counter moves
/// from `i` to `i + 1` only while visiting node `i`, so reaching the
/// combination width means it was seen under every node.
fn intersect(combination: &mut [&ValueNode]) -> Vec<u64> {
    combination.sort_by_key(|node| node.metrics.len());

    let width = combination.len();
    let Some(first) = combination.first() else {
        return Vec::new();
    };
    let mut counters: HashMap<u64, usize> = HashMap::with_capacity(first.metrics.len());

    for (i, node) in combination.iter().enumerate() {
        for metric in node.metrics.values() {
            for &path_id in &metric.path_ids {
                match counters.get_mut(&path_id) {
                    Some(count) if *count == i => *count += 1,
                    Some(_) => {}
                    None if i == 0 => {
                        counters.insert(path_id, 1);
                    }
                    None => {}
                }
            }
        }
    }

    counters
        .into_iter()
        .filter(|&(_, count)| count == width)
        .map(|(path_id, _)| path_id)
        .collect()
}

fn metric_name_matches(expr: &TagValueExpr, name: &str) -> bool {
    match expr.op {
        Op::Eq => expr.value.is_empty() || name == expr.value,
        Op::NotEq => name != expr.value,
        Op::Match | Op::NotMatch => false,
    }
}
