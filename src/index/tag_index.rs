//! Tag Index - three-level ordered tree from tags to series
//!
//! ```text
//! tags:    OrderedContainer<TagNode>          "dc", "rack", ...
//!   values:  OrderedContainer<ValueNode>      "ams", "sh", ...     (+ interned value id)
//!     metrics: OrderedContainer<MetricNode>   "disk.used", ...     (+ metric id, path ids)
//! ```
//!
//! Alongside the tree the index owns three interners (metric names, series
//! paths, tag values) and a reverse map from path id to metric name.
//!
//! # Design Notes
//! - Append only: there is no delete, a full rebuild replaces the index
//!   (see [`SharedTagIndex::rebuild`](crate::index::SharedTagIndex::rebuild))
//! - No internal locking, wrap in [`SharedTagIndex`](crate::index::SharedTagIndex)
//!   for concurrent use
//! - Lookups report absence with `Option`/empty results, never errors

use crate::index::interner::StringInterner;
use crate::index::ordered::OrderedContainer;
use crate::index::series::TaggedSeries;
use crate::index::IndexStats;
use crate::query::{MetricPath, QueryEvaluator, QueryResult, TagValueExpr};
use serde::Serialize;
use std::collections::HashMap;

/// Top-level node: one per tag name
#[derive(Debug)]
pub struct TagNode {
    pub name: String,
    pub values: OrderedContainer<ValueNode>,
}

/// Second-level node: one per value of a tag
#[derive(Debug)]
pub struct ValueNode {
    pub value: String,
    /// Id from the tag-value interner, shared across all tags
    pub id: u64,
    pub metrics: OrderedContainer<MetricNode>,
}

/// Leaf node: one per metric name carrying a tag value
#[derive(Debug)]
pub struct MetricNode {
    pub id: u64,
    pub metric: String,
    /// Distinct path ids the metric is stored under
    pub path_ids: Vec<u64>,
}

/// Result of [`TagIndex::stat_tag`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagStat {
    pub tag: String,
    pub values: Vec<TagStatValue>,
}

/// Per-value entry of a [`TagStat`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagStatValue {
    /// Number of distinct metric names under the value
    pub count: usize,
    pub value: String,
}

/// In-memory tag → value → metric index
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: OrderedContainer<TagNode>,
    metrics: StringInterner,
    paths: StringInterner,
    values: StringInterner,
    path_to_metric: HashMap<u64, String>,
}

impl TagIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh index from tagged series paths
    ///
    /// Paths without tags are skipped.
    pub fn from_series<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = Self::new();
        for path in paths {
            index.insert_series(&TaggedSeries::parse(path));
        }
        index
    }

    /// Record that `metric` stored under `path` carries `tag=value`
    ///
    /// Re-inserting a known tuple leaves the index unchanged.
    pub fn insert(&mut self, path: &str, tag: &str, value: &str, metric: &str) {
        let Self {
            tags,
            metrics,
            paths,
            values,
            path_to_metric,
        } = self;

        let tag_node = tags.get_or_insert_with(tag, || TagNode {
            name: tag.to_string(),
            values: OrderedContainer::new(),
        });

        let value_node = tag_node.values.get_or_insert_with(value, || ValueNode {
            value: value.to_string(),
            id: values.get_or_create_id(value),
            metrics: OrderedContainer::new(),
        });

        let metric_id = metrics.get_or_create_id(metric);
        let path_id = paths.get_or_create_id(path);

        let metric_node = value_node.metrics.get_or_insert_with(metric, || MetricNode {
            id: metric_id,
            metric: metric.to_string(),
            path_ids: Vec::new(),
        });

        // Path lists stay short (physical locations of one metric)
        if !metric_node.path_ids.contains(&path_id) {
            metric_node.path_ids.push(path_id);
        }

        path_to_metric.insert(path_id, metric.to_string());
    }

    /// Insert every tag pair of a parsed series path
    ///
    /// Returns `false` (and inserts nothing) when the series has no tags.
    pub fn insert_series(&mut self, series: &TaggedSeries<'_>) -> bool {
        if !series.has_tags() {
            return false;
        }

        for (tag, value) in &series.tags {
            self.insert(series.path, tag, value, series.metric);
        }
        true
    }

    /// List tag names in ascending order
    ///
    /// Stops once more than `limit` names were collected, so up to
    /// `limit + 1` names come back.
    pub fn list_tags(&self, filter: &str, limit: usize) -> Vec<String> {
        // NOTE: `filter` is accepted but not applied to tag names.
        let _ = filter;

        let mut result = Vec::new();
        for (name, _) in self.tags.cursor() {
            result.push(name.to_string());
            if result.len() > limit {
                break;
            }
        }
        result
    }

    /// Per-value metric counts for one tag, in ascending value order
    ///
    /// Values are kept when `value_filter` is empty or a prefix of the value.
    /// Stops as soon as `limit` values were emitted (checked after each
    /// push). Returns `None` for an unknown tag.
    pub fn stat_tag(&self, tag: &str, value_filter: &str, limit: usize) -> Option<TagStat> {
        let tag_node = self.tags.get(tag)?;

        let mut stat = TagStat {
            tag: tag.to_string(),
            values: Vec::new(),
        };

        for (value, node) in tag_node.values.cursor() {
            if value_filter.is_empty() || value.starts_with(value_filter) {
                stat.values.push(TagStatValue {
                    count: node.metrics.len(),
                    value: value.to_string(),
                });
                if stat.values.len() >= limit {
                    break;
                }
            }
        }

        Some(stat)
    }

    /// Resolve tag expressions to matching series with the default evaluator
    ///
    /// See [`QueryEvaluator::list_metrics`].
    pub fn list_metrics(
        &self,
        metric_expr: Option<&TagValueExpr>,
        exprs: &[TagValueExpr],
        limit: usize,
    ) -> QueryResult<Vec<MetricPath>> {
        QueryEvaluator::default().list_metrics(self, metric_expr, exprs, limit)
    }

    /// Look up a tag node
    pub fn tag(&self, name: &str) -> Option<&TagNode> {
        self.tags.get(name)
    }

    /// Interned id of a tag value, without interning it
    pub fn value_id(&self, value: &str) -> Option<u64> {
        self.values.id_of(value)
    }

    /// Series path for a path id
    pub fn path(&self, path_id: u64) -> Option<&str> {
        self.paths.lookup(path_id)
    }

    /// Metric name last recorded for a path id
    pub fn metric_for_path(&self, path_id: u64) -> Option<&str> {
        self.path_to_metric.get(&path_id).map(String::as_str)
    }

    /// Size counters
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            tags: self.tags.len(),
            tag_values: self.tags.values().map(|t| t.values.len()).sum(),
            metrics: self.metrics.len(),
            paths: self.paths.len(),
            distinct_values: self.values.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> TagIndex {
        let mut index = TagIndex::new();
        index.insert("disk.used;dc=ams;rack=1", "dc", "ams", "disk.used");
        index.insert("disk.used;dc=ams;rack=1", "rack", "1", "disk.used");
        index.insert("disk.used;dc=sh;rack=1", "dc", "sh", "disk.used");
        index.insert("disk.used;dc=sh;rack=1", "rack", "1", "disk.used");
        index
    }

    #[test]
    fn test_index_creation() {
        let index = TagIndex::new();
        let stats = index.stats();

        assert_eq!(stats.tags, 0);
        assert_eq!(stats.paths, 0);
        assert!(index.list_tags("", 100).is_empty());
    }

    #[test]
    fn test_insert_builds_tree() {
        let index = sample_index();

        let dc = index.tag("dc").unwrap();
        assert_eq!(dc.name, "dc");
        assert_eq!(dc.values.len(), 2);

        let ams = dc.values.get("ams").unwrap();
        let metric = ams.metrics.get("disk.used").unwrap();
        assert_eq!(metric.path_ids.len(), 1);
        assert_eq!(
            index.path(metric.path_ids[0]),
            Some("disk.used;dc=ams;rack=1")
        );
        assert_eq!(index.metric_for_path(metric.path_ids[0]), Some("disk.used"));

        // Two paths of the same metric under rack=1
        let rack = index.tag("rack").unwrap().values.get("1").unwrap();
        assert_eq!(rack.metrics.get("disk.used").unwrap().path_ids.len(), 2);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut index = sample_index();
        let before = index.stats();

        index.insert("disk.used;dc=ams;rack=1", "dc", "ams", "disk.used");
        index.insert("disk.used;dc=ams;rack=1", "rack", "1", "disk.used");

        assert_eq!(index.stats(), before);
        let rack = index.tag("rack").unwrap().values.get("1").unwrap();
        assert_eq!(rack.metrics.get("disk.used").unwrap().path_ids.len(), 2);
    }

    #[test]
    fn test_value_ids_shared_across_tags() {
        let mut index = TagIndex::new();
        index.insert("a;x=same", "x", "same", "a");
        index.insert("b;y=same", "y", "same", "b");

        let x = index.tag("x").unwrap().values.get("same").unwrap().id;
        let y = index.tag("y").unwrap().values.get("same").unwrap().id;
        assert_eq!(x, y);
        assert_eq!(index.value_id("same"), Some(x));
        assert_eq!(index.value_id("other"), None);
    }

    #[test]
    fn test_list_tags_sorted_for_any_insert_order() {
        let mut index = TagIndex::new();
        for tag in ["zone", "app", "rack", "dc", "host"] {
            index.insert("m", tag, "v", "m");
        }

        assert_eq!(
            index.list_tags("", 100),
            vec!["app", "dc", "host", "rack", "zone"]
        );
    }

    #[test]
    fn test_list_tags_returns_limit_plus_one() {
        let mut index = TagIndex::new();
        for tag in ["a", "b", "c"] {
            index.insert("m", tag, "v", "m");
        }

        assert_eq!(index.list_tags("", 2), vec!["a", "b", "c"]);
        assert_eq!(index.list_tags("", 1), vec!["a", "b"]);
        assert_eq!(index.list_tags("", 0), vec!["a"]);
    }

    #[test]
    fn test_list_tags_ignores_filter() {
        let index = sample_index();

        // Current behaviour: the filter is not applied to tag names.
        assert_eq!(index.list_tags("zzz", 100), vec!["dc", "rack"]);
    }

    #[test]
    fn test_stat_tag_counts_distinct_metrics() {
        let mut index = TagIndex::new();
        index.insert("disk.used;dc=ams", "dc", "ams", "disk.used");
        index.insert("disk.free;dc=ams", "dc", "ams", "disk.free");
        // Second path of an existing metric does not bump the count
        index.insert("disk.used;dc=ams;host=b", "dc", "ams", "disk.used");
        index.insert("disk.used;dc=sh", "dc", "sh", "disk.used");

        let stat = index.stat_tag("dc", "", 100).unwrap();
        assert_eq!(stat.tag, "dc");
        assert_eq!(
            stat.values,
            vec![
                TagStatValue { count: 2, value: "ams".to_string() },
                TagStatValue { count: 1, value: "sh".to_string() },
            ]
        );
    }

    #[test]
    fn test_stat_tag_strict_limit() {
        let mut index = TagIndex::new();
        for value in ["v1", "v2", "v3"] {
            index.insert("m", "t", value, "m");
        }

        let stat = index.stat_tag("t", "", 2).unwrap();
        let values: Vec<&str> = stat.values.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["v1", "v2"]);

        // Limit is checked after each push
        assert_eq!(index.stat_tag("t", "", 0).unwrap().values.len(), 1);
    }

    #[test]
    fn test_list_tags_and_stat_tag_limits_differ() {
        let mut index = TagIndex::new();
        for tag in ["a", "b", "c"] {
            index.insert("m", tag, "v", "m");
        }
        for value in ["v1", "v2", "v3"] {
            index.insert("m", "a", value, "m");
        }

        assert_eq!(index.list_tags("", 2).len(), 3);
        assert_eq!(index.stat_tag("a", "", 2).unwrap().values.len(), 2);
    }

    #[test]
    fn test_stat_tag_prefix_filter() {
        let mut index = TagIndex::new();
        for value in ["web01", "web02", "db01"] {
            index.insert("m", "server", value, "m");
        }

        let stat = index.stat_tag("server", "web", 100).unwrap();
        let values: Vec<&str> = stat.values.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["web01", "web02"]);

        assert!(index.stat_tag("server", "xyz", 100).unwrap().values.is_empty());
    }

    #[test]
    fn test_stat_tag_unknown_tag() {
        let index = sample_index();
        assert!(index.stat_tag("missing", "", 100).is_none());
    }

    #[test]
    fn test_insert_series_skips_untagged() {
        let mut index = TagIndex::new();

        assert!(!index.insert_series(&TaggedSeries::parse("plain.metric")));
        assert!(index.insert_series(&TaggedSeries::parse("disk.used;dc=ams;rack=1")));

        assert_eq!(index.list_tags("", 100), vec!["dc", "rack"]);
        assert_eq!(index.stats().paths, 1);
    }

    #[test]
    fn test_from_series() {
        let index = TagIndex::from_series([
            "disk.used;dc=ams;rack=1",
            "disk.used;dc=sh;rack=1",
            "untagged",
        ]);

        let stats = index.stats();
        assert_eq!(stats.tags, 2);
        assert_eq!(stats.tag_values, 3);
        assert_eq!(stats.metrics, 1);
        assert_eq!(stats.paths, 2);
    }

    #[test]
    fn test_reverse_map_last_write_wins() {
        let mut index = TagIndex::new();
        index.insert("shared/path", "t", "v", "first");
        index.insert("shared/path", "t", "v", "second");

        assert_eq!(index.metric_for_path(0), Some("second"));
    }
}
