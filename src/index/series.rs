//! Tagged series paths
//!
//! A tagged series path looks like `disk.used;rack=a1;dc=ams`: the metric
//! name, then `;`-separated `tag=value` pairs. The whole string is used as the
//! series path inside the index.

/// A series path split into its metric name and tag pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSeries<'a> {
    /// Full series path as received
    pub path: &'a str,
    /// Metric name (the segment before the first `;`)
    pub metric: &'a str,
    /// `(tag, value)` pairs in the order they appear
    pub tags: Vec<(&'a str, &'a str)>,
}

impl<'a> TaggedSeries<'a> {
    /// Split a series path into metric name and tag pairs
    ///
    /// Each segment after the first is split on its first `=`. Segments with
    /// no `=` or with an empty tag name are dropped, since the index does not
    /// validate what it is given.
    pub fn parse(path: &'a str) -> Self {
        let mut segments = path.split(';');
        let metric = segments.next().unwrap_or_default();

        let tags = segments
            .filter_map(|segment| match segment.split_once('=') {
                Some((tag, value)) if !tag.is_empty() => Some((tag, value)),
                _ => {
                    tracing::debug!(path = %path, segment = %segment, "Dropping malformed tag segment");
                    None
                }
            })
            .collect();

        Self { path, metric, tags }
    }

    /// Whether the path carried at least one usable tag pair
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_path() {
        let series = TaggedSeries::parse("disk.used;rack=a1;datacenter=dc1;server=web01");

        assert_eq!(series.metric, "disk.used");
        assert_eq!(series.path, "disk.used;rack=a1;datacenter=dc1;server=web01");
        assert_eq!(
            series.tags,
            vec![("rack", "a1"), ("datacenter", "dc1"), ("server", "web01")]
        );
        assert!(series.has_tags());
    }

    #[test]
    fn test_parse_untagged_path() {
        let series = TaggedSeries::parse("disk.used");

        assert_eq!(series.metric, "disk.used");
        assert!(series.tags.is_empty());
        assert!(!series.has_tags());
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let series = TaggedSeries::parse("q;expr=a=b");
        assert_eq!(series.tags, vec![("expr", "a=b")]);
    }

    #[test]
    fn test_malformed_segments_dropped() {
        let series = TaggedSeries::parse("m;novalue;=orphan;dc=ams;empty=");

        assert_eq!(series.tags, vec![("dc", "ams"), ("empty", "")]);
    }
}
