//! Tag Index Structures
//!
//! In-memory index answering "which series carry `tag=value`":
//!
//! - **StringInterner**: string ↔ id tables for metrics, paths and tag values
//! - **OrderedContainer**: sorted map used at every tree level
//! - **TagIndex**: tag → value → metric tree with posting lists of path ids
//! - **SharedTagIndex**: reader/writer lock and rebuild-and-swap
//!
//! # Architecture
//!
//! ```text
//! POST tagMultiSeries "disk.used;dc=ams;rack=1"
//!        ↓
//! TaggedSeries: metric "disk.used", tags [(dc, ams), (rack, 1)]
//!        ↓
//! TagIndex::insert per pair:  dc ─ ams ─ disk.used [path#0]
//!                             rack ─ 1 ─ disk.used [path#0]
//! ```

mod interner;
mod ordered;
mod series;
mod shared;
mod tag_index;

pub use interner::StringInterner;
pub use ordered::{Cursor, OrderedContainer};
pub use series::TaggedSeries;
pub use shared::SharedTagIndex;
pub use tag_index::{MetricNode, TagIndex, TagNode, TagStat, TagStatValue, ValueNode};

use serde::Serialize;

/// Statistics about index size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of tag names
    pub tags: usize,
    /// Number of (tag, value) nodes
    pub tag_values: usize,
    /// Number of interned metric names
    pub metrics: usize,
    /// Number of interned series paths
    pub paths: usize,
    /// Number of interned tag-value strings (shared across tags)
    pub distinct_values: usize,
}
