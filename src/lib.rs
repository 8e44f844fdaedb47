//! # carbon-tags
//!
//! Graphite-compatible tag index service. Series paths of the form
//! `metric;tag1=value1;tag2=value2` are registered over HTTP and indexed in
//! memory, so clients can list tags, count values per tag and resolve
//! `seriesByTag` expressions to the matching series.
//!
//! ## Modules
//!
//! - [`index`]: Tag → value → metric tree with interned ids
//! - [`query`]: Tag expression parsing and evaluation
//! - [`render`]: Boundary to the render pipeline serving series data
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use carbon_tags::index::TagIndex;
//! use carbon_tags::query::TagValueExpr;
//!
//! let index = TagIndex::from_series([
//!     "disk.used;dc=ams;rack=1",
//!     "disk.used;dc=fra;rack=1",
//! ]);
//!
//! let stat = index.stat_tag("dc", "", 100).unwrap();
//! assert_eq!(stat.values.len(), 2);
//!
//! let exprs = [TagValueExpr::parse("rack=1").unwrap()];
//! let series = index.list_metrics(None, &exprs, 100).unwrap();
//! assert_eq!(series.len(), 2);
//! ```

pub mod api;
pub mod config;
pub mod index;
pub mod query;
pub mod render;

// Re-export top-level types for convenience
pub use index::{IndexStats, SharedTagIndex, TagIndex, TagStat, TaggedSeries};

pub use query::{
    EvaluatorConfig, MetricPath, Op, QueryError, QueryEvaluator, QueryResult, TagValueExpr,
    UnsupportedOperatorPolicy,
};

pub use render::{FetchRequest, FetchResponse, NameListFetcher, RenderError, ResponseFormat, SeriesFetcher};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, IndexConfig, LoggingConfig, QueryConfig, ServerConfig};
