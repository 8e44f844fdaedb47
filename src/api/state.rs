//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::Config;
use crate::index::SharedTagIndex;
use crate::query::QueryEvaluator;
use crate::render::{NameListFetcher, SeriesFetcher};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Tag index, shared with any background rebuild
    pub index: SharedTagIndex,
    /// Evaluator for seriesByTag expressions
    pub evaluator: Arc<QueryEvaluator>,
    /// Render pipeline producing seriesByTag payloads
    pub fetcher: Arc<dyn SeriesFetcher>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with the default evaluator and name-list fetcher
    pub fn new(index: SharedTagIndex, config: ApiConfig) -> Self {
        Self {
            index,
            evaluator: Arc::new(QueryEvaluator::default()),
            fetcher: Arc::new(NameListFetcher),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Replace the query evaluator
    pub fn with_evaluator(mut self, evaluator: QueryEvaluator) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    /// Replace the render pipeline
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SeriesFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Limit applied when a request carries none
    pub default_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            default_limit: 100,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Derive API settings from the file/env configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            request_timeout_secs: config.server.request_timeout_secs,
            default_limit: config.query.default_limit,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
