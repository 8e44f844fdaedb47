//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::query::{EvaluatorConfig, UnsupportedOperatorPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Tag index configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfig {
    /// Newline-separated tagged series paths loaded at start-up
    pub seed_file: Option<String>,
}

/// Query evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Limit used when a request carries none (or an unparsable one)
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Fail queries using `=~` / `!=~` instead of matching nothing
    #[serde(default)]
    pub reject_unsupported_operators: bool,

    #[serde(default = "default_combination_warn_threshold")]
    pub combination_warn_threshold: usize,
}

fn default_limit() -> usize {
    100
}

fn default_combination_warn_threshold() -> usize {
    10_000
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            reject_unsupported_operators: false,
            combination_warn_threshold: default_combination_warn_threshold(),
        }
    }
}

impl QueryConfig {
    /// Evaluator settings derived from this section
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            unsupported_operators: if self.reject_unsupported_operators {
                UnsupportedOperatorPolicy::Reject
            } else {
                UnsupportedOperatorPolicy::MatchNothing
            },
            combination_warn_threshold: self.combination_warn_threshold,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("carbon-tags").join("config.toml")),
            Some(PathBuf::from("/etc/carbon-tags/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("CARBON_TAGS_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("CARBON_TAGS_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(seed_file) = std::env::var("CARBON_TAGS_SEED_FILE") {
            self.index.seed_file = Some(seed_file);
        }

        if let Ok(level) = std::env::var("CARBON_TAGS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CARBON_TAGS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# carbon-tags Configuration
#
# Environment variables override these settings:
# - CARBON_TAGS_HOST
# - CARBON_TAGS_PORT
# - CARBON_TAGS_SEED_FILE
# - CARBON_TAGS_LOG_LEVEL
# - CARBON_TAGS_LOG_FORMAT

[server]
# HTTP server host
host = "0.0.0.0"

# HTTP server port
port = 8080

# Request timeout in seconds
request_timeout_secs = 30

[index]
# Optional file of tagged series paths (one per line, '#' comments)
# loaded into the index at start-up
# seed_file = "/var/lib/carbon-tags/series.txt"

[query]
# Limit used when a request does not pass one
default_limit = 100

# Fail seriesByTag queries using =~ or !=~ instead of matching nothing
reject_unsupported_operators = false

# Warn when a query expands to more tag-value combinations than this
combination_warn_threshold = 10000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.query.default_limit, 100);
        assert!(!config.query.reject_unsupported_operators);
        assert!(config.index.seed_file.is_none());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.query.combination_warn_threshold, 10_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [query]
            reject_unsupported_operators = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.query.evaluator_config().unsupported_operators,
            UnsupportedOperatorPolicy::Reject
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 2007\n\n[index]\nseed_file = \"series.txt\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 2007);
        assert_eq!(config.index.seed_file.as_deref(), Some("series.txt"));
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/carbon-tags.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == file.path()));
    }
}
