//! Render Boundary
//!
//! The render/fetch pipeline that turns metric names into series data lives
//! outside this crate. This module pins down the interface it is reached
//! through:
//!
//! - **ResponseFormat**: the `format` request parameter
//! - **SeriesFetcher**: `fetch_series(targets) -> response`
//! - **NameListFetcher**: default fetcher answering with the target names
//!
//! # Composition
//!
//! ```text
//! seriesByTag ─ QueryEvaluator::list_metrics ─ (size logged)
//!             └ SeriesFetcher::fetch_series(requested targets) ─ response body
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Response encoding requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Json,
    Pickle,
    Protobuf,
    Protobuf3,
    CarbonApiV2Pb,
    CarbonApiV3Pb,
}

impl ResponseFormat {
    /// Parameter spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Pickle => "pickle",
            ResponseFormat::Protobuf => "protobuf",
            ResponseFormat::Protobuf3 => "protobuf3",
            ResponseFormat::CarbonApiV2Pb => "carbonapi_v2_pb",
            ResponseFormat::CarbonApiV3Pb => "carbonapi_v3_pb",
        }
    }

    /// Parse the `format` parameter, defaulting to JSON when absent or empty
    pub fn from_param(param: Option<&str>) -> Result<Self, RenderError> {
        match param {
            None | Some("") => Ok(ResponseFormat::Json),
            Some(s) => s.parse(),
        }
    }

    /// Formats the tag listing endpoints accept
    pub fn is_tag_format(&self) -> bool {
        matches!(
            self,
            ResponseFormat::Json
                | ResponseFormat::Pickle
                | ResponseFormat::Protobuf
                | ResponseFormat::Protobuf3
        )
    }
}

impl FromStr for ResponseFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ResponseFormat::Json),
            "pickle" => Ok(ResponseFormat::Pickle),
            "protobuf" => Ok(ResponseFormat::Protobuf),
            "protobuf3" => Ok(ResponseFormat::Protobuf3),
            "carbonapi_v2_pb" => Ok(ResponseFormat::CarbonApiV2Pb),
            "carbonapi_v3_pb" => Ok(ResponseFormat::CarbonApiV3Pb),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request handed to the render pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub targets: Vec<String>,
    pub from: String,
    pub until: String,
    pub format: ResponseFormat,
}

/// Encoded response produced by the render pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Errors from format negotiation and fetching
#[derive(Error, Debug)]
pub enum RenderError {
    /// `format` parameter is not a known format
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// Known format the fetcher cannot encode
    #[error("unsupported format: {0}")]
    UnsupportedFormat(ResponseFormat),

    /// Encoding the response failed
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Fetching series data failed
    #[error("fetch failed: {0}")]
    Fetch(String),
}

/// Turns metric names into an encoded response
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    async fn fetch_series(&self, request: &FetchRequest) -> Result<FetchResponse, RenderError>;
}

/// Fetcher answering with the requested target names as a JSON array
///
/// Stands in for the render pipeline when none is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameListFetcher;

#[async_trait]
impl SeriesFetcher for NameListFetcher {
    async fn fetch_series(&self, request: &FetchRequest) -> Result<FetchResponse, RenderError> {
        match request.format {
            ResponseFormat::Json => Ok(FetchResponse {
                content_type: "application/json".to_string(),
                data: serde_json::to_vec(&request.targets)?,
            }),
            other => Err(RenderError::UnsupportedFormat(other)),
        }
    }
}
