//! Tag Routes
//!
//! Tag discovery and registration endpoints.
//!
//! - GET /tags/:tag - Value counts for one tag
//! - GET /tags/ - List tag names
//! - POST /tags/tagMultiSeries - Register tagged series paths

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::{FormParams, ListTagsResponse, StatTagResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::index::TaggedSeries;
use crate::render::ResponseFormat;

/// GET /tags/:tag
///
/// Per-value metric counts for `tag`, optionally narrowed to values
/// starting with `filter`.
pub async fn stat_tag(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
    Query(params): Query<FormParams>,
) -> ApiResult<Response> {
    let started = Instant::now();

    let format = tag_format(&params)?;
    if tag.is_empty() {
        return Err(ApiError::Validation("no tag specified".to_string()));
    }

    let filter = params.value("filter");
    let limit = params.limit(state.config.default_limit);

    let stat = state.index.read(|index| index.stat_tag(&tag, filter, limit));

    let response = match stat {
        Some(stat) => encode(format, &StatTagResponse::from(stat))?,
        None => empty_response(),
    };

    tracing::info!(
        handler = "statTag",
        tag = %tag,
        filter = %filter,
        format = %format,
        http_code = StatusCode::OK.as_u16(),
        runtime_us = started.elapsed().as_micros() as u64,
        "request served"
    );

    Ok(response)
}

/// GET /tags/
///
/// Tag names in ascending order. The `filter` parameter is accepted but
/// does not narrow the listing.
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormParams>,
) -> ApiResult<Response> {
    let started = Instant::now();

    let format = tag_format(&params)?;
    let filter = params.value("filter");
    let limit = params.limit(state.config.default_limit);

    let tags = state.index.read(|index| index.list_tags(filter, limit));
    let found = tags.len();

    let response = encode(format, &ListTagsResponse::from(tags))?;

    tracing::info!(
        handler = "listTags",
        filter = %filter,
        format = %format,
        tags = found,
        http_code = StatusCode::OK.as_u16(),
        runtime_us = started.elapsed().as_micros() as u64,
        "request served"
    );

    Ok(response)
}

/// POST /tags/tagMultiSeries
///
/// Registers every `path` form value. Paths without any `tag=value`
/// segment are skipped. Responds with the accepted paths as JSON; `format`
/// is only checked against the known formats.
pub async fn tag_multi_series(
    State(state): State<Arc<AppState>>,
    Form(params): Form<FormParams>,
) -> ApiResult<Response> {
    let started = Instant::now();

    ResponseFormat::from_param(params.first("format"))?;

    let mut accepted = Vec::new();
    let mut skipped = 0usize;

    state.index.write(|index| {
        for path in params.all("path") {
            let series = TaggedSeries::parse(path);
            if index.insert_series(&series) {
                accepted.push(path.to_string());
            } else {
                skipped += 1;
                tracing::warn!(path = %path, "Ignoring series path without tags");
            }
        }
    });

    let response = encode(ResponseFormat::Json, &accepted)?;

    tracing::info!(
        handler = "tagMultiSeries",
        accepted = accepted.len(),
        skipped,
        http_code = StatusCode::OK.as_u16(),
        runtime_us = started.elapsed().as_micros() as u64,
        "request served"
    );

    Ok(response)
}

/// Resolve the `format` parameter for the tag endpoints
///
/// Unlike seriesByTag, a missing format is rejected.
fn tag_format(params: &FormParams) -> ApiResult<ResponseFormat> {
    let format = params
        .value("format")
        .parse::<ResponseFormat>()
        .map_err(|_| ApiError::Validation("unsupported format".to_string()))?;

    if !format.is_tag_format() {
        return Err(ApiError::Validation("unsupported format".to_string()));
    }
    Ok(format)
}

/// Encode `body` in `format`
///
/// Only JSON has an encoder; other accepted formats answer with `{}`.
fn encode<T: Serialize>(format: ResponseFormat, body: &T) -> ApiResult<Response> {
    match format {
        ResponseFormat::Json => {
            let data = serde_json::to_vec(body)?;
            Ok(([(header::CONTENT_TYPE, "application/json")], data).into_response())
        }
        _ => Ok(empty_response()),
    }
}

fn empty_response() -> Response {
    Response::new(Body::from("{}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FormParams {
        FormParams(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_tag_format() {
        assert_eq!(
            tag_format(&params(&[("format", "json")])).unwrap(),
            ResponseFormat::Json
        );
        assert_eq!(
            tag_format(&params(&[("format", "pickle")])).unwrap(),
            ResponseFormat::Pickle
        );
        assert!(tag_format(&params(&[])).is_err());
        assert!(tag_format(&params(&[("format", "carbonapi_v3_pb")])).is_err());
        assert!(tag_format(&params(&[("format", "csv")])).is_err());
    }

    #[test]
    fn test_non_json_encodes_empty_object() {
        let response = encode(ResponseFormat::Protobuf, &vec!["a"]).unwrap();
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
