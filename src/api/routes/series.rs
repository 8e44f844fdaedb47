//! Series Routes
//!
//! - GET /seriesByTag - Resolve tag expressions and hand the request to the
//!   render pipeline

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::FormParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::query::TagValueExpr;
use crate::render::{FetchRequest, ResponseFormat};

/// GET /seriesByTag
///
/// Parameters: `target` (repeatable), `from`, `until`, `format`,
/// `metricExpr`, `tagValues` (repeatable), `limit`.
///
/// The matching metrics are resolved and logged; the response body comes
/// from the configured [`SeriesFetcher`](crate::render::SeriesFetcher)
/// for the requested targets.
pub async fn series_by_tag(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormParams>,
) -> ApiResult<Response> {
    let started = Instant::now();

    let metric_expr = match params.value("metricExpr") {
        "" => None,
        expr => Some(TagValueExpr::parse(expr)?),
    };
    let tag_values = params
        .all("tagValues")
        .map(TagValueExpr::parse)
        .collect::<Result<Vec<_>, _>>()?;
    let limit = params.limit(state.config.default_limit);

    let format = ResponseFormat::from_param(params.first("format"))?;
    let targets: Vec<String> = params.all("target").map(str::to_string).collect();

    if tag_values.is_empty() {
        return Err(ApiError::Validation("no query".to_string()));
    }

    let metrics = state.index.read(|index| {
        state
            .evaluator
            .list_metrics(index, metric_expr.as_ref(), &tag_values, limit)
    })?;

    let request = FetchRequest {
        targets,
        from: params.value("from").to_string(),
        until: params.value("until").to_string(),
        format,
    };
    let fetched = state.fetcher.fetch_series(&request).await?;

    tracing::info!(
        handler = "seriesByTag",
        targets = ?request.targets,
        format = %format,
        metrics = metrics.len(),
        http_code = StatusCode::OK.as_u16(),
        runtime_us = started.elapsed().as_micros() as u64,
        "request served"
    );

    Ok(([(header::CONTENT_TYPE, fetched.content_type)], fetched.data).into_response())
}
