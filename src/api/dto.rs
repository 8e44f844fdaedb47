//! Data Transfer Objects
//!
//! Request parameters and response bodies for the API endpoints. Tag
//! responses keep the capitalised field names graphite clients expect.

use serde::{Deserialize, Serialize};

use crate::index::{IndexStats, TagStat};

// ============================================
// REQUEST PARAMETERS
// ============================================

/// Raw `name=value` pairs from a query string or urlencoded body
///
/// Names may repeat (`tagValues=..&tagValues=..`), so pairs are kept in
/// order instead of being collected into a map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormParams(pub Vec<(String, String)>);

impl FormParams {
    /// First value for `name`
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in request order
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `name`, or an empty string
    pub fn value(&self, name: &str) -> &str {
        self.first(name).unwrap_or_default()
    }

    /// `limit` parameter, falling back to `default` when missing or not an
    /// integer. Negative limits clamp to 0.
    pub fn limit(&self, default: usize) -> usize {
        self.first("limit")
            .and_then(|s| s.parse::<i64>().ok())
            .map(|n| usize::try_from(n.max(0)).unwrap_or(usize::MAX))
            .unwrap_or(default)
    }
}

// ============================================
// TAG DTOs
// ============================================

/// GET /tags/{tag} response
///
/// An empty value list is sent as `null`, as graphite clients receive it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatTagResponse {
    pub tag: String,
    pub values: Option<Vec<TagValueDto>>,
}

/// Single value entry of a [`StatTagResponse`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagValueDto {
    pub count: u64,
    pub value: String,
}

impl From<TagStat> for StatTagResponse {
    fn from(stat: TagStat) -> Self {
        let values: Vec<TagValueDto> = stat
            .values
            .into_iter()
            .map(|v| TagValueDto {
                count: v.count as u64,
                value: v.value,
            })
            .collect();

        Self {
            tag: stat.tag,
            values: non_empty(values),
        }
    }
}

/// GET /tags/ response; `null` tags when the index is empty
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsResponse {
    pub tags: Option<Vec<TagNameDto>>,
}

/// Single tag entry of a [`ListTagsResponse`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagNameDto {
    pub tag: String,
}

impl From<Vec<String>> for ListTagsResponse {
    fn from(tags: Vec<String>) -> Self {
        Self {
            tags: non_empty(tags.into_iter().map(|tag| TagNameDto { tag }).collect()),
        }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub index: IndexStats,
}
