//! KairosDB REST wire types for `/api/v1/datapoints/query`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::TagFilters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQueryRequest {
    pub start_absolute: i64,
    pub end_absolute: i64,
    pub metrics: Vec<MetricQuery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: TagFilters,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregators: Vec<Aggregator>,
    /// Omitted from the wire entirely when no grouping was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<Grouper>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregator {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Sampling>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    pub value: i64,
    pub unit: String,
}

/// One grouping dimension. KairosDB accepts several per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Grouper {
    Tag { tags: Vec<String> },
    Time { range_size: Sampling, group_count: i64 },
    Value { range_size: i64 },
}

impl Grouper {
    pub fn name(&self) -> &'static str {
        match self {
            Grouper::Tag { .. } => "tag",
            Grouper::Time { .. } => "time",
            Grouper::Value { .. } => "value",
        }
    }
}

/// Body of a successful query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricQueryResponse {
    #[serde(default)]
    pub queries: Vec<MetricQueryResults>,
}

/// Body of a failed request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Result set for one submitted metric query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricQueryResults {
    #[serde(default)]
    pub sample_size: i64,
    #[serde(default)]
    pub results: Vec<MetricQueryResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricQueryResult {
    pub name: String,
    #[serde(default)]
    pub group_by: Vec<GroupResult>,
    #[serde(default)]
    pub tags: TagFilters,
    #[serde(default)]
    pub values: Vec<DataPoint>,
}

impl MetricQueryResult {
    /// Tag values identifying this series within a `tag` grouping, or an
    /// empty map when the query was not grouped by tag.
    pub fn tagged_group(&self) -> BTreeMap<String, String> {
        self.group_by
            .iter()
            .find(|group| group.name == "tag")
            .map(|group| {
                group
                    .group
                    .iter()
                    .map(|(key, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Grouping description attached to a result series, e.g.
/// `{"name":"tag","tags":["host"],"group":{"host":"h1"}}` or
/// `{"name":"type","type":"number"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub group: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// `[timestamp, value]` pair. Both sides decode from integer or float JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint(pub f64, pub f64);
