use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag key to the values a series must carry for that key.
pub type TagFilters = BTreeMap<String, Vec<String>>;

// Dashboard panel model

/// Envelope of a panel's serialized model. Only the `query` object is used.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricRequest {
    pub query: Option<MetricQuery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    #[serde(rename = "metricName", default)]
    pub name: String,
    #[serde(default)]
    pub tags: TagFilters,
    #[serde(default)]
    pub aggregators: Vec<Aggregator>,
    #[serde(default)]
    pub group_by: Option<GroupBy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregator {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sampling: Option<Sampling>,
}

/// Bucket width for time-bucketed aggregators. `unit` is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    pub value: i64,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    #[serde(default)]
    pub tags: Vec<String>,
}

// Host boundary

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub from_epoch_ms: i64,
    pub to_epoch_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceQuery {
    pub ref_id: String,
    /// Serialized panel model, parsed lazily by a `QueryModelParser`.
    pub model_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceRequest {
    #[serde(default)]
    pub datasource: DatasourceInfo,
    pub time_range: TimeRange,
    pub queries: Vec<DatasourceQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub ref_id: String,
    pub series: Vec<TimeSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasourceResponse {
    pub results: Vec<QueryResult>,
}
