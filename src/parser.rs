use tracing::debug;

use crate::models::{MetricQuery, MetricRequest, Point, QueryResult, TimeSeries};
use crate::remote::MetricQueryResults;
use crate::{DatasourceError, Result};

/// Turns one panel's serialized model into a dashboard query.
pub trait QueryModelParser: Send + Sync {
    fn parse(&self, model_json: &str) -> Result<MetricQuery>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonQueryModelParser;

impl QueryModelParser for JsonQueryModelParser {
    fn parse(&self, model_json: &str) -> Result<MetricQuery> {
        let request: MetricRequest = serde_json::from_str(model_json).map_err(|e| {
            debug!(value = model_json, "Failed to unmarshal JSON");
            DatasourceError::invalid_argument(format!("failed to unmarshal request model: {}", e))
        })?;

        let query = request.query.ok_or_else(|| {
            DatasourceError::invalid_argument("request model has no query object")
        })?;

        if query.name.is_empty() {
            return Err(DatasourceError::invalid_argument("metricName must not be empty"));
        }

        Ok(query)
    }
}

/// Reshapes one remote result set into generic series. The returned
/// `ref_id` is empty; the caller assigns it.
pub fn parse_query_result(results: &MetricQueryResults) -> QueryResult {
    let series = results
        .results
        .iter()
        .map(|result| TimeSeries {
            name: result.name.clone(),
            tags: result.tagged_group(),
            points: result
                .values
                .iter()
                .map(|point| Point {
                    // `as` truncates toward zero.
                    timestamp: point.0 as i64,
                    value: point.1,
                })
                .collect(),
        })
        .collect();

    QueryResult {
        ref_id: String::new(),
        series,
    }
}
