//! Batch query orchestration.
//!
//! A batch is all-or-nothing: every panel model is parsed and converted
//! before the single KairosDB call is issued, and result set `i` is attached
//! to the ref id of query `i`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::context::QueryContext;
use crate::converter::{DefaultMetricQueryConverter, MetricQueryConverter};
use crate::metrics;
use crate::models::{DatasourceQuery, DatasourceRequest, DatasourceResponse};
use crate::parser::{parse_query_result, JsonQueryModelParser, QueryModelParser};
use crate::remote::{
    self, KairosDbClient, MetricQueryRequest, MetricQueryResult, MetricQueryResults,
};
use crate::{DatasourceError, Result};

/// The contract a host transport calls into: batch query in, batch result out.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn query(
        &self,
        ctx: &QueryContext,
        request: &DatasourceRequest,
    ) -> Result<DatasourceResponse>;
}

pub struct Datasource {
    client: Arc<dyn KairosDbClient>,
    converter: Box<dyn MetricQueryConverter>,
    model_parser: Box<dyn QueryModelParser>,
}

impl Datasource {
    pub fn new(client: Arc<dyn KairosDbClient>) -> Self {
        Self {
            client,
            converter: Box::new(DefaultMetricQueryConverter::new()),
            model_parser: Box::new(JsonQueryModelParser),
        }
    }

    pub fn with_converter(mut self, converter: impl MetricQueryConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn with_model_parser(mut self, parser: impl QueryModelParser + 'static) -> Self {
        self.model_parser = Box::new(parser);
        self
    }

    fn create_remote_metric_query(&self, query: &DatasourceQuery) -> Result<remote::MetricQuery> {
        let metric_query = self.model_parser.parse(&query.model_json)?;
        self.converter.convert(&metric_query)
    }

    #[instrument(skip_all, fields(queries = request.queries.len()))]
    async fn execute(
        &self,
        ctx: &QueryContext,
        request: &DatasourceRequest,
    ) -> Result<DatasourceResponse> {
        if request.queries.is_empty() {
            // KairosDB rejects a query with no metrics.
            return Ok(DatasourceResponse::default());
        }

        let ref_ids: Vec<&str> = request.queries.iter().map(|q| q.ref_id.as_str()).collect();
        let remote_queries = request
            .queries
            .iter()
            .map(|query| self.create_remote_metric_query(query))
            .collect::<Result<Vec<_>>>()?;

        metrics::record_queries(remote_queries.len());

        let remote_request = MetricQueryRequest {
            start_absolute: request.time_range.from_epoch_ms,
            end_absolute: request.time_range.to_epoch_ms,
            metrics: remote_queries,
        };

        debug!(
            start = remote_request.start_absolute,
            end = remote_request.end_absolute,
            "Issuing KairosDB query"
        );

        let started = Instant::now();
        let results = ctx
            .run(self.client.query_metrics(ctx, &request.datasource, &remote_request))
            .await;
        metrics::record_remote_duration(started.elapsed().as_secs_f64());

        let results = results.map_err(|e| {
            warn!("KairosDB query failed: {}", e);
            e
        })?;

        if results.len() != ref_ids.len() {
            return Err(DatasourceError::ResultMismatch {
                expected: ref_ids.len(),
                actual: results.len(),
            });
        }

        let results = results
            .iter()
            .zip(&remote_request.metrics)
            .zip(ref_ids)
            .map(|((result, submitted), ref_id)| {
                if let Some(series) = renamed_series(result, &submitted.name) {
                    warn!(
                        ref_id,
                        submitted = %submitted.name,
                        returned = %series.name,
                        "Result series name differs from submitted metric"
                    );
                }

                let mut parsed = parse_query_result(result);
                parsed.ref_id = ref_id.to_string();
                parsed
            })
            .collect();

        Ok(DatasourceResponse { results })
    }
}

/// First series in `result` whose name is not the metric that was submitted.
fn renamed_series<'a>(
    result: &'a MetricQueryResults,
    submitted: &str,
) -> Option<&'a MetricQueryResult> {
    result.results.iter().find(|series| series.name != submitted)
}

#[async_trait]
impl QueryHandler for Datasource {
    async fn query(
        &self,
        ctx: &QueryContext,
        request: &DatasourceRequest,
    ) -> Result<DatasourceResponse> {
        let _timer = metrics::RequestTimer::new();
        let response = self.execute(ctx, request).await;
        if let Err(e) = &response {
            metrics::record_failure(e.kind());
        }
        response
    }
}
