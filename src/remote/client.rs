use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::DatasourceConfig;
use crate::context::QueryContext;
use crate::models::DatasourceInfo;
use crate::remote::types::{
    ErrorResponse, MetricQueryRequest, MetricQueryResponse, MetricQueryResults,
};
use crate::{DatasourceError, Result};

pub const QUERY_PATH: &str = "/api/v1/datapoints/query";

/// Executes a batched metric query against a KairosDB instance.
///
/// Implementations must return one result set per submitted metric, in
/// submission order.
#[async_trait]
pub trait KairosDbClient: Send + Sync {
    async fn query_metrics(
        &self,
        ctx: &QueryContext,
        datasource: &DatasourceInfo,
        request: &MetricQueryRequest,
    ) -> Result<Vec<MetricQueryResults>>;
}

/// KairosDB REST client over reqwest.
#[derive(Debug, Clone)]
pub struct HttpKairosDbClient {
    http: reqwest::Client,
    default_url: String,
    timeout: Duration,
}

impl HttpKairosDbClient {
    pub fn new(default_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kairosdb-datasource/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DatasourceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            default_url: default_url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &DatasourceConfig) -> Result<Self> {
        Self::new(config.kairosdb_url.clone(), config.timeout)
    }

    fn query_url(&self, datasource: &DatasourceInfo) -> String {
        let base = if datasource.url.is_empty() {
            &self.default_url
        } else {
            &datasource.url
        };
        format!("{}{}", base.trim_end_matches('/'), QUERY_PATH)
    }
}

#[async_trait]
impl KairosDbClient for HttpKairosDbClient {
    #[instrument(skip_all, fields(datasource = %datasource.name, metrics = request.metrics.len()))]
    async fn query_metrics(
        &self,
        ctx: &QueryContext,
        datasource: &DatasourceInfo,
        request: &MetricQueryRequest,
    ) -> Result<Vec<MetricQueryResults>> {
        let url = self.query_url(datasource);
        let timeout = ctx
            .remaining()
            .map_or(self.timeout, |remaining| remaining.min(self.timeout));

        debug!(%url, ?timeout, "Posting KairosDB query");

        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
                _ if !body.is_empty() => body,
                _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(DatasourceError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body: MetricQueryResponse = response.json().await?;
        debug!(result_sets = body.queries.len(), "KairosDB query complete");
        Ok(body.queries)
    }
}
