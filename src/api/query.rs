use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    config::DatasourceConfig,
    context::QueryContext,
    datasource::QueryHandler,
    metrics,
    models::{DatasourceRequest, DatasourceResponse},
    DatasourceError, Result,
};

#[derive(Clone)]
pub struct ApiState {
    pub handler: Arc<dyn QueryHandler>,
    /// Deadline applied to every batch.
    pub timeout: Duration,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Dropping this future on client disconnect also drops the pending
// KairosDB call.
async fn query(
    State(state): State<ApiState>,
    request: std::result::Result<Json<DatasourceRequest>, JsonRejection>,
) -> Result<Json<DatasourceResponse>> {
    let Json(request) = request.map_err(|rejection| {
        let err = DatasourceError::invalid_argument(rejection.body_text());
        metrics::record_failure(err.kind());
        err
    })?;

    info!(queries = request.queries.len(), "Handling batch query");

    let ctx = QueryContext::background().with_timeout(state.timeout);
    let response = state.handler.query(&ctx, &request).await?;

    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_text(),
    )
}

pub async fn serve(config: &DatasourceConfig, handler: Arc<dyn QueryHandler>) -> Result<()> {
    let app = router(ApiState {
        handler,
        timeout: config.timeout,
    });

    let addr = config.listen_addr();
    info!("Starting datasource on {}", addr);

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        DatasourceError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DatasourceError::Internal(format!("Server error: {}", e)))?;

    info!("Datasource stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
