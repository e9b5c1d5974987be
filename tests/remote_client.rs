use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kairosdb_datasource::models::{DatasourceInfo, DatasourceQuery, DatasourceRequest, TimeRange};
use kairosdb_datasource::remote::{MetricQuery, MetricQueryRequest, QUERY_PATH};
use kairosdb_datasource::{
    Datasource, DatasourceError, ErrorKind, HttpKairosDbClient, KairosDbClient, QueryContext,
    QueryHandler,
};

async fn spawn_fake_kairosdb(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn recording_app(seen: Arc<Mutex<Vec<Value>>>, reply: Value) -> Router {
    Router::new().route(
        QUERY_PATH,
        post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            let reply = reply.clone();
            async move {
                seen.lock().unwrap().push(body);
                Json(reply)
            }
        }),
    )
}

fn datasource_at(url: &str) -> DatasourceInfo {
    DatasourceInfo {
        name: "kairos".into(),
        url: url.into(),
    }
}

fn simple_request() -> MetricQueryRequest {
    MetricQueryRequest {
        start_absolute: 1_000,
        end_absolute: 2_000,
        metrics: vec![MetricQuery {
            name: "cpu.load".into(),
            ..Default::default()
        }],
    }
}

#[tokio::test]
async fn test_posts_request_and_decodes_queries() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let reply = json!({
        "queries": [{
            "sample_size": 1,
            "results": [{"name": "cpu.load", "group_by": [], "tags": {}, "values": [[1500, 0.25]]}]
        }]
    });
    let url = spawn_fake_kairosdb(recording_app(seen.clone(), reply)).await;

    let client = HttpKairosDbClient::new("http://unused:1", Duration::from_secs(5)).unwrap();
    let results = client
        .query_metrics(&QueryContext::background(), &datasource_at(&url), &simple_request())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].results[0].values[0].1, 0.25);

    let bodies = seen.lock().unwrap();
    assert_eq!(
        bodies[0],
        json!({"start_absolute": 1000, "end_absolute": 2000, "metrics": [{"name": "cpu.load"}]})
    );
}

#[tokio::test]
async fn test_error_status_maps_to_remote_error() {
    let app = Router::new().route(
        QUERY_PATH,
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"errors": ["metrics[0].aggregators[0] invalid aggregator"]})),
            )
        }),
    );
    let url = spawn_fake_kairosdb(app).await;

    let client = HttpKairosDbClient::new(url, Duration::from_secs(5)).unwrap();
    let err = client
        .query_metrics(&QueryContext::background(), &DatasourceInfo::default(), &simple_request())
        .await
        .unwrap_err();

    match err {
        DatasourceError::Remote { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "metrics[0].aggregators[0] invalid aggregator");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let app = Router::new().route(
        QUERY_PATH,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"queries": []}))
        }),
    );
    let url = spawn_fake_kairosdb(app).await;

    let client = HttpKairosDbClient::new(url, Duration::from_millis(100)).unwrap();
    let err = client
        .query_metrics(&QueryContext::background(), &DatasourceInfo::default(), &simple_request())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = HttpKairosDbClient::new(url, Duration::from_secs(2)).unwrap();
    let err = client
        .query_metrics(&QueryContext::background(), &DatasourceInfo::default(), &simple_request())
        .await
        .unwrap_err();

    assert!(matches!(err, DatasourceError::Transport(_)));
}

#[tokio::test]
async fn test_end_to_end_cpu_load_scenario() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let reply = json!({
        "queries": [{
            "sample_size": 2,
            "results": [{
                "name": "cpu.load",
                "group_by": [
                    {"name": "tag", "tags": ["host"], "group": {"host": "h1"}},
                    {"name": "type", "type": "number"}
                ],
                "tags": {"host": ["h1"]},
                "values": [[1000, 1], [2000, 1.5]]
            }]
        }]
    });
    let url = spawn_fake_kairosdb(recording_app(seen.clone(), reply)).await;

    let client = HttpKairosDbClient::new(url, Duration::from_secs(5)).unwrap();
    let datasource = Datasource::new(Arc::new(client));

    let model = json!({
        "query": {
            "metricName": "cpu.load",
            "tags": {"host": ["h1"]},
            "aggregators": [{"name": "avg"}],
            "groupBy": {"tags": ["host"]}
        }
    });
    let request = DatasourceRequest {
        datasource: DatasourceInfo::default(),
        time_range: TimeRange { from_epoch_ms: 1_000, to_epoch_ms: 2_000 },
        queries: vec![DatasourceQuery {
            ref_id: "A".into(),
            model_json: model.to_string(),
        }],
    };

    let response = datasource
        .query(&QueryContext::background(), &request)
        .await
        .unwrap();

    let bodies = seen.lock().unwrap();
    assert_eq!(
        bodies[0]["metrics"][0],
        json!({
            "name": "cpu.load",
            "tags": {"host": ["h1"]},
            "aggregators": [{"name": "avg"}],
            "group_by": [{"name": "tag", "tags": ["host"]}]
        })
    );

    let result = &response.results[0];
    assert_eq!(result.ref_id, "A");
    assert_eq!(result.series[0].name, "cpu.load");
    assert_eq!(result.series[0].tags["host"], "h1");
    assert_eq!(result.series[0].points.len(), 2);
    assert_eq!(result.series[0].points[1].timestamp, 2_000);
    assert_eq!(result.series[0].points[1].value, 1.5);
}
