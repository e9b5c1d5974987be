use std::sync::Arc;

use kairosdb_datasource::{
    api, logging, metrics, Datasource, DatasourceConfig, HttpKairosDbClient,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("kairosdb-datasource: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> kairosdb_datasource::Result<()> {
    let config = DatasourceConfig::from_env()?;

    // Initialize logging
    logging::init_logger("kairosdb-datasource", config.log_format)?;

    // Initialize metrics
    metrics::init_metrics();

    let client = HttpKairosDbClient::from_config(&config)?;
    let datasource = Datasource::new(Arc::new(client));

    tracing::info!(kairosdb_url = %config.kairosdb_url, "Datasource configured");

    api::serve(&config, Arc::new(datasource)).await
}
