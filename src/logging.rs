use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::{DatasourceError, Result};

/// Sets up the logging subscriber for the application.
///
/// `RUST_LOG` takes precedence; otherwise the crate logs at `info`.
///
/// # Arguments
/// * `service` - Name recorded in the startup event
/// * `format` - Compact human-readable lines or one JSON object per event
pub fn init_logger(service: &str, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), Level::INFO))
        });

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    };

    result.map_err(|e| DatasourceError::Internal(format!("Failed to initialize logger: {}", e)))?;

    tracing::info!(service, ?format, "Logging initialized");
    Ok(())
}
