use std::env;
use std::time::Duration;

use crate::{DatasourceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct DatasourceConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Used when a request's datasource carries no URL.
    pub kairosdb_url: String,
    pub timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for DatasourceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            kairosdb_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_millis(30_000),
            log_format: LogFormat::Compact,
        }
    }
}

impl DatasourceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| DatasourceError::Config(format!("Invalid PORT: {}", e)))?,
            None => defaults.port,
        };

        let timeout = match lookup("KAIROSDB_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.parse().map_err(|e| {
                DatasourceError::Config(format!("Invalid KAIROSDB_TIMEOUT_MS: {}", e))
            })?),
            None => defaults.timeout,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(DatasourceError::Config(format!(
                    "Invalid LOG_FORMAT: {} (expected compact or json)",
                    other
                )))
            }
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            kairosdb_url: lookup("KAIROSDB_URL").unwrap_or(defaults.kairosdb_url),
            timeout,
            log_format,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
