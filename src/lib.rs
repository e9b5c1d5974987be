//! KairosDB datasource backend.
//!
//! Translates dashboard panel queries into KairosDB metric queries, runs
//! them as one batched request, and reshapes the result sets into generic
//! time series keyed by each panel's ref id.

pub mod api;
pub mod config;
pub mod context;
pub mod converter;
pub mod datasource;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod remote;

pub use config::DatasourceConfig;
pub use context::{CancelHandle, QueryContext};
pub use datasource::{Datasource, QueryHandler};
pub use error::{DatasourceError, ErrorKind, Result};
pub use remote::{HttpKairosDbClient, KairosDbClient};
