pub mod client;
pub mod types;

pub use client::{HttpKairosDbClient, KairosDbClient, QUERY_PATH};
pub use types::*;
