pub mod query;

pub use query::{router, serve, ApiState};
