//! Dashboard query model to KairosDB query translation.

pub mod aggregator;
pub mod group_by;
pub mod metric_query;

pub use aggregator::{AggregatorConverter, DefaultAggregatorConverter};
pub use group_by::{DefaultGroupByConverter, GroupByConverter};
pub use metric_query::{DefaultMetricQueryConverter, MetricQueryConverter};
