use crate::converter::{
    AggregatorConverter, DefaultAggregatorConverter, DefaultGroupByConverter, GroupByConverter,
};
use crate::models::MetricQuery;
use crate::remote;
use crate::Result;

pub trait MetricQueryConverter: Send + Sync {
    fn convert(&self, query: &MetricQuery) -> Result<remote::MetricQuery>;
}

#[derive(Debug, Clone)]
pub struct DefaultMetricQueryConverter<
    A = DefaultAggregatorConverter,
    G = DefaultGroupByConverter,
> {
    aggregator_converter: A,
    group_by_converter: G,
}

impl DefaultMetricQueryConverter {
    pub fn new() -> Self {
        Self::with_converters(DefaultAggregatorConverter, DefaultGroupByConverter)
    }
}

impl Default for DefaultMetricQueryConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, G> DefaultMetricQueryConverter<A, G>
where
    A: AggregatorConverter,
    G: GroupByConverter,
{
    pub fn with_converters(aggregator_converter: A, group_by_converter: G) -> Self {
        Self {
            aggregator_converter,
            group_by_converter,
        }
    }
}

impl<A, G> MetricQueryConverter for DefaultMetricQueryConverter<A, G>
where
    A: AggregatorConverter,
    G: GroupByConverter,
{
    fn convert(&self, query: &MetricQuery) -> Result<remote::MetricQuery> {
        let aggregators = query
            .aggregators
            .iter()
            .map(|aggregator| self.aggregator_converter.convert(aggregator))
            .collect::<Result<Vec<_>>>()?;

        let group_by = match &query.group_by {
            Some(group_by) => {
                let groupers = self.group_by_converter.convert(Some(group_by))?;
                // An empty grouper list is left off the wire, not sent as [].
                (!groupers.is_empty()).then_some(groupers)
            }
            None => None,
        };

        Ok(remote::MetricQuery {
            name: query.name.clone(),
            tags: query.tags.clone(),
            aggregators,
            group_by,
        })
    }
}
