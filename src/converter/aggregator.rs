use crate::models::Aggregator;
use crate::remote;
use crate::{DatasourceError, Result};

pub trait AggregatorConverter: Send + Sync {
    fn convert(&self, aggregator: &Aggregator) -> Result<remote::Aggregator>;
}

/// Structural translation only. Function names and sampling units are not
/// checked here; KairosDB rejects what it does not know.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAggregatorConverter;

impl AggregatorConverter for DefaultAggregatorConverter {
    fn convert(&self, aggregator: &Aggregator) -> Result<remote::Aggregator> {
        if aggregator.name.is_empty() {
            return Err(DatasourceError::invalid_argument(
                "aggregator name must not be empty",
            ));
        }

        Ok(remote::Aggregator {
            name: aggregator.name.clone(),
            sampling: aggregator.sampling.as_ref().map(|sampling| remote::Sampling {
                value: sampling.value,
                unit: sampling.unit.clone(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Sampling;

    #[test]
    fn test_name_and_sampling_preserved() {
        let aggregator = Aggregator {
            name: "sum".into(),
            sampling: Some(Sampling { value: 5, unit: "minutes".into() }),
        };

        let result = DefaultAggregatorConverter.convert(&aggregator).unwrap();
        assert_eq!(result.name, "sum");
        assert_eq!(
            result.sampling,
            Some(remote::Sampling { value: 5, unit: "minutes".into() })
        );
    }

    #[test]
    fn test_without_sampling() {
        let aggregator = Aggregator { name: "max".into(), sampling: None };
        let result = DefaultAggregatorConverter.convert(&aggregator).unwrap();
        assert_eq!(result.name, "max");
        assert!(result.sampling.is_none());
    }

    #[test]
    fn test_unknown_name_forwarded() {
        let aggregator = Aggregator {
            name: "not_a_real_function".into(),
            sampling: Some(Sampling { value: 1, unit: "fortnights".into() }),
        };

        let result = DefaultAggregatorConverter.convert(&aggregator).unwrap();
        assert_eq!(result.name, "not_a_real_function");
        assert_eq!(result.sampling.unwrap().unit, "fortnights");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = DefaultAggregatorConverter
            .convert(&Aggregator::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
