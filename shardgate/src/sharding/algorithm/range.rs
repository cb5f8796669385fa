use shardgate_config::Properties;

use super::{target_with_suffix, Error, PreciseShardingValue, RangeShardingValue};
use super::StandardShardingAlgorithm;

/// Values split into partitions by ascending boundaries.
///
/// Partition `0` holds everything below the first boundary, partition `n` everything
/// at or above the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePartitions {
    boundaries: Vec<i64>,
}

impl RangePartitions {
    /// `BOUNDARY_RANGE`: `sharding-ranges = "1,5,10"`.
    pub fn boundary(name: &str, props: &Properties) -> Result<Self, Error> {
        let ranges = props
            .string("sharding-ranges")
            .ok_or_else(|| missing(name, "sharding-ranges"))?;

        let mut boundaries = vec![];
        for boundary in ranges.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let boundary = boundary.parse::<i64>().map_err(|err| Error::InvalidProperty {
                algorithm: name.to_string(),
                property: "sharding-ranges".into(),
                reason: err.to_string(),
            })?;
            boundaries.push(boundary);
        }

        Self::new(name, "sharding-ranges", boundaries)
    }

    /// `VOLUME_RANGE`: `range-lower`, `range-upper` and `sharding-volume`.
    pub fn volume(name: &str, props: &Properties) -> Result<Self, Error> {
        let lower = props
            .integer("range-lower")
            .ok_or_else(|| missing(name, "range-lower"))?;
        let upper = props
            .integer("range-upper")
            .ok_or_else(|| missing(name, "range-upper"))?;
        let volume = props
            .integer("sharding-volume")
            .ok_or_else(|| missing(name, "sharding-volume"))?;

        if volume <= 0 || upper <= lower {
            return Err(Error::InvalidProperty {
                algorithm: name.to_string(),
                property: "sharding-volume".into(),
                reason: format!(
                    "expected a positive volume and range-lower < range-upper, got {} in {}..{}",
                    volume, lower, upper
                ),
            });
        }

        let mut boundaries = vec![];
        let mut boundary = lower;
        while boundary < upper {
            boundaries.push(boundary);
            boundary = boundary.saturating_add(volume);
        }
        boundaries.push(upper);

        Self::new(name, "sharding-volume", boundaries)
    }

    fn new(name: &str, property: &str, boundaries: Vec<i64>) -> Result<Self, Error> {
        if boundaries.is_empty() || boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidProperty {
                algorithm: name.to_string(),
                property: property.to_string(),
                reason: "boundaries must be ascending".into(),
            });
        }

        Ok(Self { boundaries })
    }

    /// Partition holding `value`.
    fn partition(&self, value: i64) -> usize {
        self.boundaries.partition_point(|b| *b <= value)
    }

    fn partitions(&self) -> usize {
        self.boundaries.len() + 1
    }
}

fn missing(name: &str, property: &str) -> Error {
    Error::MissingProperty {
        algorithm: name.to_string(),
        property: property.to_string(),
    }
}

impl StandardShardingAlgorithm for RangePartitions {
    fn precise(&self, available: &[String], value: &PreciseShardingValue) -> Option<String> {
        let partition = self.partition(value.value.integer()?);
        target_with_suffix(available, partition as i64)
    }

    fn range(&self, available: &[String], value: &RangeShardingValue) -> Result<Vec<String>, Error> {
        let (lower, upper) = value.integer_bounds();
        let first = lower.map(|l| self.partition(l)).unwrap_or(0);
        let last = upper
            .map(|u| self.partition(u))
            .unwrap_or(self.partitions() - 1);

        Ok((first..=last)
            .filter_map(|partition| target_with_suffix(available, partition as i64))
            .collect())
    }
}

#[cfg(test)]
mod test {
    use std::ops::Bound;

    use super::*;
    use crate::statement::Value;

    fn available(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t_log_{}", i)).collect()
    }

    #[test]
    fn test_boundary_range() {
        let props: Properties = [("sharding-ranges", "1, 5, 10")].into_iter().collect();
        let algorithm = RangePartitions::boundary("boundary", &props).unwrap();

        let value = Value::Integer(7);
        let precise = PreciseShardingValue {
            table: "t_log",
            column: "id",
            value: &value,
        };
        assert_eq!(
            algorithm.precise(&available(4), &precise).as_deref(),
            Some("t_log_2")
        );

        let (low, high) = (Value::Integer(0), Value::Integer(5));
        let range = RangeShardingValue {
            table: "t_log",
            column: "id",
            lower: Bound::Included(&low),
            upper: Bound::Excluded(&high),
        };
        assert_eq!(
            algorithm.range(&available(4), &range).unwrap(),
            vec!["t_log_0", "t_log_1"]
        );

        let unbounded = RangeShardingValue {
            upper: Bound::Unbounded,
            ..range
        };
        assert_eq!(algorithm.range(&available(4), &unbounded).unwrap().len(), 4);
    }

    #[test]
    fn test_volume_range() {
        let props: Properties = [
            ("range-lower", 10),
            ("range-upper", 40),
            ("sharding-volume", 10),
        ]
        .into_iter()
        .collect();
        let algorithm = RangePartitions::volume("volume", &props).unwrap();
        assert_eq!(algorithm.boundaries, vec![10, 20, 30, 40]);
        assert_eq!(algorithm.partition(5), 0);
        assert_eq!(algorithm.partition(25), 2);
        assert_eq!(algorithm.partition(40), 4);
    }

    #[test]
    fn test_unordered_boundaries() {
        let props: Properties = [("sharding-ranges", "5,1")].into_iter().collect();
        assert!(RangePartitions::boundary("boundary", &props).is_err());
    }
}
