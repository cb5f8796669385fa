use indexmap::IndexSet;
use shardgate_config::Properties;

use super::{target_with_suffix, Error, PreciseShardingValue, RangeShardingValue};
use super::StandardShardingAlgorithm;

/// `value % sharding-count`, matched against the target's numeric suffix.
#[derive(Debug, Clone)]
pub struct Modulo {
    count: i64,
}

impl Modulo {
    pub fn new(name: &str, props: &Properties) -> Result<Self, Error> {
        Ok(Self {
            count: sharding_count(name, props)?,
        })
    }

    fn target(&self, available: &[String], value: i64) -> Option<String> {
        target_with_suffix(available, value.rem_euclid(self.count))
    }
}

impl StandardShardingAlgorithm for Modulo {
    fn precise(&self, available: &[String], value: &PreciseShardingValue) -> Option<String> {
        self.target(available, value.value.integer()?)
    }

    fn range(&self, available: &[String], value: &RangeShardingValue) -> Result<Vec<String>, Error> {
        if let (Some(lower), Some(upper)) = value.integer_bounds() {
            if upper < lower {
                return Ok(vec![]);
            }

            // Narrow ranges only touch some targets.
            if upper.checked_sub(lower).is_some_and(|d| d < self.count - 1) {
                let mut targets = IndexSet::new();
                for v in lower..=upper {
                    if let Some(target) = self.target(available, v) {
                        targets.insert(target);
                    }
                }
                return Ok(targets.into_iter().collect());
            }
        }

        Ok(available.to_vec())
    }
}

/// Positive `sharding-count` property.
pub(super) fn sharding_count(name: &str, props: &Properties) -> Result<i64, Error> {
    let count = props
        .integer("sharding-count")
        .ok_or_else(|| Error::MissingProperty {
            algorithm: name.to_string(),
            property: "sharding-count".into(),
        })?;

    if count <= 0 {
        return Err(Error::InvalidProperty {
            algorithm: name.to_string(),
            property: "sharding-count".into(),
            reason: format!("must be positive, got {}", count),
        });
    }

    Ok(count)
}
