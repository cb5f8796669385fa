use std::hash::Hasher;

use fnv::FnvHasher;
use shardgate_config::Properties;

use super::modulo::sharding_count;
use super::{target_with_suffix, Error, PreciseShardingValue, RangeShardingValue};
use super::StandardShardingAlgorithm;

/// FNV-1a hash of the value text, modulo `sharding-count`.
#[derive(Debug, Clone)]
pub struct HashModulo {
    count: i64,
}

impl HashModulo {
    pub fn new(name: &str, props: &Properties) -> Result<Self, Error> {
        Ok(Self {
            count: sharding_count(name, props)?,
        })
    }

    fn hash(value: &str) -> u64 {
        let mut hasher = FnvHasher::default();
        hasher.write(value.as_bytes());
        hasher.finish()
    }
}

impl StandardShardingAlgorithm for HashModulo {
    fn precise(&self, available: &[String], value: &PreciseShardingValue) -> Option<String> {
        if value.value.is_null() {
            return None;
        }
        let shard = Self::hash(&value.value.text()) % self.count as u64;
        target_with_suffix(available, shard as i64)
    }

    fn range(&self, available: &[String], _value: &RangeShardingValue) -> Result<Vec<String>, Error> {
        Ok(available.to_vec())
    }
}
