//! Sharding algorithms.
//!
//! An algorithm maps sharding values to a subset of the available targets
//! (data source or table names). Built-in algorithms are created by the
//! [`Registry`] from their configured type and properties.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use super::{
    ComplexKeysShardingValue, Error, HintShardingValue, PreciseShardingValue, RangeShardingValue,
};

pub mod class_based;
pub mod hash_mod;
pub mod inline;
pub mod modulo;
pub mod range;
pub mod registry;

pub use class_based::ClassFactory;
pub use hash_mod::HashModulo;
pub use inline::{HintInline, Inline};
pub use modulo::Modulo;
pub use range::RangePartitions;
pub use registry::Registry;

/// Single sharding column.
pub trait StandardShardingAlgorithm: Debug + Send + Sync {
    /// Target for one value. `None` if no target matches.
    fn precise(&self, available: &[String], value: &PreciseShardingValue) -> Option<String>;

    /// Every target whose values intersect the range. Returning extra targets is fine,
    /// dropping one is not.
    fn range(&self, available: &[String], value: &RangeShardingValue) -> Result<Vec<String>, Error>;
}

/// Multiple sharding columns.
pub trait ComplexKeysShardingAlgorithm: Debug + Send + Sync {
    fn shard(&self, available: &[String], value: &ComplexKeysShardingValue) -> Vec<String>;
}

/// Values supplied outside the query.
pub trait HintShardingAlgorithm: Debug + Send + Sync {
    fn shard(&self, available: &[String], value: &HintShardingValue) -> Vec<String>;
}

/// What a sharding strategy requires from its algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Standard,
    Complex,
    Hint,
}

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Complex => write!(f, "complex"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "complex" => Ok(Self::Complex),
            "hint" => Ok(Self::Hint),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

/// Algorithm instance.
#[derive(Debug, Clone)]
pub enum ShardingAlgorithm {
    Standard(Arc<dyn StandardShardingAlgorithm>),
    Complex(Arc<dyn ComplexKeysShardingAlgorithm>),
    Hint(Arc<dyn HintShardingAlgorithm>),
}

impl ShardingAlgorithm {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Standard(_) => Capability::Standard,
            Self::Complex(_) => Capability::Complex,
            Self::Hint(_) => Capability::Hint,
        }
    }

    pub fn standard(algorithm: impl StandardShardingAlgorithm + 'static) -> Self {
        Self::Standard(Arc::new(algorithm))
    }

    pub fn complex(algorithm: impl ComplexKeysShardingAlgorithm + 'static) -> Self {
        Self::Complex(Arc::new(algorithm))
    }

    pub fn hint(algorithm: impl HintShardingAlgorithm + 'static) -> Self {
        Self::Hint(Arc::new(algorithm))
    }
}

/// Numeric suffix of a target name, e.g. `3` for `t_order_3`.
pub fn suffix(target: &str) -> Option<i64> {
    let digits = target
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    target[target.len() - digits..].parse().ok()
}

/// Target whose numeric suffix is `n`.
pub fn target_with_suffix(available: &[String], n: i64) -> Option<String> {
    available.iter().find(|t| suffix(t) == Some(n)).cloned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_suffix() {
        let available = vec!["t_order_1".to_string(), "t_order_11".to_string()];
        assert_eq!(suffix("t_order_11"), Some(11));
        assert_eq!(suffix("t_order"), None);
        assert_eq!(
            target_with_suffix(&available, 1).as_deref(),
            Some("t_order_1")
        );
        assert_eq!(target_with_suffix(&available, 2), None);
    }
}
