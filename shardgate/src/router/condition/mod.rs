//! Sharding conditions.

pub mod builder;
pub mod extractor;
pub mod value;

pub use builder::{GeneratedKeys, ShardingCondition, ShardingConditions};
pub use extractor::{extract, ExtractedValue};
pub use value::{ConditionValue, ShardingConditionValue, ShardingValues};
