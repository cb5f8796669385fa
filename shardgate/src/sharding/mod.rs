//! Sharding algorithms, strategies and the compiled sharding rule.

pub mod algorithm;
pub mod error;
pub mod inline_expr;
pub mod keygen;
pub mod rule;
pub mod strategy;
pub mod value;

pub use algorithm::*;
pub use error::Error;
pub use keygen::KeyGenerator;
pub use rule::{DataNode, KeyGenerateRule, ShardingRule, TableRule};
pub use strategy::ShardingStrategy;
pub use value::*;
