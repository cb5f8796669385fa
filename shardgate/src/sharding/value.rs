//! Values handed to sharding algorithms.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::statement::Value;

/// Single value, from `=` or one item of `IN`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreciseShardingValue<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub value: &'a Value,
}

/// Range, from `BETWEEN` or merged range predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeShardingValue<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub lower: Bound<&'a Value>,
    pub upper: Bound<&'a Value>,
}

impl RangeShardingValue<'_> {
    /// Integer bounds, both inclusive. `None` means unbounded.
    pub fn integer_bounds(&self) -> (Option<i64>, Option<i64>) {
        let lower = match self.lower {
            Bound::Included(v) => v.integer(),
            Bound::Excluded(v) => v.integer().map(|v| v.saturating_add(1)),
            Bound::Unbounded => None,
        };
        let upper = match self.upper {
            Bound::Included(v) => v.integer(),
            Bound::Excluded(v) => v.integer().map(|v| v.saturating_sub(1)),
            Bound::Unbounded => None,
        };
        (lower, upper)
    }
}

/// Every sharding column of a table with a complex strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexKeysShardingValue<'a> {
    pub table: &'a str,
    /// Precise values per column.
    pub values: BTreeMap<&'a str, Vec<&'a Value>>,
    /// Ranges per column.
    pub ranges: BTreeMap<&'a str, (Bound<&'a Value>, Bound<&'a Value>)>,
}

/// Values supplied by a hint.
#[derive(Debug, Clone, PartialEq)]
pub struct HintShardingValue<'a> {
    pub table: &'a str,
    pub values: &'a [Value],
}
