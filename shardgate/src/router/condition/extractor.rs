//! Predicate to sharding value extraction.
//!
//! Supports `column = value`, `column IN (...)` and `column BETWEEN a AND b`.
//! Anything else, or operands that aren't literals or parameter markers,
//! produces nothing and the predicate doesn't narrow the route.

use std::ops::Bound;

use super::{ConditionValue, ShardingValues};
use crate::statement::{ColumnSegment, Expression, Operator, Value};

/// Values of one predicate on one column, before the owning table is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue<'a> {
    pub column: &'a ColumnSegment,
    pub operator: &'static str,
    pub values: ShardingValues,
    pub parameter_indexes: Vec<usize>,
}

/// Extract sharding values from a predicate.
pub fn extract<'a>(predicate: &'a Expression, parameters: &[Value]) -> Option<ExtractedValue<'a>> {
    match predicate {
        Expression::Binary {
            left,
            operator,
            right,
            ..
        } => compare(left, operator, right, parameters),

        Expression::In {
            left,
            right,
            not: false,
            ..
        } => in_list(left, right, parameters),

        Expression::Between {
            left,
            low,
            high,
            not: false,
            ..
        } => between(left, low, high, parameters),

        _ => None,
    }
}

fn compare<'a>(
    left: &'a Expression,
    operator: &Operator,
    right: &'a Expression,
    parameters: &[Value],
) -> Option<ExtractedValue<'a>> {
    if *operator != Operator::Eq {
        return None;
    }

    let (column, operand) = match (left.column(), right.column()) {
        (Some(column), None) => (column, right),
        (None, Some(column)) => (column, left),
        _ => return None,
    };

    let value = ConditionValue::new(operand, parameters)?;
    let resolved = value.value()?.clone();

    Some(ExtractedValue {
        column,
        operator: "=",
        values: ShardingValues::Precise(resolved),
        parameter_indexes: value.parameter_index().into_iter().collect(),
    })
}

fn in_list<'a>(
    left: &'a Expression,
    right: &'a Expression,
    parameters: &[Value],
) -> Option<ExtractedValue<'a>> {
    let column = left.column()?;
    let Expression::List { items, .. } = right else {
        return None;
    };

    let mut values = vec![];
    let mut parameter_indexes = vec![];
    for item in items {
        // A partially resolved list can't bound the route.
        let value = ConditionValue::new(item, parameters)?;
        parameter_indexes.extend(value.parameter_index());
        if let Some(v) = value.value() {
            if !values.contains(v) {
                values.push(v.clone());
            }
        }
    }

    if values.is_empty() {
        return None;
    }

    Some(ExtractedValue {
        column,
        operator: "IN",
        values: ShardingValues::List(values),
        parameter_indexes,
    })
}

fn between<'a>(
    left: &'a Expression,
    low: &'a Expression,
    high: &'a Expression,
    parameters: &[Value],
) -> Option<ExtractedValue<'a>> {
    let column = left.column()?;
    let low = ConditionValue::new(low, parameters)?;
    let high = ConditionValue::new(high, parameters)?;

    Some(ExtractedValue {
        column,
        operator: "BETWEEN",
        values: ShardingValues::Range {
            lower: Bound::Included(low.value()?.clone()),
            upper: Bound::Included(high.value()?.clone()),
        },
        parameter_indexes: low
            .parameter_index()
            .into_iter()
            .chain(high.parameter_index())
            .collect(),
    })
}
