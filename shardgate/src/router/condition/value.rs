//! Condition values.

use std::ops::Bound;

use crate::statement::{Expression, Value};

/// Operand of a predicate: a literal, or a parameter marker.
///
/// Parameters are resolved against the bound parameters when created.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionValue {
    value: Value,
    parameter_index: Option<usize>,
}

impl ConditionValue {
    /// `None` if the expression isn't a literal or a parameter marker, or
    /// the parameter isn't bound.
    pub fn new(expression: &Expression, parameters: &[Value]) -> Option<Self> {
        match expression {
            Expression::Literal { value, .. } => Some(Self {
                value: value.clone(),
                parameter_index: None,
            }),
            Expression::Parameter { index, .. } => Some(Self {
                value: parameters.get(*index)?.clone(),
                parameter_index: Some(*index),
            }),
            _ => None,
        }
    }

    /// Value, unless it's `NULL`.
    pub fn value(&self) -> Option<&Value> {
        if self.value.is_null() {
            None
        } else {
            Some(&self.value)
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }
}

/// Values of one sharding column.
#[derive(Debug, Clone, PartialEq)]
pub enum ShardingValues {
    Precise(Value),
    Range {
        lower: Bound<Value>,
        upper: Bound<Value>,
    },
    List(Vec<Value>),
}

impl ShardingValues {
    /// Values satisfying both. `None` if nothing does.
    pub fn intersect(&self, other: &ShardingValues) -> Option<ShardingValues> {
        use ShardingValues::*;

        match (self, other) {
            (Precise(a), Precise(b)) => (a == b).then(|| Precise(a.clone())),

            (Precise(v), List(list)) | (List(list), Precise(v)) => {
                list.contains(v).then(|| Precise(v.clone()))
            }

            (List(a), List(b)) => {
                let list: Vec<Value> = a.iter().filter(|v| b.contains(v)).cloned().collect();
                match list.len() {
                    0 => None,
                    1 => list.into_iter().next().map(Precise),
                    _ => Some(List(list)),
                }
            }

            (Precise(v), range @ Range { .. }) | (range @ Range { .. }, Precise(v)) => {
                range.contains(v).then(|| Precise(v.clone()))
            }

            (List(list), range @ Range { .. }) | (range @ Range { .. }, List(list)) => {
                let list: Vec<Value> = list.iter().filter(|v| range.contains(v)).cloned().collect();
                match list.len() {
                    0 => None,
                    1 => list.into_iter().next().map(Precise),
                    _ => Some(List(list)),
                }
            }

            (
                Range {
                    lower: lower_a,
                    upper: upper_a,
                },
                Range {
                    lower: lower_b,
                    upper: upper_b,
                },
            ) => {
                let lower = tighter(lower_a, lower_b, |a, b| a > b);
                let upper = tighter(upper_a, upper_b, |a, b| a < b);
                let empty = match (&lower, &upper) {
                    (Bound::Included(l), Bound::Included(u)) => l > u,
                    (Bound::Included(l), Bound::Excluded(u))
                    | (Bound::Excluded(l), Bound::Included(u))
                    | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
                    _ => false,
                };
                (!empty).then_some(Range { lower, upper })
            }
        }
    }

    /// Range contains the value. Always true for other kinds.
    fn contains(&self, value: &Value) -> bool {
        match self {
            Self::Range { lower, upper } => {
                let above = match lower {
                    Bound::Included(l) => value >= l,
                    Bound::Excluded(l) => value > l,
                    Bound::Unbounded => true,
                };
                let below = match upper {
                    Bound::Included(u) => value <= u,
                    Bound::Excluded(u) => value < u,
                    Bound::Unbounded => true,
                };
                above && below
            }
            _ => true,
        }
    }
}

// Pick the more restrictive of two bounds on the same side.
fn tighter(a: &Bound<Value>, b: &Bound<Value>, stricter: impl Fn(&Value, &Value) -> bool) -> Bound<Value> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other.clone(),
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            if stricter(x, y) {
                a.clone()
            } else if stricter(y, x) {
                b.clone()
            } else if matches!(a, Bound::Excluded(_)) {
                a.clone()
            } else {
                b.clone()
            }
        }
    }
}

/// Resolved values of one sharding column in one predicate group.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardingConditionValue {
    pub table: String,
    pub column: String,
    /// Operator the values came from, e.g. `=`, `IN` or `BETWEEN`.
    pub operator: String,
    pub values: ShardingValues,
    /// Parameter markers the values were read from.
    pub parameter_indexes: Vec<usize>,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::statement::Span;

    #[test]
    fn test_condition_value_round_trip() {
        let params = vec![Value::from(10), Value::Null];

        let literal = Expression::Literal {
            value: Value::from("abc"),
            span: Span::new(0, 4),
        };
        let value = ConditionValue::new(&literal, &params).unwrap();
        assert_eq!(value.value(), Some(&Value::from("abc")));
        assert_eq!(value.parameter_index(), None);

        let param = Expression::Parameter {
            index: 0,
            span: Span::new(0, 0),
        };
        let value = ConditionValue::new(&param, &params).unwrap();
        assert_eq!(value.value(), Some(&Value::from(10)));
        assert_eq!(value.parameter_index(), Some(0));

        let null = Expression::Parameter {
            index: 1,
            span: Span::new(0, 0),
        };
        let value = ConditionValue::new(&null, &params).unwrap();
        assert!(value.is_null());
        assert_eq!(value.value(), None);

        let opaque = Expression::Opaque {
            text: "now()".into(),
            span: Span::new(0, 4),
        };
        assert!(ConditionValue::new(&opaque, &params).is_none());
    }

    #[test]
    fn test_intersect() {
        use ShardingValues::*;

        let list = List(vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(
            list.intersect(&Precise(Value::from(2))),
            Some(Precise(Value::from(2)))
        );
        assert_eq!(list.intersect(&Precise(Value::from(9))), None);

        let range = Range {
            lower: Bound::Included(Value::from(2)),
            upper: Bound::Included(Value::from(10)),
        };
        assert_eq!(
            list.intersect(&range),
            Some(List(vec![Value::from(2), Value::from(3)]))
        );

        let other = Range {
            lower: Bound::Excluded(Value::from(5)),
            upper: Bound::Unbounded,
        };
        assert_eq!(
            range.intersect(&other),
            Some(Range {
                lower: Bound::Excluded(Value::from(5)),
                upper: Bound::Included(Value::from(10)),
            })
        );

        let disjoint = Range {
            lower: Bound::Included(Value::from(11)),
            upper: Bound::Unbounded,
        };
        assert_eq!(range.intersect(&disjoint), None);
    }
}
