//! Sharding strategies: which columns feed which algorithm.

use std::collections::HashMap;

use indexmap::IndexSet;
use shardgate_config::ShardingStrategy as StrategyConfig;
use tracing::trace;

use super::{
    Capability, ComplexKeysShardingValue, Error, HintShardingValue, PreciseShardingValue,
    RangeShardingValue, ShardingAlgorithm,
};
use crate::router::condition::{ShardingConditionValue, ShardingValues};
use crate::statement::Value;

#[derive(Debug, Clone)]
pub struct ShardingStrategy {
    /// Algorithm name, for logging.
    name: String,
    columns: Vec<String>,
    algorithm: ShardingAlgorithm,
}

impl ShardingStrategy {
    /// Compile a configured strategy. `None` strategies route everywhere.
    pub fn new(
        config: &StrategyConfig,
        algorithms: &HashMap<String, ShardingAlgorithm>,
    ) -> Result<Option<Self>, Error> {
        let expected = match config {
            StrategyConfig::Standard { .. } => Capability::Standard,
            StrategyConfig::Complex { .. } => Capability::Complex,
            StrategyConfig::Hint { .. } => Capability::Hint,
            StrategyConfig::None => return Ok(None),
        };

        let name = config.algorithm().unwrap_or_default().to_string();
        let algorithm = algorithms
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::UnknownAlgorithm(name.clone()))?;

        if algorithm.capability() != expected {
            return Err(Error::CapabilityMismatch {
                algorithm: name,
                expected: expected.to_string(),
            });
        }

        Ok(Some(Self {
            name,
            columns: config.columns().iter().map(|c| c.to_string()).collect(),
            algorithm,
        }))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_hint(&self) -> bool {
        matches!(self.algorithm, ShardingAlgorithm::Hint(_))
    }

    /// Pick targets for the given condition values.
    ///
    /// Without any value for the strategy's columns, every target is returned.
    /// Results keep the order in which targets were first selected.
    pub fn shard(
        &self,
        table: &str,
        available: &[String],
        values: &[&ShardingConditionValue],
        hint: Option<&[Value]>,
    ) -> Result<Vec<String>, Error> {
        let values: Vec<&ShardingConditionValue> = values
            .iter()
            .copied()
            .filter(|v| {
                self.columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&v.column))
            })
            .collect();

        trace!(
            "sharding \"{}\" with \"{}\" [{} values]",
            table,
            self.name,
            values.len()
        );

        let targets: IndexSet<String> = match self.algorithm {
            ShardingAlgorithm::Standard(ref algorithm) => {
                let Some(value) = values.first() else {
                    return Ok(available.to_vec());
                };

                let mut targets = IndexSet::new();
                match value.values {
                    ShardingValues::Precise(ref v) => {
                        targets.extend(algorithm.precise(available, &precise(value, v)));
                    }
                    ShardingValues::List(ref list) => {
                        for v in list {
                            targets.extend(algorithm.precise(available, &precise(value, v)));
                        }
                    }
                    ShardingValues::Range {
                        ref lower,
                        ref upper,
                    } => {
                        let range = RangeShardingValue {
                            table: &value.table,
                            column: &value.column,
                            lower: lower.as_ref(),
                            upper: upper.as_ref(),
                        };
                        targets.extend(algorithm.range(available, &range)?);
                    }
                }
                targets
            }

            ShardingAlgorithm::Complex(ref algorithm) => {
                if values.is_empty() {
                    return Ok(available.to_vec());
                }

                let mut complex = ComplexKeysShardingValue {
                    table,
                    ..Default::default()
                };
                for value in &values {
                    match value.values {
                        ShardingValues::Precise(ref v) => {
                            complex.values.entry(value.column.as_str()).or_default().push(v)
                        }
                        ShardingValues::List(ref list) => complex
                            .values
                            .entry(value.column.as_str())
                            .or_default()
                            .extend(list.iter()),
                        ShardingValues::Range {
                            ref lower,
                            ref upper,
                        } => {
                            complex
                                .ranges
                                .insert(value.column.as_str(), (lower.as_ref(), upper.as_ref()));
                        }
                    }
                }
                algorithm.shard(available, &complex).into_iter().collect()
            }

            ShardingAlgorithm::Hint(ref algorithm) => match hint {
                Some(values) if !values.is_empty() => algorithm
                    .shard(available, &HintShardingValue { table, values })
                    .into_iter()
                    .collect(),
                _ => return Ok(available.to_vec()),
            },
        };

        Ok(targets
            .into_iter()
            .filter(|t| available.contains(t))
            .collect())
    }
}

fn precise<'a>(value: &'a ShardingConditionValue, v: &'a Value) -> PreciseShardingValue<'a> {
    PreciseShardingValue {
        table: &value.table,
        column: &value.column,
        value: v,
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use std::ops::Bound;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use shardgate_config::Properties;

    use super::*;
    use crate::sharding::{ComplexKeysShardingAlgorithm, HintInline, Modulo};

    #[derive(Debug, Default, PartialEq)]
    struct Received {
        table: String,
        values: BTreeMap<String, Vec<Value>>,
        ranges: BTreeMap<String, (Bound<Value>, Bound<Value>)>,
    }

    /// Keeps what it was called with, returns fixed targets.
    #[derive(Debug, Default)]
    struct Recording {
        received: Arc<Mutex<Option<Received>>>,
    }

    impl ComplexKeysShardingAlgorithm for Recording {
        fn shard(&self, _available: &[String], value: &ComplexKeysShardingValue) -> Vec<String> {
            *self.received.lock() = Some(Received {
                table: value.table.to_string(),
                values: value
                    .values
                    .iter()
                    .map(|(c, v)| (c.to_string(), v.iter().map(|v| (*v).clone()).collect()))
                    .collect(),
                ranges: value
                    .ranges
                    .iter()
                    .map(|(c, (l, u))| (c.to_string(), (l.cloned(), u.cloned())))
                    .collect(),
            });
            vec!["t_order_9".into(), "t_order_1".into()]
        }
    }

    fn available() -> Vec<String> {
        (0..4).map(|i| format!("t_order_{}", i)).collect()
    }

    fn value(column: &str, values: ShardingValues) -> ShardingConditionValue {
        ShardingConditionValue {
            table: "t_order".into(),
            column: column.into(),
            operator: "=".into(),
            values,
            parameter_indexes: vec![],
        }
    }

    fn strategy(config: StrategyConfig, name: &str, algorithm: ShardingAlgorithm) -> ShardingStrategy {
        let algorithms = HashMap::from([(name.to_string(), algorithm)]);
        ShardingStrategy::new(&config, &algorithms).unwrap().unwrap()
    }

    #[test]
    fn test_complex_values() {
        let recording = Recording::default();
        let received = recording.received.clone();
        let strategy = strategy(
            StrategyConfig::Complex {
                columns: vec!["order_id".into(), "user_id".into(), "created_at".into()],
                algorithm: "t_complex".into(),
            },
            "t_complex",
            ShardingAlgorithm::complex(recording),
        );

        let values = [
            value("order_id", ShardingValues::Precise(Value::Integer(1))),
            value(
                "user_id",
                ShardingValues::List(vec![Value::Integer(7), Value::Integer(3)]),
            ),
            value(
                "created_at",
                ShardingValues::Range {
                    lower: Bound::Included(Value::Integer(10)),
                    upper: Bound::Unbounded,
                },
            ),
            value("status", ShardingValues::Precise(Value::from("x"))),
        ];
        let values: Vec<&ShardingConditionValue> = values.iter().collect();

        let targets = strategy.shard("t_order", &available(), &values, None).unwrap();

        // Targets that don't exist are dropped.
        assert_eq!(targets, vec!["t_order_1"]);

        let received = received.lock().take().unwrap();
        assert_eq!(received.table, "t_order");
        assert_eq!(
            received.values,
            BTreeMap::from([
                ("order_id".to_string(), vec![Value::Integer(1)]),
                (
                    "user_id".to_string(),
                    vec![Value::Integer(7), Value::Integer(3)]
                ),
            ])
        );
        assert_eq!(
            received.ranges,
            BTreeMap::from([(
                "created_at".to_string(),
                (Bound::Included(Value::Integer(10)), Bound::Unbounded)
            )])
        );
    }

    #[test]
    fn test_complex_without_values() {
        let recording = Recording::default();
        let received = recording.received.clone();
        let strategy = strategy(
            StrategyConfig::Complex {
                columns: vec!["order_id".into(), "user_id".into()],
                algorithm: "t_complex".into(),
            },
            "t_complex",
            ShardingAlgorithm::complex(recording),
        );

        let other = value("status", ShardingValues::Precise(Value::from("x")));
        let targets = strategy
            .shard("t_order", &available(), &[&other], None)
            .unwrap();

        assert_eq!(targets, available());
        assert!(received.lock().is_none());
    }

    #[test]
    fn test_hint() {
        let props: Properties = [("algorithm-expression", "t_order_${value % 4}")]
            .into_iter()
            .collect();
        let strategy = strategy(
            StrategyConfig::Hint {
                algorithm: "t_hint".into(),
            },
            "t_hint",
            ShardingAlgorithm::hint(HintInline::new("t_hint", &props).unwrap()),
        );
        assert!(strategy.is_hint());

        let hints = [Value::Integer(6), Value::Integer(2), Value::Integer(5)];
        assert_eq!(
            strategy
                .shard("t_order", &available(), &[], Some(&hints[..]))
                .unwrap(),
            vec!["t_order_2", "t_order_1"]
        );

        // Nothing hinted: every target.
        assert_eq!(
            strategy.shard("t_order", &available(), &[], Some(&[][..])).unwrap(),
            available()
        );
        assert_eq!(
            strategy.shard("t_order", &available(), &[], None).unwrap(),
            available()
        );
    }

    #[test]
    fn test_capability_mismatch() {
        let props: Properties = [("sharding-count", 4)].into_iter().collect();
        let algorithms = HashMap::from([(
            "t_mod".to_string(),
            ShardingAlgorithm::standard(Modulo::new("t_mod", &props).unwrap()),
        )]);

        let hint = StrategyConfig::Hint {
            algorithm: "t_mod".into(),
        };
        assert!(matches!(
            ShardingStrategy::new(&hint, &algorithms),
            Err(Error::CapabilityMismatch { .. })
        ));

        let unknown = StrategyConfig::Standard {
            column: "order_id".into(),
            algorithm: "t_missing".into(),
        };
        assert!(matches!(
            ShardingStrategy::new(&unknown, &algorithms),
            Err(Error::UnknownAlgorithm(_))
        ));
        assert!(ShardingStrategy::new(&StrategyConfig::None, &algorithms)
            .unwrap()
            .is_none());
    }
}
