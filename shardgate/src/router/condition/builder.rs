//! Grouping extracted values into sharding conditions.

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{extract, ShardingConditionValue, ShardingValues};
use crate::router::Error;
use crate::sharding::ShardingRule;
use crate::statement::{
    and_groups, Expression, InsertStatement, Statement, TablesContext, UpdateStatement, Value,
};

/// Sharding values of one predicate group, or of one `INSERT` row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShardingCondition {
    pub values: Vec<ShardingConditionValue>,
    /// The predicates contradict each other, e.g. `id = 1 AND id = 2`.
    pub always_false: bool,
}

impl ShardingCondition {
    /// Values for a table.
    pub fn table_values(&self, table: &str) -> Vec<&ShardingConditionValue> {
        self.values
            .iter()
            .filter(|v| v.table.eq_ignore_ascii_case(table))
            .collect()
    }
}

/// Conditions of a statement. Alternatives: a target matching any condition is routed to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShardingConditions {
    pub conditions: Vec<ShardingCondition>,
}

impl ShardingConditions {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Every condition is always false.
    pub fn always_false(&self) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.always_false)
    }

    /// Conditions that can match rows.
    pub fn satisfiable(&self) -> impl Iterator<Item = &ShardingCondition> {
        self.conditions.iter().filter(|c| !c.always_false)
    }

    /// Conditions from `WHERE` clauses, join conditions and subqueries.
    pub fn from_where(
        statement: &Statement,
        rule: &ShardingRule,
        parameters: &[Value],
    ) -> ShardingConditions {
        let collector = statement.collect();
        let tables = TablesContext::new(collector.tables.iter().copied());
        let mut conditions = vec![];

        for predicate in &collector.predicates {
            match from_predicate(predicate, &tables, rule, parameters) {
                Some(tree) => conditions.extend(tree),
                // Join conditions link tables, they don't filter them.
                None if collector.is_join_condition(predicate) => (),
                None => conditions.push(ShardingCondition::default()),
            }
        }

        trace!("{} sharding conditions", conditions.len());

        ShardingConditions { conditions }
    }

    /// One condition per `VALUES` row.
    pub fn from_insert(
        insert: &InsertStatement,
        rule: &ShardingRule,
        parameters: &[Value],
        generated: Option<&GeneratedKeys>,
    ) -> ShardingConditions {
        let table = &insert.table.name;
        let columns = insert
            .columns
            .as_ref()
            .map(|c| c.columns.as_slice())
            .unwrap_or_default();

        let mut conditions = vec![];
        for (row, values) in insert.values.iter().enumerate() {
            let mut condition = ShardingCondition::default();

            for (column, expression) in columns.iter().zip(values.values.iter()) {
                if !rule.is_sharding_column(table, &column.name) {
                    continue;
                }
                let Some(value) = super::ConditionValue::new(expression, parameters) else {
                    continue;
                };
                let Some(resolved) = value.value() else {
                    continue;
                };
                condition.values.push(ShardingConditionValue {
                    table: table.clone(),
                    column: column.name.clone(),
                    operator: "=".into(),
                    values: ShardingValues::Precise(resolved.clone()),
                    parameter_indexes: value.parameter_index().into_iter().collect(),
                });
            }

            if let Some(generated) = generated {
                if rule.is_sharding_column(table, &generated.column) {
                    if let Some(key) = generated.values.get(row) {
                        condition.values.push(ShardingConditionValue {
                            table: table.clone(),
                            column: generated.column.clone(),
                            operator: "=".into(),
                            values: ShardingValues::Precise(key.clone()),
                            parameter_indexes: vec![],
                        });
                    }
                }
            }

            conditions.push(condition);
        }

        ShardingConditions { conditions }
    }
}

/// Conditions of one predicate tree.
///
/// `None` if any `OR` branch has no sharding values: the whole tree is
/// unconstrained and every target can hold matching rows.
fn from_predicate(
    predicate: &Expression,
    tables: &TablesContext,
    rule: &ShardingRule,
    parameters: &[Value],
) -> Option<Vec<ShardingCondition>> {
    let mut result = vec![];

    for group in and_groups(predicate) {
        let mut merged: IndexMap<(String, String), ShardingConditionValue> = IndexMap::new();
        let mut always_false = false;

        for predicate in group {
            let Some(extracted) = extract(predicate, parameters) else {
                continue;
            };
            let Some(table) = tables.resolve(extracted.column, |t, c| rule.is_sharding_column(t, c))
            else {
                continue;
            };
            if !rule.is_sharding_column(table, &extracted.column.name) {
                continue;
            }

            let key = (table.to_lowercase(), extracted.column.name.to_lowercase());
            match merged.get_mut(&key) {
                Some(existing) => match existing.values.intersect(&extracted.values) {
                    Some(values) => {
                        existing.values = values;
                        existing.operator = "AND".into();
                        existing.parameter_indexes.extend(extracted.parameter_indexes);
                    }
                    None => always_false = true,
                },
                None => {
                    merged.insert(
                        key,
                        ShardingConditionValue {
                            table: table.to_string(),
                            column: extracted.column.name.clone(),
                            operator: extracted.operator.into(),
                            values: extracted.values,
                            parameter_indexes: extracted.parameter_indexes,
                        },
                    );
                }
            }
        }

        if merged.is_empty() && !always_false {
            debug!("predicate group has no sharding values, route is unconstrained");
            return None;
        }

        result.push(ShardingCondition {
            values: if always_false {
                vec![]
            } else {
                merged.into_values().collect()
            },
            always_false,
        });
    }

    Some(result)
}

/// Keys generated for an `INSERT`, one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedKeys {
    pub column: String,
    pub values: Vec<Value>,
}

impl GeneratedKeys {
    /// Generate keys if the table has a key generator and the insert omits its column.
    pub fn generate(insert: &InsertStatement, rule: &ShardingRule) -> Option<GeneratedKeys> {
        let key = rule.table_rule(&insert.table.name)?.key_generate.as_ref()?;
        insert.columns.as_ref()?;
        if insert.column_index(&key.column).is_some() || insert.values.is_empty() {
            return None;
        }

        Some(GeneratedKeys {
            column: key.column.clone(),
            values: insert
                .values
                .iter()
                .map(|_| key.generator.generate())
                .collect(),
        })
    }
}

/// Reject updates that change a sharding column to a value other than the one
/// the statement is already routed by.
pub fn check_update(
    update: &UpdateStatement,
    conditions: &ShardingConditions,
    rule: &ShardingRule,
    parameters: &[Value],
) -> Result<(), Error> {
    let table = &update.table.name;

    for assignment in &update.assignments {
        let column = &assignment.column.name;
        if !rule.is_sharding_column(table, column) {
            continue;
        }

        let assigned = super::ConditionValue::new(&assignment.value, parameters);
        let unchanged = match assigned.as_ref().and_then(|v| v.value()) {
            Some(value) => {
                !conditions.is_empty()
                    && conditions.satisfiable().all(|condition| {
                        condition.table_values(table).iter().any(|v| {
                            v.column.eq_ignore_ascii_case(column)
                                && v.values == ShardingValues::Precise(value.clone())
                        })
                    })
            }
            None => false,
        };

        if !unchanged {
            return Err(Error::ShardingKeyUpdate {
                table: table.clone(),
                column: column.clone(),
            });
        }
    }

    Ok(())
}
