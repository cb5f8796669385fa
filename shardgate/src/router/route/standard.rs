//! Routing one sharding table, or a group of binding tables.

use indexmap::IndexSet;
use tracing::debug;

use super::{RouteMapper, RouteUnit};
use crate::router::condition::ShardingConditions;
use crate::router::hint::HintValues;
use crate::router::Error;
use crate::sharding::{DataNode, ShardingRule, TableRule};

/// Data nodes of one table matching the conditions.
///
/// Tables without values in a condition match every node.
pub fn route_table(
    table_rule: &TableRule,
    conditions: &ShardingConditions,
    hints: &HintValues,
) -> Result<Vec<DataNode>, Error> {
    let table = table_rule.logic_table.as_str();
    let mut nodes = IndexSet::new();

    let satisfiable: Vec<_> = conditions.satisfiable().collect();
    if satisfiable.is_empty() {
        nodes.extend(route_condition(table_rule, &[], hints)?);
    } else {
        for condition in satisfiable {
            nodes.extend(route_condition(table_rule, &condition.table_values(table), hints)?);
        }
    }

    if nodes.is_empty() {
        return Err(Error::NoTargets(table.to_string()));
    }

    Ok(nodes.into_iter().collect())
}

/// Data nodes for one condition.
pub fn route_condition(
    table_rule: &TableRule,
    values: &[&crate::router::condition::ShardingConditionValue],
    hints: &HintValues,
) -> Result<Vec<DataNode>, Error> {
    let table = table_rule.logic_table.as_str();

    let data_sources = match table_rule.database_strategy {
        Some(ref strategy) => strategy.shard(
            table,
            &table_rule.data_sources(),
            values,
            hints.database_values(table),
        )?,
        None => table_rule.data_sources(),
    };

    let mut nodes = vec![];
    for data_source in data_sources {
        let available = table_rule.actual_tables(&data_source);
        let tables = match table_rule.table_strategy {
            Some(ref strategy) => {
                strategy.shard(table, &available, values, hints.table_values(table))?
            }
            None => available,
        };
        nodes.extend(tables.into_iter().map(|t| DataNode::new(&data_source, t)));
    }

    Ok(nodes)
}

/// Route a table and the tables bound to it.
///
/// The first table is routed by its conditions. The Nth actual table of every other
/// table is paired with the Nth actual table of the first on the same data source.
/// Bound tables with conditions of their own drop the pairs they don't match.
pub fn route_binding(
    rule: &ShardingRule,
    tables: &[String],
    conditions: &ShardingConditions,
    hints: &HintValues,
) -> Result<Vec<RouteUnit>, Error> {
    let Some((primary, bound)) = tables.split_first() else {
        return Ok(vec![]);
    };
    let primary_rule = rule
        .table_rule(primary)
        .ok_or_else(|| Error::NoTargets(primary.clone()))?;

    let mut units: Vec<RouteUnit> = route_table(primary_rule, conditions, hints)?
        .into_iter()
        .map(|node| {
            RouteUnit::new(&node.data_source).table(&primary_rule.logic_table, &node.table)
        })
        .collect();

    for table in bound {
        let bound_rule = rule
            .table_rule(table)
            .ok_or_else(|| Error::NoTargets(table.clone()))?;

        let constrained = conditions
            .satisfiable()
            .any(|c| !c.table_values(table).is_empty());
        let own: Option<IndexSet<DataNode>> = if constrained {
            Some(route_table(bound_rule, conditions, hints)?.into_iter().collect())
        } else {
            None
        };

        let mut aligned = vec![];
        for mut unit in units {
            let data_source = unit.data_source.actual_name.clone();
            let primary_actual = unit.actual_table(primary).unwrap_or_default().to_string();
            let primary_tables = primary_rule.actual_tables(&data_source);
            let bound_tables = bound_rule.actual_tables(&data_source);

            if primary_tables.len() != bound_tables.len() {
                return Err(Error::BindingMismatch {
                    table: table.clone(),
                    primary: primary.clone(),
                    reason: format!(
                        "{} has {} actual tables on \"{}\", {} has {}",
                        primary,
                        primary_tables.len(),
                        data_source,
                        table,
                        bound_tables.len()
                    ),
                });
            }

            let index = primary_rule
                .actual_table_index(&data_source, &primary_actual)
                .ok_or_else(|| Error::BindingMismatch {
                    table: table.clone(),
                    primary: primary.clone(),
                    reason: format!("\"{}\" is not a data node", primary_actual),
                })?;
            let bound_actual = &bound_tables[index];

            if let Some(ref own) = own {
                if !own.contains(&DataNode::new(&data_source, bound_actual)) {
                    continue;
                }
            }

            unit.tables
                .push(RouteMapper::new(&bound_rule.logic_table, bound_actual));
            aligned.push(unit);
        }

        if aligned.is_empty() {
            return Err(Error::NoTargets(table.clone()));
        }
        units = aligned;
    }

    debug!("binding tables {:?} routed to {} units", tables, units.len());

    Ok(units)
}
