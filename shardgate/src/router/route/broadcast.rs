//! Routes that don't depend on sharding values.

use super::RouteUnit;
use crate::router::Error;
use crate::sharding::ShardingRule;

/// Every data source.
pub fn database_broadcast(rule: &ShardingRule) -> Vec<RouteUnit> {
    rule.data_sources().iter().map(RouteUnit::new).collect()
}

/// One unit: the first data source of the first table, and the first actual
/// table of every table on it.
pub fn unicast(rule: &ShardingRule, tables: &[String]) -> Result<Vec<RouteUnit>, Error> {
    let data_source = tables
        .iter()
        .find_map(|t| rule.table_rule(t))
        .and_then(|r| r.data_sources().into_iter().next())
        .or_else(|| rule.data_sources().first().cloned())
        .ok_or_else(|| Error::NoDataSource(tables.to_vec()))?;

    let mut unit = RouteUnit::new(&data_source);
    for table in tables {
        if let Some(table_rule) = rule.table_rule(table) {
            let actual = table_rule
                .actual_tables(&data_source)
                .into_iter()
                .next()
                .ok_or_else(|| Error::NoCommonDataSource {
                    tables: tables.to_vec(),
                })?;
            unit = unit.table(&table_rule.logic_table, actual);
        }
    }

    Ok(vec![unit])
}

/// Default data source, for tables without rules.
pub fn default_data_source(rule: &ShardingRule, tables: &[String]) -> Result<Vec<RouteUnit>, Error> {
    let data_source = rule
        .default_data_source()
        .ok_or_else(|| Error::NoDataSource(tables.to_vec()))?;
    Ok(vec![RouteUnit::new(data_source)])
}
