//! Routing independent tables.
//!
//! Every table, or group of bound tables, is routed on its own. The groups are then
//! combined on the data sources they have in common, taking every combination of
//! their actual tables.

use indexmap::IndexMap;
use tracing::debug;

use super::standard::route_binding;
use super::{check_ceiling, RouteUnit};
use crate::router::condition::ShardingConditions;
use crate::router::hint::HintValues;
use crate::router::Error;
use crate::sharding::ShardingRule;

/// Split tables into binding groups and independent tables, keeping statement order.
pub fn partition(rule: &ShardingRule, tables: &[String]) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = vec![];

    for table in tables {
        let bound_to = rule.binding_group(table);
        let existing = groups.iter_mut().find(|group| {
            bound_to.is_some_and(|binding| {
                group
                    .first()
                    .is_some_and(|first| binding.contains(&first.to_lowercase()))
            })
        });

        match existing {
            Some(group) => group.push(table.clone()),
            None => groups.push(vec![table.clone()]),
        }
    }

    groups
}

pub fn route(
    rule: &ShardingRule,
    tables: &[String],
    conditions: &ShardingConditions,
    hints: &HintValues,
) -> Result<Vec<RouteUnit>, Error> {
    let groups = partition(rule, tables);

    // Units of every group, by data source.
    let mut routed: Vec<IndexMap<String, Vec<RouteUnit>>> = vec![];
    for group in &groups {
        let mut by_data_source: IndexMap<String, Vec<RouteUnit>> = IndexMap::new();
        for unit in route_binding(rule, group, conditions, hints)? {
            by_data_source
                .entry(unit.data_source.actual_name.clone())
                .or_default()
                .push(unit);
        }
        routed.push(by_data_source);
    }

    let Some((first, rest)) = routed.split_first() else {
        return Ok(vec![]);
    };

    let common: Vec<&String> = first
        .keys()
        .filter(|ds| rest.iter().all(|group| group.contains_key(*ds)))
        .collect();

    if common.is_empty() {
        return Err(Error::NoCommonDataSource {
            tables: tables.to_vec(),
        });
    }

    let candidates: Vec<usize> = routed
        .iter()
        .map(|group| group.values().map(|units| units.len()).sum())
        .collect();
    let total = common.iter().fold(0usize, |total, ds| {
        let product = routed
            .iter()
            .map(|group| group.get(*ds).map(|u| u.len()).unwrap_or_default())
            .fold(1usize, |p, n| p.saturating_mul(n));
        total.saturating_add(product)
    });
    check_ceiling(tables, candidates, total, rule.max_route_units())?;

    let mut units = vec![];
    for ds in common {
        let mut combined: Vec<RouteUnit> = vec![RouteUnit::new(ds)];
        for group in &routed {
            let group_units = group.get(ds).map(|u| u.as_slice()).unwrap_or_default();
            combined = combined
                .iter()
                .flat_map(|partial| {
                    group_units.iter().map(move |unit| partial.merge(unit))
                })
                .collect();
        }
        units.extend(combined);
    }

    debug!(
        "cartesian route over {} groups produced {} units",
        groups.len(),
        units.len()
    );

    Ok(units)
}
