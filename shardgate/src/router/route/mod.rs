//! Route units and the engines producing them.

use std::fmt::Display;

use indexmap::IndexMap;

use super::condition::GeneratedKeys;
use super::Error;
use crate::sharding::DataNode;

pub mod broadcast;
pub mod cartesian;
pub mod standard;

/// Logical name and the actual name it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteMapper {
    pub logic_name: String,
    pub actual_name: String,
}

impl RouteMapper {
    pub fn new(logic_name: impl ToString, actual_name: impl ToString) -> Self {
        Self {
            logic_name: logic_name.to_string(),
            actual_name: actual_name.to_string(),
        }
    }
}

/// One physical execution target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteUnit {
    pub data_source: RouteMapper,
    pub tables: Vec<RouteMapper>,
}

impl RouteUnit {
    pub fn new(data_source: impl ToString) -> Self {
        let data_source = data_source.to_string();
        Self {
            data_source: RouteMapper::new(&data_source, &data_source),
            tables: vec![],
        }
    }

    pub fn table(mut self, logic: impl ToString, actual: impl ToString) -> Self {
        self.tables.push(RouteMapper::new(logic, actual));
        self
    }

    /// Actual name of a logical table in this unit.
    pub fn actual_table(&self, logic: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|t| t.logic_name.eq_ignore_ascii_case(logic))
            .map(|t| t.actual_name.as_str())
    }

    /// Data node of a logical table in this unit.
    pub fn data_node(&self, logic: &str) -> Option<DataNode> {
        self.actual_table(logic)
            .map(|actual| DataNode::new(&self.data_source.actual_name, actual))
    }

    fn merge(&self, other: &RouteUnit) -> RouteUnit {
        let mut unit = self.clone();
        unit.tables.extend(other.tables.iter().cloned());
        unit
    }
}

impl Display for RouteUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data_source.actual_name)?;
        for table in &self.tables {
            write!(f, " {}->{}", table.logic_name, table.actual_name)?;
        }
        Ok(())
    }
}

/// How the route was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    /// One sharding table, or tables bound together.
    Standard,
    /// Independent sharding tables, combined per data source.
    Complex,
    /// Every data source.
    DatabaseBroadcast,
    /// Every data node of the tables.
    TableBroadcast,
    /// Any single data source or node.
    Unicast,
    /// Tables without rules, on the default data source.
    Default,
    /// Data source forced by a hint.
    Hint,
}

/// Route of a statement. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteContext {
    pub route_type: RouteType,
    pub units: Vec<RouteUnit>,
    /// Data node of every `INSERT` row, in row order.
    pub original_data_nodes: Vec<DataNode>,
    pub generated_keys: Option<GeneratedKeys>,
}

impl RouteContext {
    /// Units grouped by data source, data sources in order of first appearance.
    pub fn new(route_type: RouteType, units: Vec<RouteUnit>) -> Result<Self, Error> {
        let mut by_data_source: IndexMap<String, Vec<RouteUnit>> = IndexMap::new();
        for unit in units {
            let entry = by_data_source
                .entry(unit.data_source.actual_name.clone())
                .or_default();
            if !entry.contains(&unit) {
                entry.push(unit);
            }
        }

        let units: Vec<RouteUnit> = by_data_source.into_values().flatten().collect();
        if units.is_empty() {
            return Err(Error::NoDataSource(vec![]));
        }

        Ok(Self {
            route_type,
            units,
            original_data_nodes: vec![],
            generated_keys: None,
        })
    }

    pub fn is_single(&self) -> bool {
        self.units.len() == 1
    }

    /// Data sources, in unit order.
    pub fn data_sources(&self) -> Vec<&str> {
        let mut result: Vec<&str> = vec![];
        for unit in &self.units {
            if !result.contains(&unit.data_source.actual_name.as_str()) {
                result.push(&unit.data_source.actual_name);
            }
        }
        result
    }

    /// `INSERT` rows routed to a unit. `None` if rows weren't routed one by one.
    pub fn rows_for(&self, unit: &RouteUnit, table: &str) -> Option<Vec<usize>> {
        if self.original_data_nodes.is_empty() {
            return None;
        }
        let node = unit.data_node(table)?;
        Some(
            self.original_data_nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| {
                    n.data_source == node.data_source && n.table.eq_ignore_ascii_case(&node.table)
                })
                .map(|(row, _)| row)
                .collect(),
        )
    }

    /// Add broadcast tables to every unit.
    pub(super) fn with_broadcast(mut self, tables: &[String]) -> Self {
        for unit in self.units.iter_mut() {
            for table in tables {
                if unit.actual_table(table).is_none() {
                    unit.tables.push(RouteMapper::new(table, table));
                }
            }
        }
        self
    }
}

/// Fail if the route would have more than `max` units.
pub(super) fn check_ceiling(
    tables: &[String],
    candidates: Vec<usize>,
    units: usize,
    max: usize,
) -> Result<(), Error> {
    if units > max {
        return Err(Error::RouteExplosion {
            tables: tables.to_vec(),
            candidates,
            units,
            max,
        });
    }
    Ok(())
}
