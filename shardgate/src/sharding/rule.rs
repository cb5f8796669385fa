//! Compiled sharding rule.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use indexmap::IndexMap;
use shardgate_config::{Config, General};
use tracing::{debug, info};

use super::inline_expr::expand;
use super::keygen::{self, KeyGenerator};
use super::{Error, Registry, ShardingStrategy};

/// Physical table on a data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataNode {
    pub data_source: String,
    pub table: String,
}

impl DataNode {
    pub fn new(data_source: impl ToString, table: impl ToString) -> Self {
        Self {
            data_source: data_source.to_string(),
            table: table.to_string(),
        }
    }

    /// Parse `ds.table`. Without a data source, `data_source` is used.
    fn parse(node: &str, data_source: Option<&str>) -> Result<Self, Error> {
        match (node.split_once('.'), data_source) {
            (Some((ds, table)), _) if !ds.is_empty() && !table.is_empty() => {
                Ok(Self::new(ds, table))
            }
            (None, Some(ds)) => Ok(Self::new(ds, node)),
            _ => Err(Error::InlineExpression {
                expression: node.to_string(),
                reason: "expected \"<data source>.<table>\"".into(),
            }),
        }
    }
}

impl Display for DataNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

/// Auto-generated key column.
#[derive(Debug, Clone)]
pub struct KeyGenerateRule {
    pub column: String,
    pub generator: Arc<dyn KeyGenerator>,
}

/// Rule for one logical table.
#[derive(Debug, Clone)]
pub struct TableRule {
    pub logic_table: String,
    pub actual_data_nodes: Vec<DataNode>,
    pub database_strategy: Option<ShardingStrategy>,
    pub table_strategy: Option<ShardingStrategy>,
    pub key_generate: Option<KeyGenerateRule>,
}

impl TableRule {
    /// Data sources holding this table, in configuration order.
    pub fn data_sources(&self) -> Vec<String> {
        let mut result: Vec<String> = vec![];
        for node in &self.actual_data_nodes {
            if !result.contains(&node.data_source) {
                result.push(node.data_source.clone());
            }
        }
        result
    }

    /// Actual tables on a data source.
    pub fn actual_tables(&self, data_source: &str) -> Vec<String> {
        self.actual_data_nodes
            .iter()
            .filter(|node| node.data_source == data_source)
            .map(|node| node.table.clone())
            .collect()
    }

    /// Position of an actual table among the tables of its data source.
    pub fn actual_table_index(&self, data_source: &str, table: &str) -> Option<usize> {
        self.actual_tables(data_source)
            .iter()
            .position(|t| t.eq_ignore_ascii_case(table))
    }

    pub fn is_sharding_column(&self, column: &str) -> bool {
        [&self.database_strategy, &self.table_strategy]
            .into_iter()
            .flatten()
            .any(|s| s.columns().iter().any(|c| c.eq_ignore_ascii_case(column)))
    }

    pub fn generate_key_column(&self) -> Option<&str> {
        self.key_generate.as_ref().map(|k| k.column.as_str())
    }
}

/// Sharding configuration, compiled.
#[derive(Debug, Clone)]
pub struct ShardingRule {
    tables: IndexMap<String, TableRule>,
    binding_groups: Vec<Vec<String>>,
    broadcast_tables: Vec<String>,
    data_sources: Vec<String>,
    default_data_source: Option<String>,
    max_route_units: usize,
}

impl Default for ShardingRule {
    fn default() -> Self {
        Self {
            tables: IndexMap::new(),
            binding_groups: vec![],
            broadcast_tables: vec![],
            data_sources: vec![],
            default_data_source: None,
            max_route_units: General::default().max_route_units,
        }
    }
}

impl ShardingRule {
    pub fn new(config: &Config, registry: &Registry) -> Result<Self, Error> {
        let mut algorithms = HashMap::new();
        for algorithm in &config.sharding_algorithms {
            algorithms.insert(algorithm.name.clone(), registry.create(algorithm)?);
        }

        let data_sources = config.data_source_names();
        let single_data_source = match data_sources.as_slice() {
            [ds] => Some(ds.as_str()),
            _ => None,
        };

        let mut tables = IndexMap::new();
        for table in &config.sharding_tables {
            let actual_data_nodes = match table.actual_data_nodes {
                Some(ref expression) => expand(expression)?
                    .iter()
                    .map(|node| DataNode::parse(node, single_data_source))
                    .collect::<Result<Vec<_>, _>>()?,
                None => data_sources
                    .iter()
                    .map(|ds| DataNode::new(ds, &table.name))
                    .collect(),
            };

            if actual_data_nodes.is_empty() {
                return Err(Error::NoDataNodes(table.name.clone()));
            }

            let strategy = |own: &Option<_>, default: &Option<_>| {
                match own.as_ref().or(default.as_ref()) {
                    Some(config) => ShardingStrategy::new(config, &algorithms),
                    None => Ok(None),
                }
            };

            let key_generate = match table.key_generate_strategy {
                Some(ref strategy) => {
                    let algorithm = config
                        .key_generator(&strategy.generator)
                        .ok_or_else(|| Error::UnknownKeyGenerator(strategy.generator.clone()))?;
                    Some(KeyGenerateRule {
                        column: strategy.column.clone(),
                        generator: keygen::create(algorithm, config.general.worker_id)?,
                    })
                }
                None => None,
            };

            let rule = TableRule {
                logic_table: table.name.clone(),
                database_strategy: strategy(
                    &table.database_strategy,
                    &config.default_database_strategy,
                )?,
                table_strategy: strategy(&table.table_strategy, &config.default_table_strategy)?,
                actual_data_nodes,
                key_generate,
            };

            debug!(
                "table \"{}\" has {} data nodes",
                rule.logic_table,
                rule.actual_data_nodes.len()
            );

            tables.insert(table.name.to_lowercase(), rule);
        }

        let binding_groups = config
            .binding_tables
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|t| t.to_lowercase())
                    .filter(|t| tables.contains_key(t))
                    .collect::<Vec<_>>()
            })
            .filter(|group| group.len() > 1)
            .collect();

        info!(
            "sharding rule loaded [{} tables, {} data sources]",
            tables.len(),
            data_sources.len()
        );

        Ok(Self {
            tables,
            binding_groups,
            broadcast_tables: config
                .broadcast_tables
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            default_data_source: config.general.default_data_source.clone(),
            max_route_units: config.general.max_route_units,
            data_sources,
        })
    }

    pub fn table_rule(&self, table: &str) -> Option<&TableRule> {
        self.tables.get(&table.to_lowercase())
    }

    pub fn is_sharding_table(&self, table: &str) -> bool {
        self.table_rule(table).is_some()
    }

    /// Broadcast tables that are also sharded count as sharded.
    pub fn is_broadcast_table(&self, table: &str) -> bool {
        !self.is_sharding_table(table) && self.broadcast_tables.contains(&table.to_lowercase())
    }

    pub fn is_sharding_column(&self, table: &str, column: &str) -> bool {
        self.table_rule(table)
            .is_some_and(|rule| rule.is_sharding_column(column))
    }

    /// Binding group a table belongs to.
    pub fn binding_group(&self, table: &str) -> Option<&[String]> {
        let table = table.to_lowercase();
        self.binding_groups
            .iter()
            .find(|group| group.contains(&table))
            .map(|group| group.as_slice())
    }

    /// All tables are bound together.
    pub fn all_binding(&self, tables: &[String]) -> bool {
        let Some(first) = tables.first() else {
            return false;
        };
        match self.binding_group(first) {
            Some(group) => tables.iter().all(|t| group.contains(&t.to_lowercase())),
            None => false,
        }
    }

    pub fn data_sources(&self) -> &[String] {
        &self.data_sources
    }

    pub fn default_data_source(&self) -> Option<&str> {
        self.default_data_source
            .as_deref()
            .or(match self.data_sources.as_slice() {
                [ds] => Some(ds.as_str()),
                _ => None,
            })
    }

    pub fn max_route_units(&self) -> usize {
        self.max_route_units
    }

    /// Override the route unit ceiling.
    pub fn set_max_route_units(&mut self, max_route_units: usize) {
        self.max_route_units = max_route_units;
    }
}
