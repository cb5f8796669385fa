//! Router: sharding conditions and route engines.

pub mod condition;
pub mod error;
pub mod hint;
pub mod pagination;
pub mod route;

pub use error::Error;
pub use hint::HintValues;
pub use pagination::PaginationContext;
pub use route::{RouteContext, RouteMapper, RouteType, RouteUnit};

use tracing::debug;

use crate::sharding::{DataNode, ShardingRule};
use crate::statement::{Statement, Value};
use condition::{builder::check_update, GeneratedKeys, ShardingConditions};
use route::{broadcast, cartesian, check_ceiling, standard};

/// Picks route units for statements.
#[derive(Debug)]
pub struct Router<'a> {
    rule: &'a ShardingRule,
}

impl<'a> Router<'a> {
    pub fn new(rule: &'a ShardingRule) -> Self {
        Self { rule }
    }

    /// Route a statement.
    pub fn route(
        &self,
        statement: &Statement,
        parameters: &[Value],
        hints: &HintValues,
    ) -> Result<RouteContext, Error> {
        if let Some(ref data_source) = hints.data_source {
            if !self.rule.data_sources().contains(data_source) {
                return Err(Error::UnknownDataSource(data_source.clone()));
            }
            debug!("data source \"{}\" forced by hint", data_source);
            return RouteContext::new(RouteType::Hint, vec![RouteUnit::new(data_source)]);
        }

        let tables = statement.table_names();
        let sharding: Vec<String> = tables
            .iter()
            .filter(|t| self.rule.is_sharding_table(t))
            .cloned()
            .collect();
        let broadcast: Vec<String> = tables
            .iter()
            .filter(|t| self.rule.is_broadcast_table(t))
            .cloned()
            .collect();
        let unruled = tables.len() - sharding.len() - broadcast.len();

        let context = if statement.is_ddl() {
            if !sharding.is_empty() {
                let units = self.sharded(&sharding, &ShardingConditions::default(), hints)?;
                RouteContext::new(RouteType::TableBroadcast, units)?
            } else if unruled == 0 {
                RouteContext::new(
                    RouteType::DatabaseBroadcast,
                    broadcast::database_broadcast(self.rule),
                )?
            } else {
                RouteContext::new(
                    RouteType::Default,
                    broadcast::default_data_source(self.rule, &tables)?,
                )?
            }
        } else if sharding.is_empty() {
            if unruled > 0 {
                RouteContext::new(
                    RouteType::Default,
                    broadcast::default_data_source(self.rule, &tables)?,
                )?
            } else if statement.is_dml() {
                RouteContext::new(
                    RouteType::DatabaseBroadcast,
                    broadcast::database_broadcast(self.rule),
                )?
            } else {
                RouteContext::new(RouteType::Unicast, broadcast::unicast(self.rule, &tables)?)?
            }
        } else {
            self.route_sharded(statement, &sharding, parameters, hints)?
        };

        let context = context.with_broadcast(&broadcast);
        check_ceiling(
            &tables,
            vec![context.units.len()],
            context.units.len(),
            self.rule.max_route_units(),
        )?;

        debug!(
            "{:?} route to {} units [{}]",
            context.route_type,
            context.units.len(),
            context
                .units
                .iter()
                .map(|u| u.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(context)
    }

    fn route_sharded(
        &self,
        statement: &Statement,
        sharding: &[String],
        parameters: &[Value],
        hints: &HintValues,
    ) -> Result<RouteContext, Error> {
        if let Statement::Insert(insert) = statement {
            if !insert.values.is_empty() {
                return self.route_insert(statement, parameters, hints);
            }
        }

        let conditions = ShardingConditions::from_where(statement, self.rule, parameters);

        if let Statement::Update(update) = statement {
            check_update(update, &conditions, self.rule, parameters)?;
        }

        if conditions.always_false() {
            debug!("sharding conditions are always false");
            return RouteContext::new(RouteType::Unicast, broadcast::unicast(self.rule, sharding)?);
        }

        let units = self.sharded(sharding, &conditions, hints)?;
        let route_type = if sharding.len() == 1 || self.rule.all_binding(sharding) {
            RouteType::Standard
        } else {
            RouteType::Complex
        };
        RouteContext::new(route_type, units)
    }

    fn sharded(
        &self,
        sharding: &[String],
        conditions: &ShardingConditions,
        hints: &HintValues,
    ) -> Result<Vec<RouteUnit>, Error> {
        if sharding.len() == 1 || self.rule.all_binding(sharding) {
            let units = standard::route_binding(self.rule, sharding, conditions, hints)?;
            check_ceiling(
                sharding,
                vec![units.len()],
                units.len(),
                self.rule.max_route_units(),
            )?;
            Ok(units)
        } else {
            cartesian::route(self.rule, sharding, conditions, hints)
        }
    }

    /// Route every row on its own. Each row must land on one data node.
    fn route_insert(
        &self,
        statement: &Statement,
        parameters: &[Value],
        hints: &HintValues,
    ) -> Result<RouteContext, Error> {
        let Statement::Insert(insert) = statement else {
            return Err(Error::NoTargets(String::new()));
        };
        let table = &insert.table.name;
        let table_rule = self
            .rule
            .table_rule(table)
            .ok_or_else(|| Error::NoTargets(table.clone()))?;

        let generated = GeneratedKeys::generate(insert, self.rule);
        let conditions =
            ShardingConditions::from_insert(insert, self.rule, parameters, generated.as_ref());

        let mut nodes: Vec<DataNode> = vec![];
        for (row, condition) in conditions.conditions.iter().enumerate() {
            let routed =
                standard::route_condition(table_rule, &condition.table_values(table), hints)?;
            match routed.as_slice() {
                [node] => nodes.push(node.clone()),
                [] => return Err(Error::NoTargets(table.clone())),
                _ => {
                    return Err(Error::InsertMultipleNodes {
                        table: table.clone(),
                        row,
                        nodes: routed.len(),
                    })
                }
            }
        }

        let units = nodes
            .iter()
            .map(|node| RouteUnit::new(&node.data_source).table(&table_rule.logic_table, &node.table))
            .collect();

        let mut context = RouteContext::new(RouteType::Standard, units)?;
        context.original_data_nodes = nodes;
        context.generated_keys = generated;
        Ok(context)
    }
}
