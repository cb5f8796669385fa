//! Statement processing: route, then rewrite for every route unit.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{self, Rules};
use crate::rewrite::{RewriteContext, RewriteEngine, SqlUnit};
use crate::router::{HintValues, PaginationContext, RouteContext, Router};
use crate::statement::{Statement, Value};
use crate::Error;

#[cfg(test)]
pub mod test;

/// Statement to process.
#[derive(Debug, Clone, PartialEq, derive_builder::Builder)]
#[builder(setter(into))]
pub struct QueryContext {
    /// Original SQL text. Statement offsets point into it.
    pub sql: String,
    pub statement: Statement,
    #[builder(default)]
    pub parameters: Vec<Value>,
    /// Hints supplied by the caller. Without them, hints are read from
    /// SQL comments.
    #[builder(default)]
    pub hints: Option<HintValues>,
}

/// How the merge layer should treat pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationDecision {
    NotPaginated,
    /// One unit, pagination left as written.
    Original,
    /// Every unit was asked for rows from the first one. The merged result
    /// must skip `offset` rows and keep `row_count`.
    OverFetch {
        offset: i64,
        row_count: Option<i64>,
    },
}

/// SQL to run on one data source.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionUnit {
    pub data_source: String,
    pub sql_unit: SqlUnit,
}

/// Result of processing a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub route_context: RouteContext,
    /// One per route unit, in route order.
    pub units: Vec<ExecutionUnit>,
    pub pagination: PaginationDecision,
}

/// Routes and rewrites statements against a rules snapshot.
#[derive(Debug, Clone)]
pub struct Engine {
    rules: Arc<Rules>,
}

impl Engine {
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    /// Engine using the currently published rules.
    pub fn from_global() -> Self {
        Self::new(config::rules())
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn process(&self, query: &QueryContext) -> Result<ExecutionContext, Error> {
        let hints = match query.hints {
            Some(ref hints) => hints.clone(),
            None => HintValues::from_comment(&query.sql)?.unwrap_or_default(),
        };

        let route_context = Router::new(&self.rules.sharding).route(
            &query.statement,
            &query.parameters,
            &hints,
        )?;

        let pagination = query.statement.select().and_then(PaginationContext::new);
        let decision = match pagination {
            None => PaginationDecision::NotPaginated,
            Some(_) if route_context.is_single() => PaginationDecision::Original,
            Some(ref pagination) => PaginationDecision::OverFetch {
                offset: pagination.actual_offset(&query.parameters)?,
                row_count: pagination.actual_row_count(&query.parameters)?,
            },
        };
        debug!("pagination: {:?}", decision);

        let sql_units = RewriteEngine::new(RewriteContext {
            sql: &query.sql,
            statement: &query.statement,
            parameters: &query.parameters,
            route: &route_context,
            sharding: &self.rules.sharding,
            encrypt: &self.rules.encrypt,
            pagination,
        })
        .rewrite()?;

        let units: Vec<ExecutionUnit> = route_context
            .units
            .iter()
            .zip(sql_units)
            .map(|(unit, sql_unit)| ExecutionUnit {
                data_source: unit.data_source.actual_name.clone(),
                sql_unit,
            })
            .collect();

        if self.rules.general.sql_show {
            info!("Logic SQL: {}", query.sql);
            for unit in &units {
                if unit.sql_unit.parameters.is_empty() {
                    info!("Actual SQL: {} ::: {}", unit.data_source, unit.sql_unit.sql);
                } else {
                    info!(
                        "Actual SQL: {} ::: {} ::: {:?}",
                        unit.data_source, unit.sql_unit.sql, unit.sql_unit.parameters
                    );
                }
            }
        }

        Ok(ExecutionContext {
            route_context,
            units,
            pagination: decision,
        })
    }
}
