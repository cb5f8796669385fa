//! Rewrite engine: tokens in, one SQL unit per route unit out.

use tracing::trace;

use super::parameter::{GroupedParameterBuilder, StandardParameterBuilder};
use super::{generator, token, Error, ParameterBuilder, RewriteContext, SqlBuilder};
use crate::statement::{Statement, Value};

/// SQL and parameters for one route unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlUnit {
    pub sql: String,
    pub parameters: Vec<Value>,
}

#[derive(Debug)]
pub struct RewriteEngine<'a> {
    context: RewriteContext<'a>,
}

impl<'a> RewriteEngine<'a> {
    pub fn new(context: RewriteContext<'a>) -> Self {
        Self { context }
    }

    /// One SQL unit per route unit, in route order.
    pub fn rewrite(&self) -> Result<Vec<SqlUnit>, Error> {
        let context = &self.context;

        let (mut builder, insert_table) = match context.statement {
            Statement::Insert(insert) if !insert.values.is_empty() => (
                ParameterBuilder::Grouped(GroupedParameterBuilder::new(
                    insert,
                    context.parameters,
                )),
                Some(insert.table.name.as_str()),
            ),
            _ => (
                ParameterBuilder::Standard(StandardParameterBuilder::new(context.parameters)),
                None,
            ),
        };

        let tokens = token::sort(generator::generate(context, &mut builder)?)?;
        for token in &tokens {
            trace!("token {}", token);
        }

        let sql = SqlBuilder::new(context.sql, &tokens);

        Ok(context
            .route
            .units
            .iter()
            .map(|unit| {
                let rows = insert_table.and_then(|table| context.route.rows_for(unit, table));
                SqlUnit {
                    sql: sql.build(unit, context.route),
                    parameters: builder.parameters(rows.as_deref()),
                }
            })
            .collect())
    }
}
