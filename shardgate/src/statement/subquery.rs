//! Recursive collection of nested queries, tables, columns and predicates.

use std::collections::HashSet;

use super::{
    ColumnSegment, Expression, OrderBySegment, OrderByTarget, Projection, SelectStatement, Span,
    Statement, TableSegment, TableSource,
};

/// Everything nested inside a statement.
#[derive(Debug, Default)]
pub struct Collector<'a> {
    /// Every `SELECT`, the top-level one first.
    pub selects: Vec<&'a SelectStatement>,
    /// Every table reference, in order of appearance.
    pub tables: Vec<&'a TableSegment>,
    /// Every column reference.
    pub columns: Vec<&'a ColumnSegment>,
    /// `WHERE` and `ON` predicates, de-duplicated by location.
    pub predicates: Vec<&'a Expression>,
    seen: HashSet<(usize, usize)>,
    joins: HashSet<(usize, usize)>,
}

impl<'a> Collector<'a> {
    pub fn new(statement: &'a Statement) -> Self {
        let mut collector = Self::default();

        match statement {
            Statement::Select(select) => collector.select(select),

            Statement::Insert(insert) => {
                collector.tables.push(&insert.table);
                if let Some(ref columns) = insert.columns {
                    collector.columns.extend(columns.columns.iter());
                }
                for row in &insert.values {
                    for value in &row.values {
                        collector.expression(value);
                    }
                }
                if let Some(ref select) = insert.select {
                    collector.select(select);
                }
            }

            Statement::Update(update) => {
                collector.tables.push(&update.table);
                for assignment in &update.assignments {
                    collector.columns.push(&assignment.column);
                    collector.expression(&assignment.value);
                }
                if let Some(ref where_clause) = update.where_clause {
                    collector.predicate(&where_clause.expression);
                }
            }

            Statement::Delete(delete) => {
                collector.tables.push(&delete.table);
                if let Some(ref where_clause) = delete.where_clause {
                    collector.predicate(&where_clause.expression);
                }
            }

            Statement::CreateView(view) | Statement::AlterView(view) => {
                collector.select(&view.select)
            }

            Statement::Ddl(ddl) => collector.tables.extend(ddl.tables.iter()),
        }

        collector
    }

    fn select(&mut self, select: &'a SelectStatement) {
        self.selects.push(select);

        for projection in &select.projections.items {
            match projection {
                Projection::Column { column, .. } => self.columns.push(column),
                Projection::Expression { expression, .. } => self.expression(expression),
                Projection::Subquery { select, .. } => self.select(select),
                Projection::Shorthand { .. } | Projection::Aggregation { .. } => (),
            }
        }

        for source in &select.from {
            match source {
                TableSource::Table(table) => self.tables.push(table),
                TableSource::Subquery { select, .. } => self.select(select),
            }
        }

        for condition in &select.join_conditions {
            let Span { start, stop } = condition.span();
            self.joins.insert((start, stop));
            self.predicate(condition);
        }

        if let Some(ref where_clause) = select.where_clause {
            self.predicate(&where_clause.expression);
        }

        for clause in [&select.group_by, &select.order_by].into_iter().flatten() {
            self.order_by(clause);
        }
    }

    /// The predicate is a join condition rather than a filter.
    pub fn is_join_condition(&self, predicate: &Expression) -> bool {
        let Span { start, stop } = predicate.span();
        self.joins.contains(&(start, stop))
    }

    fn predicate(&mut self, expression: &'a Expression) {
        let Span { start, stop } = expression.span();
        if self.seen.insert((start, stop)) {
            self.predicates.push(expression);
            self.expression(expression);
        }
    }

    fn expression(&mut self, expression: &'a Expression) {
        expression.walk(&mut |expr| match expr {
            Expression::Column(column) => self.columns.push(column),
            Expression::Subquery { select, .. } => self.select(select),
            _ => (),
        });
    }

    fn order_by(&mut self, clause: &'a OrderBySegment) {
        for item in &clause.items {
            if let OrderByTarget::Column(ref column) = item.target {
                self.columns.push(column);
            }
        }
    }
}
