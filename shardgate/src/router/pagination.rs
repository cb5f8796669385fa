//! Pagination.
//!
//! Either an explicit `LIMIT`/`OFFSET`, or row number predicates such as
//! `ROWNUM <= 30` and `rn > 20`, where `rn` is an alias of a row number
//! projection.

use crate::statement::{
    and_groups, Expression, LimitSegment, Operator, PaginationValue, PaginationValueSegment,
    Projection, SelectStatement, Span, Value,
};

use super::Error;

/// Row number pseudo-columns.
const ROW_NUMBER: &[&str] = &["rownum", "row_number"];

/// Offset or row count bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationBound {
    pub value: PaginationValue,
    pub span: Span,
    /// `>=` / `<=` against a row number.
    pub inclusive: bool,
}

impl PaginationBound {
    fn limit(segment: &PaginationValueSegment) -> Self {
        Self {
            value: segment.value,
            span: segment.span,
            inclusive: false,
        }
    }

    fn resolve(&self, parameters: &[Value]) -> Result<i64, Error> {
        match self.value {
            PaginationValue::Literal(value) => Ok(value),
            PaginationValue::Parameter(index) => parameters
                .get(index)
                .and_then(|v| v.integer())
                .ok_or(Error::MissingParameter(index)),
        }
    }

    pub fn parameter_index(&self) -> Option<usize> {
        match self.value {
            PaginationValue::Parameter(index) => Some(index),
            PaginationValue::Literal(_) => None,
        }
    }
}

/// Pagination of a `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationContext {
    pub offset: Option<PaginationBound>,
    pub row_count: Option<PaginationBound>,
    /// Bounds are row number predicates.
    pub row_number: bool,
    /// Rows are grouped or aggregated in an order different from `ORDER BY`,
    /// so every row is needed to merge.
    pub max_row_count: bool,
}

impl PaginationContext {
    /// `None` if the query isn't paginated.
    pub fn new(select: &SelectStatement) -> Option<Self> {
        let max_row_count = max_row_count(select);

        if let Some(LimitSegment { offset, row_count }) = select.limit {
            if offset.is_some() || row_count.is_some() {
                return Some(Self {
                    offset: offset.as_ref().map(PaginationBound::limit),
                    row_count: row_count.as_ref().map(PaginationBound::limit),
                    row_number: false,
                    max_row_count,
                });
            }
        }

        let mut aliases: Vec<String> = ROW_NUMBER.iter().map(|s| s.to_string()).collect();
        row_number_aliases(select, &mut aliases);

        let mut context = Self {
            offset: None,
            row_count: None,
            row_number: true,
            max_row_count,
        };
        context.row_number_bounds(select, &aliases);

        if context.offset.is_some() || context.row_count.is_some() {
            Some(context)
        } else {
            None
        }
    }

    fn row_number_bounds(&mut self, select: &SelectStatement, aliases: &[String]) {
        if let Some(ref where_clause) = select.where_clause {
            for group in and_groups(&where_clause.expression) {
                for predicate in group {
                    self.row_number_predicate(predicate, aliases);
                }
            }
        }

        for subquery in select.from_subqueries() {
            self.row_number_bounds(subquery, aliases);
        }
    }

    fn row_number_predicate(&mut self, predicate: &Expression, aliases: &[String]) {
        let Expression::Binary {
            left,
            operator,
            right,
            ..
        } = predicate
        else {
            return;
        };

        let (column, operator, operand) = match (left.column(), right.column()) {
            (Some(column), None) => (column, operator.clone(), right.as_ref()),
            (None, Some(column)) => (column, operator.flip(), left.as_ref()),
            _ => return,
        };

        if !aliases.iter().any(|a| a.eq_ignore_ascii_case(&column.name)) {
            return;
        }

        let (value, span) = match operand {
            Expression::Literal {
                value: Value::Integer(value),
                span,
            } => (PaginationValue::Literal(*value), *span),
            Expression::Parameter { index, span } => (PaginationValue::Parameter(*index), *span),
            _ => return,
        };

        match operator {
            Operator::Gt | Operator::GtEq => {
                self.offset = Some(PaginationBound {
                    value,
                    span,
                    inclusive: operator == Operator::GtEq,
                })
            }
            Operator::Lt | Operator::LtEq => {
                self.row_count = Some(PaginationBound {
                    value,
                    span,
                    inclusive: operator == Operator::LtEq,
                })
            }
            _ => (),
        }
    }

    /// Rows to skip.
    pub fn actual_offset(&self, parameters: &[Value]) -> Result<i64, Error> {
        let Some(ref offset) = self.offset else {
            return Ok(0);
        };
        let value = offset.resolve(parameters)?;
        let value = if self.row_number && offset.inclusive {
            value.saturating_sub(1)
        } else {
            value
        };
        Ok(value.max(0))
    }

    /// Rows to return after the offset. `None` if unbounded.
    pub fn actual_row_count(&self, parameters: &[Value]) -> Result<Option<i64>, Error> {
        let Some(ref row_count) = self.row_count else {
            return Ok(None);
        };
        let value = row_count.resolve(parameters)?;

        if self.row_number {
            let last = if row_count.inclusive {
                value
            } else {
                value.saturating_sub(1)
            };
            Ok(Some(last.saturating_sub(self.actual_offset(parameters)?).max(0)))
        } else {
            Ok(Some(value.max(0)))
        }
    }

    /// Row count each target is asked for when results are merged.
    pub fn revised_row_count(&self, parameters: &[Value]) -> Result<i64, Error> {
        if self.max_row_count {
            return Ok(i32::MAX as i64);
        }

        let Some(ref row_count) = self.row_count else {
            return Ok(i32::MAX as i64);
        };

        let revised = if self.row_number {
            // Already counted from the first row.
            row_count.resolve(parameters)?
        } else {
            self.actual_offset(parameters)?
                .saturating_add(self.actual_row_count(parameters)?.unwrap_or(0))
        };

        // Past i32::MAX every row is fetched anyway.
        Ok(revised.min(i32::MAX as i64))
    }
}

fn row_number_aliases(select: &SelectStatement, aliases: &mut Vec<String>) {
    for projection in &select.projections.items {
        let row_number = match projection {
            Projection::Column { column, .. } => ROW_NUMBER
                .iter()
                .any(|r| r.eq_ignore_ascii_case(&column.name)),
            Projection::Expression {
                expression: Expression::Opaque { text, .. },
                ..
            } => {
                let text = text.to_lowercase();
                ROW_NUMBER.iter().any(|r| text.starts_with(r))
            }
            _ => false,
        };

        if row_number {
            if let Some(alias) = projection.alias() {
                aliases.push(alias.to_string());
            }
        }
    }

    for subquery in select.from_subqueries() {
        row_number_aliases(subquery, aliases);
    }
}

/// Grouping or aggregation that doesn't follow `ORDER BY`.
fn max_row_count(select: &SelectStatement) -> bool {
    let grouped = select.group_by.as_ref().is_some_and(|g| !g.items.is_empty());
    let aggregated = select.projections.aggregations().next().is_some();

    if !grouped && !aggregated {
        return false;
    }

    let same = match (&select.group_by, &select.order_by) {
        (Some(group_by), Some(order_by)) => {
            group_by.items.len() == order_by.items.len()
                && group_by
                    .items
                    .iter()
                    .zip(order_by.items.iter())
                    .all(|(g, o)| g.same_as(o))
        }
        (Some(_), None) => true,
        _ => false,
    };

    !same
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::statement::{
        ColumnSegment, Direction, OrderByItem, OrderBySegment, ProjectionsSegment, WhereSegment,
    };

    fn limit(offset: Option<PaginationValue>, row_count: Option<PaginationValue>) -> SelectStatement {
        let segment = |value| PaginationValueSegment {
            value,
            span: Span::new(0, 0),
        };
        SelectStatement {
            limit: Some(LimitSegment {
                offset: offset.map(segment),
                row_count: row_count.map(segment),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_limit_offset() {
        let select = limit(
            Some(PaginationValue::Literal(20)),
            Some(PaginationValue::Parameter(0)),
        );
        let context = PaginationContext::new(&select).unwrap();
        let params = vec![Value::from(10)];
        assert_eq!(context.actual_offset(&params).unwrap(), 20);
        assert_eq!(context.actual_row_count(&params).unwrap(), Some(10));
        assert_eq!(context.revised_row_count(&params).unwrap(), 30);
        assert!(matches!(
            context.actual_row_count(&[]),
            Err(Error::MissingParameter(0))
        ));
    }

    #[test]
    fn test_huge_limit() {
        let select = limit(
            Some(PaginationValue::Literal(20)),
            Some(PaginationValue::Literal(i64::MAX)),
        );
        let context = PaginationContext::new(&select).unwrap();
        assert_eq!(context.actual_row_count(&[]).unwrap(), Some(i64::MAX));
        assert_eq!(context.revised_row_count(&[]).unwrap(), i32::MAX as i64);

        let select = limit(
            Some(PaginationValue::Literal(i64::MIN)),
            Some(PaginationValue::Literal(10)),
        );
        let context = PaginationContext::new(&select).unwrap();
        assert_eq!(context.actual_offset(&[]).unwrap(), 0);
        assert_eq!(context.revised_row_count(&[]).unwrap(), 10);
    }

    #[test]
    fn test_no_pagination() {
        assert!(PaginationContext::new(&SelectStatement::default()).is_none());
    }

    #[test]
    fn test_group_by_differs_from_order_by() {
        let mut select = limit(None, Some(PaginationValue::Literal(5)));
        let item = |name: &str| {
            OrderByItem::column(ColumnSegment::new(name, Span::new(0, 0)), Direction::Asc)
        };
        select.group_by = Some(OrderBySegment {
            items: vec![item("user_id")],
            span: Span::new(0, 0),
        });
        select.order_by = Some(OrderBySegment {
            items: vec![item("order_id")],
            span: Span::new(0, 0),
        });
        let context = PaginationContext::new(&select).unwrap();
        assert_eq!(context.revised_row_count(&[]).unwrap(), i32::MAX as i64);

        select.order_by = Some(OrderBySegment {
            items: vec![item("user_id")],
            span: Span::new(0, 0),
        });
        let context = PaginationContext::new(&select).unwrap();
        assert_eq!(context.revised_row_count(&[]).unwrap(), 5);
    }

    #[test]
    fn test_row_number() {
        // SELECT * FROM (SELECT o.*, ROWNUM rn FROM t_order o WHERE ROWNUM <= 30) WHERE rn > 20
        let rownum = |at: usize| Expression::Column(ColumnSegment::new("ROWNUM", Span::new(at, at + 5)));
        let inner = SelectStatement {
            projections: ProjectionsSegment {
                items: vec![Projection::Column {
                    column: ColumnSegment::new("ROWNUM", Span::new(0, 5)),
                    alias: Some("rn".into()),
                }],
                ..Default::default()
            },
            where_clause: Some(WhereSegment {
                expression: Expression::binary(
                    rownum(50),
                    Operator::LtEq,
                    Expression::Literal {
                        value: Value::Integer(30),
                        span: Span::new(60, 61),
                    },
                ),
                span: Span::new(44, 61),
            }),
            ..Default::default()
        };
        let outer = SelectStatement {
            from: vec![crate::statement::TableSource::Subquery {
                select: Box::new(inner),
                alias: None,
                span: Span::new(14, 62),
            }],
            where_clause: Some(WhereSegment {
                expression: Expression::binary(
                    Expression::Literal {
                        value: Value::Integer(20),
                        span: Span::new(70, 71),
                    },
                    Operator::Lt,
                    Expression::Column(ColumnSegment::new("rn", Span::new(75, 76))),
                ),
                span: Span::new(64, 76),
            }),
            ..Default::default()
        };

        let context = PaginationContext::new(&outer).unwrap();
        assert!(context.row_number);
        assert_eq!(context.actual_offset(&[]).unwrap(), 20);
        assert_eq!(context.actual_row_count(&[]).unwrap(), Some(10));
        assert_eq!(context.revised_row_count(&[]).unwrap(), 30);
        assert_eq!(context.offset.unwrap().span, Span::new(70, 71));
    }
}
