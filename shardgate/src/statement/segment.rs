//! Segments of the original SQL text.
//!
//! Every segment records where it sits in the query so the rewriter
//! can splice replacements without re-serializing the statement.

use super::{Expression, SelectStatement};

/// Byte range in the SQL text. `stop` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
}

impl Span {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Span of `needle` at its first occurrence at or after `from`.
    ///
    /// Handy for writing statements by hand.
    pub fn find(sql: &str, needle: &str, from: usize) -> Option<Self> {
        sql.get(from..)?
            .find(needle)
            .map(|pos| Self::new(from + pos, from + pos + needle.len() - 1))
    }

    /// Exclusive end.
    pub fn end(&self) -> usize {
        self.stop + 1
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }
}

/// Table name as written in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSegment {
    pub name: String,
    pub alias: Option<String>,
    /// Location of the name only, without schema or alias.
    pub span: Span,
}

impl TableSegment {
    pub fn new(name: impl ToString, span: Span) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            span,
        }
    }

    pub fn alias(mut self, alias: impl ToString) -> Self {
        self.alias = Some(alias.to_string());
        self
    }
}

/// Column qualifier, e.g. `o` in `o.order_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerSegment {
    pub name: String,
    pub span: Span,
}

/// Column reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSegment {
    pub name: String,
    pub owner: Option<OwnerSegment>,
    /// Location of the column name, excluding the owner.
    pub span: Span,
}

impl ColumnSegment {
    pub fn new(name: impl ToString, span: Span) -> Self {
        Self {
            name: name.to_string(),
            owner: None,
            span,
        }
    }

    pub fn owner(mut self, owner: impl ToString, span: Span) -> Self {
        self.owner = Some(OwnerSegment {
            name: owner.to_string(),
            span,
        });
        self
    }

    /// Span including the owner, if any.
    pub fn full_span(&self) -> Span {
        match self.owner {
            Some(ref owner) => Span::new(owner.span.start, self.span.stop),
            None => self.span,
        }
    }

    /// `owner.name` or `name`.
    pub fn qualified_name(&self) -> String {
        match self.owner {
            Some(ref owner) => format!("{}.{}", owner.name, self.name),
            None => self.name.clone(),
        }
    }
}

/// Index name in a DDL statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSegment {
    pub name: String,
    pub span: Span,
}

/// `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereSegment {
    pub expression: Expression,
    pub span: Span,
}

/// Aggregate function in a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationType {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// One projection of a `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*` or `t.*`.
    Shorthand { owner: Option<String>, span: Span },
    Column {
        column: ColumnSegment,
        alias: Option<String>,
    },
    Aggregation {
        kind: AggregationType,
        /// Argument text, e.g. `price` in `AVG(price)`.
        argument: String,
        alias: Option<String>,
        span: Span,
    },
    Expression {
        expression: Expression,
        alias: Option<String>,
    },
    Subquery {
        select: Box<SelectStatement>,
        alias: Option<String>,
        span: Span,
    },
}

impl Projection {
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Shorthand { .. } => None,
            Self::Column { alias, .. }
            | Self::Aggregation { alias, .. }
            | Self::Expression { alias, .. }
            | Self::Subquery { alias, .. } => alias.as_deref(),
        }
    }
}

/// Projection list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectionsSegment {
    pub items: Vec<Projection>,
    pub distinct: bool,
    /// From the first to the last projection.
    pub span: Span,
}

impl ProjectionsSegment {
    /// Projection list has an unqualified `*`.
    pub fn shorthand(&self) -> bool {
        self.items
            .iter()
            .any(|p| matches!(p, Projection::Shorthand { owner: None, .. }))
    }

    pub fn aggregations(&self) -> impl Iterator<Item = &Projection> {
        self.items
            .iter()
            .filter(|p| matches!(p, Projection::Aggregation { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// Target of an `ORDER BY` / `GROUP BY` item.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderByTarget {
    Column(ColumnSegment),
    /// `ORDER BY 2`.
    Position(usize),
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub target: OrderByTarget,
    pub direction: Direction,
}

impl OrderByItem {
    pub fn column(column: ColumnSegment, direction: Direction) -> Self {
        Self {
            target: OrderByTarget::Column(column),
            direction,
        }
    }

    /// Same target and direction, ignoring owners and positions.
    pub fn same_as(&self, other: &OrderByItem) -> bool {
        self.direction == other.direction
            && match (&self.target, &other.target) {
                (OrderByTarget::Column(a), OrderByTarget::Column(b)) => {
                    a.name.eq_ignore_ascii_case(&b.name)
                }
                (OrderByTarget::Position(a), OrderByTarget::Position(b)) => a == b,
                (OrderByTarget::Expression(a), OrderByTarget::Expression(b)) => a == b,
                _ => false,
            }
    }
}

/// `ORDER BY` or `GROUP BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBySegment {
    pub items: Vec<OrderByItem>,
    pub span: Span,
}

/// Offset or row count value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaginationValue {
    Literal(i64),
    Parameter(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationValueSegment {
    pub value: PaginationValue,
    pub span: Span,
}

/// `LIMIT` / `OFFSET` clause.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimitSegment {
    pub offset: Option<PaginationValueSegment>,
    pub row_count: Option<PaginationValueSegment>,
}

/// `SET column = value` in an `UPDATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSegment {
    pub column: ColumnSegment,
    pub value: Expression,
    pub span: Span,
}

/// Column list of an `INSERT`, including the parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertColumnsSegment {
    pub columns: Vec<ColumnSegment>,
    pub span: Span,
}

/// One row of `VALUES`, including the parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertValuesSegment {
    pub values: Vec<Expression>,
    pub span: Span,
}
