//! Parsed statement handed to the router.
//!
//! The parser is external; it produces these types with byte offsets
//! into the original SQL text.

pub mod expression;
pub mod predicate;
pub mod segment;
pub mod subquery;
pub mod tables;
pub mod value;

pub use expression::{Expression, Operator};
pub use predicate::and_groups;
pub use segment::*;
pub use subquery::Collector;
pub use tables::TablesContext;
pub use value::Value;

/// Table in a `FROM` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(TableSegment),
    Subquery {
        select: Box<SelectStatement>,
        alias: Option<String>,
        span: Span,
    },
}

/// `SELECT` statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub projections: ProjectionsSegment,
    pub from: Vec<TableSource>,
    /// `ON` conditions of joined tables.
    pub join_conditions: Vec<Expression>,
    pub where_clause: Option<WhereSegment>,
    pub group_by: Option<OrderBySegment>,
    pub order_by: Option<OrderBySegment>,
    pub limit: Option<LimitSegment>,
}

impl SelectStatement {
    /// Tables directly in `FROM`, excluding subqueries.
    pub fn simple_tables(&self) -> impl Iterator<Item = &TableSegment> {
        self.from.iter().filter_map(|source| match source {
            TableSource::Table(table) => Some(table),
            TableSource::Subquery { .. } => None,
        })
    }

    /// Subqueries in `FROM`.
    pub fn from_subqueries(&self) -> impl Iterator<Item = &SelectStatement> {
        self.from.iter().filter_map(|source| match source {
            TableSource::Subquery { select, .. } => Some(select.as_ref()),
            TableSource::Table(_) => None,
        })
    }
}

/// `INSERT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: TableSegment,
    pub columns: Option<InsertColumnsSegment>,
    pub values: Vec<InsertValuesSegment>,
    /// `INSERT ... SELECT`.
    pub select: Option<Box<SelectStatement>>,
}

impl InsertStatement {
    /// Position of a column in the column list.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .as_ref()?
            .columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Span covering every `VALUES` row.
    pub fn values_span(&self) -> Option<Span> {
        let first = self.values.first()?;
        let last = self.values.last()?;
        Some(Span::new(first.span.start, last.span.stop))
    }
}

/// `UPDATE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: TableSegment,
    pub assignments: Vec<AssignmentSegment>,
    pub where_clause: Option<WhereSegment>,
}

/// `DELETE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: TableSegment,
    pub where_clause: Option<WhereSegment>,
}

/// `CREATE VIEW` / `ALTER VIEW`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewStatement {
    pub view: TableSegment,
    pub select: Box<SelectStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlKind {
    CreateTable,
    AlterTable,
    DropTable,
    TruncateTable,
    CreateIndex,
    DropIndex,
}

/// Schema change.
#[derive(Debug, Clone, PartialEq)]
pub struct DdlStatement {
    pub kind: DdlKind,
    pub tables: Vec<TableSegment>,
    pub index: Option<IndexSegment>,
}

/// Statement, by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateView(ViewStatement),
    AlterView(ViewStatement),
    Ddl(DdlStatement),
}

impl Statement {
    pub fn is_select(&self) -> bool {
        matches!(self, Self::Select(_))
    }

    /// `INSERT`, `UPDATE` or `DELETE`.
    pub fn is_dml(&self) -> bool {
        matches!(self, Self::Insert(_) | Self::Update(_) | Self::Delete(_))
    }

    pub fn is_ddl(&self) -> bool {
        matches!(self, Self::Ddl(_) | Self::CreateView(_) | Self::AlterView(_))
    }

    /// Top-level `SELECT`, if this is one.
    pub fn select(&self) -> Option<&SelectStatement> {
        match self {
            Self::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn insert(&self) -> Option<&InsertStatement> {
        match self {
            Self::Insert(insert) => Some(insert),
            _ => None,
        }
    }

    /// Collect every nested part of the statement.
    pub fn collect(&self) -> Collector<'_> {
        Collector::new(self)
    }

    /// Distinct logical table names, in order of appearance.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = vec![];
        for table in self.collect().tables {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&table.name)) {
                names.push(table.name.clone());
            }
        }
        names
    }
}
