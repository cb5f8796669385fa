//! Expressions.

use std::fmt::Display;

use super::{ColumnSegment, SelectStatement, Span, Value};

/// Binary operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    Other(String),
}

impl Operator {
    pub fn logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Operator with operands swapped, e.g. `1 < id` becomes `id > 1`.
    pub fn flip(&self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::LtEq => Self::GtEq,
            Self::Gt => Self::Lt,
            Self::GtEq => Self::LtEq,
            other => other.clone(),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Other(op) => op.as_str(),
        };
        write!(f, "{}", op)
    }
}

impl From<&str> for Operator {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "AND" | "&&" => Self::And,
            "OR" | "||" => Self::Or,
            "=" | "==" => Self::Eq,
            "<>" | "!=" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Expression with its location in the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnSegment),
    Literal {
        value: Value,
        span: Span,
    },
    /// Positional parameter marker, e.g. `?`. `index` is zero-based.
    Parameter {
        index: usize,
        span: Span,
    },
    Binary {
        left: Box<Expression>,
        operator: Operator,
        right: Box<Expression>,
        span: Span,
    },
    In {
        left: Box<Expression>,
        right: Box<Expression>,
        not: bool,
        span: Span,
    },
    Between {
        left: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        not: bool,
        span: Span,
    },
    List {
        items: Vec<Expression>,
        span: Span,
    },
    Subquery {
        select: Box<SelectStatement>,
        span: Span,
    },
    /// Anything else: function calls, casts, arithmetic.
    Opaque {
        text: String,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Self::Column(column) => column.full_span(),
            Self::Literal { span, .. }
            | Self::Parameter { span, .. }
            | Self::Binary { span, .. }
            | Self::In { span, .. }
            | Self::Between { span, .. }
            | Self::List { span, .. }
            | Self::Subquery { span, .. }
            | Self::Opaque { span, .. } => *span,
        }
    }

    pub fn column(&self) -> Option<&ColumnSegment> {
        match self {
            Self::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn binary(left: Expression, operator: Operator, right: Expression) -> Self {
        let span = Span::new(left.span().start, right.span().stop);
        Self::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(left, Operator::And, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(left, Operator::Or, right)
    }

    /// Visit this expression and every nested one, depth-first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        f(self);
        match self {
            Self::Binary { left, right, .. } | Self::In { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Self::Between {
                left, low, high, ..
            } => {
                left.walk(f);
                low.walk(f);
                high.walk(f);
            }
            Self::List { items, .. } => {
                for item in items {
                    item.walk(f);
                }
            }
            Self::Column(_)
            | Self::Literal { .. }
            | Self::Parameter { .. }
            | Self::Subquery { .. }
            | Self::Opaque { .. } => (),
        }
    }
}
