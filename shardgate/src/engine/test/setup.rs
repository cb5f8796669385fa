//! Rules and statements for engine tests.
//!
//! Statements are written by hand against their SQL text; `Sql` finds the
//! offsets.

use std::sync::Arc;

use shardgate_config::Config;

use crate::config::Rules;
use crate::engine::{Engine, ExecutionContext, QueryContextBuilder};
use crate::statement::*;
use crate::Error;

/// One data source, `t_order` and `t_order_item` bound, four tables each.
pub const SINGLE: &str = r#"
binding_tables = [["t_order", "t_order_item"]]
broadcast_tables = ["t_config"]

[general]
max_route_units = 64

[[data_sources]]
name = "ds_0"

[[sharding_tables]]
name = "t_order"
actual_data_nodes = "ds_0.t_order_${0..3}"
table_strategy = { type = "standard", column = "order_id", algorithm = "t_mod" }
key_generate_strategy = { column = "order_id", generator = "snowflake" }

[[sharding_tables]]
name = "t_order_item"
actual_data_nodes = "ds_0.t_order_item_${0..3}"
table_strategy = { type = "standard", column = "order_id", algorithm = "t_mod" }
key_generate_strategy = { column = "item_id", generator = "snowflake" }

[[sharding_tables]]
name = "t_other"
actual_data_nodes = "ds_0.t_other_${0..3}"
table_strategy = { type = "standard", column = "other_id", algorithm = "t_mod" }

[[sharding_algorithms]]
name = "t_mod"
type = "MOD"
props = { sharding-count = 4 }

[[key_generators]]
name = "snowflake"
type = "SNOWFLAKE"
"#;

/// Two data sources, `t_user` encrypted and unsharded.
pub const ENCRYPT: &str = r#"
[general]
default_data_source = "ds_0"

[[data_sources]]
name = "ds_0"

[[data_sources]]
name = "ds_1"

[[sharding_tables]]
name = "t_order"
actual_data_nodes = "ds_${0..1}.t_order_${0..1}"
database_strategy = { type = "standard", column = "user_id", algorithm = "ds_mod" }
table_strategy = { type = "standard", column = "order_id", algorithm = "t_mod" }

[[sharding_algorithms]]
name = "ds_mod"
type = "MOD"
props = { sharding-count = 2 }

[[sharding_algorithms]]
name = "t_mod"
type = "MOD"
props = { sharding-count = 2 }

[[encryptors]]
name = "aes"
type = "AES"
props = { aes-key-value = "123456abc" }

[[encryptors]]
name = "md5"
type = "MD5"

[[encrypt_tables]]
name = "t_user"

[[encrypt_tables.columns]]
name = "pwd"
cipher_column = "pwd_cipher"
encryptor = "aes"

[[encrypt_tables.columns]]
name = "name"
cipher_column = "name_cipher"
assisted_query_column = "name_assisted"
encryptor = "aes"
assisted_query_encryptor = "md5"
"#;

pub fn engine(config: &str) -> Engine {
    let config: Config = config.parse().unwrap();
    Engine::new(Arc::new(Rules::new(&config).unwrap()))
}

pub fn engine_with(config: &str, change: impl FnOnce(&mut Config)) -> Engine {
    let mut config: Config = config.parse().unwrap();
    change(&mut config);
    Engine::new(Arc::new(Rules::new(&config).unwrap()))
}

pub fn process(
    engine: &Engine,
    sql: &Sql,
    statement: Statement,
    parameters: Vec<Value>,
) -> Result<ExecutionContext, Error> {
    let query = QueryContextBuilder::default()
        .sql(sql.text)
        .statement(statement)
        .parameters(parameters)
        .build()
        .unwrap();
    engine.process(&query)
}

/// Actual SQL of every unit.
pub fn sqls(context: &ExecutionContext) -> Vec<&str> {
    context
        .units
        .iter()
        .map(|u| u.sql_unit.sql.as_str())
        .collect()
}

/// SQL text and helpers building segments located in it.
#[derive(Debug, Clone, Copy)]
pub struct Sql {
    pub text: &'static str,
}

impl Sql {
    pub fn new(text: &'static str) -> Self {
        Self { text }
    }

    /// `n`th occurrence of `needle`, not part of a longer identifier.
    pub fn span(&self, needle: &str, n: usize) -> Span {
        let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
        let bounded = needle.chars().next().is_some_and(word);

        self.text
            .match_indices(needle)
            .filter(|(start, _)| {
                if !bounded {
                    return true;
                }
                let end = start + needle.len();
                let before = self.text[..*start].chars().next_back();
                let after = self.text[end..].chars().next();
                !before.is_some_and(word) && !after.is_some_and(word)
            })
            .nth(n)
            .map(|(start, _)| Span::new(start, start + needle.len() - 1))
            .unwrap_or_else(|| panic!("\"{}\" #{} not in \"{}\"", needle, n, self.text))
    }

    pub fn table(&self, name: &str, n: usize) -> TableSegment {
        TableSegment::new(name, self.span(name, n))
    }

    pub fn aliased(&self, name: &str, alias: &str, n: usize) -> TableSegment {
        self.table(name, n).alias(alias)
    }

    pub fn column(&self, name: &str, n: usize) -> ColumnSegment {
        ColumnSegment::new(name, self.span(name, n))
    }

    /// `owner.name`.
    pub fn owned(&self, owner: &str, name: &str, n: usize) -> ColumnSegment {
        let full = self.span(&format!("{}.{}", owner, name), n);
        ColumnSegment::new(name, Span::new(full.start + owner.len() + 1, full.stop))
            .owner(owner, Span::new(full.start, full.start + owner.len() - 1))
    }

    pub fn col(&self, name: &str, n: usize) -> Expression {
        Expression::Column(self.column(name, n))
    }

    pub fn int(&self, value: i64, n: usize) -> Expression {
        Expression::Literal {
            value: Value::Integer(value),
            span: self.span(&value.to_string(), n),
        }
    }

    pub fn string(&self, value: &str, n: usize) -> Expression {
        Expression::Literal {
            value: Value::from(value),
            span: self.span(&format!("'{}'", value), n),
        }
    }

    /// `n`th parameter marker, bound to parameter `n`.
    pub fn param(&self, n: usize) -> Expression {
        Expression::Parameter {
            index: n,
            span: self.span("?", n),
        }
    }

    pub fn compare(&self, left: Expression, operator: &str, right: Expression) -> Expression {
        Expression::binary(left, Operator::from(operator), right)
    }

    pub fn eq(&self, left: Expression, right: Expression) -> Expression {
        self.compare(left, "=", right)
    }

    /// `left IN (items)`.
    pub fn in_list(&self, left: Expression, items: Vec<Expression>, not: bool) -> Expression {
        let first = items.first().map(|i| i.span()).unwrap_or_default();
        let last = items.last().map(|i| i.span()).unwrap_or_default();
        let open = self.text[..first.start].rfind('(').unwrap();
        let close = last.end() + self.text[last.end()..].find(')').unwrap();
        let span = Span::new(left.span().start, close);

        Expression::In {
            left: Box::new(left),
            right: Box::new(Expression::List {
                items,
                span: Span::new(open, close),
            }),
            not,
            span,
        }
    }

    pub fn between(&self, left: Expression, low: Expression, high: Expression) -> Expression {
        let span = Span::new(left.span().start, high.span().stop);
        Expression::Between {
            left: Box::new(left),
            low: Box::new(low),
            high: Box::new(high),
            not: false,
            span,
        }
    }

    pub fn where_clause(&self, expression: Expression) -> Option<WhereSegment> {
        let span = expression.span();
        Some(WhereSegment { expression, span })
    }

    /// Projection list between `SELECT` and the first ` FROM`.
    pub fn projections(&self, items: Vec<Projection>) -> ProjectionsSegment {
        let start = self.span("SELECT", 0).end() + 1;
        let stop = self.text.find(" FROM").unwrap() - 1;
        ProjectionsSegment {
            items,
            distinct: false,
            span: Span::new(start, stop),
        }
    }

    /// `SELECT *`.
    pub fn star(&self) -> ProjectionsSegment {
        let span = Span::find(self.text, "*", self.span("SELECT", 0).end()).unwrap();
        self.projections(vec![Projection::Shorthand { owner: None, span }])
    }

    /// `ORDER BY` or `GROUP BY` over columns, ascending.
    pub fn order_by(&self, keyword: &str, columns: Vec<ColumnSegment>) -> Option<OrderBySegment> {
        let start = self.span(keyword, 0).start;
        let stop = columns.last().map(|c| c.span.stop).unwrap_or(start);
        Some(OrderBySegment {
            items: columns
                .into_iter()
                .map(|c| OrderByItem::column(c, Direction::Asc))
                .collect(),
            span: Span::new(start, stop),
        })
    }

    /// `LIMIT` / `OFFSET` values, literals or markers.
    pub fn limit(&self, row_count: Option<Expression>, offset: Option<Expression>) -> Option<LimitSegment> {
        let segment = |expression: Expression| match expression {
            Expression::Literal {
                value: Value::Integer(value),
                span,
            } => PaginationValueSegment {
                value: PaginationValue::Literal(value),
                span,
            },
            Expression::Parameter { index, span } => PaginationValueSegment {
                value: PaginationValue::Parameter(index),
                span,
            },
            other => panic!("not a pagination value: {:?}", other),
        };
        Some(LimitSegment {
            offset: offset.map(segment),
            row_count: row_count.map(segment),
        })
    }

    /// `INSERT INTO table (columns) VALUES (...), ...` with simple values:
    /// integers, quoted strings, `NULL` and `?`.
    pub fn insert(&self, table: &str, columns: &[&str]) -> InsertStatement {
        let table = self.table(table, 0);
        let groups = self.groups(table.span.end());
        let (column_list, rows) = groups.split_first().unwrap();

        let columns = InsertColumnsSegment {
            columns: columns
                .iter()
                .map(|name| {
                    let span = Span::find(self.text, name, column_list.start).unwrap();
                    ColumnSegment::new(name, span)
                })
                .collect(),
            span: *column_list,
        };

        let values = rows
            .iter()
            .map(|row| InsertValuesSegment {
                values: self.values(*row),
                span: *row,
            })
            .collect();

        InsertStatement {
            table,
            columns: Some(columns),
            values,
            select: None,
        }
    }

    /// Top-level parenthesized groups after `from`.
    fn groups(&self, from: usize) -> Vec<Span> {
        let mut groups = vec![];
        let mut depth = 0;
        let mut start = 0;
        let mut quoted = false;

        for (i, c) in self.text.char_indices().skip(from) {
            match c {
                '\'' => quoted = !quoted,
                '(' if !quoted => {
                    if depth == 0 {
                        start = i;
                    }
                    depth += 1;
                }
                ')' if !quoted => {
                    depth -= 1;
                    if depth == 0 {
                        groups.push(Span::new(start, i));
                    }
                }
                _ => (),
            }
        }

        groups
    }

    fn values(&self, row: Span) -> Vec<Expression> {
        let mut values = vec![];
        let mut offset = row.start + 1;

        for item in self.text[row.start + 1..row.stop].split(',') {
            let trimmed = item.trim();
            let start = offset + item.find(trimmed).unwrap_or(0);
            let span = Span::new(start, start + trimmed.len() - 1);
            offset += item.len() + 1;

            let expression = if trimmed == "?" {
                Expression::Parameter {
                    index: self.text[..start].matches('?').count(),
                    span,
                }
            } else if let Some(text) = trimmed.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
                Expression::Literal {
                    value: Value::from(text),
                    span,
                }
            } else if trimmed.eq_ignore_ascii_case("null") {
                Expression::Literal {
                    value: Value::Null,
                    span,
                }
            } else {
                Expression::Literal {
                    value: Value::Integer(trimmed.parse().unwrap()),
                    span,
                }
            };
            values.push(expression);
        }

        values
    }
}
