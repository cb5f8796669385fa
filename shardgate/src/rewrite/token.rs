//! Rewrite tokens.
//!
//! A token replaces the SQL text between `start` and `end`. Tokens with
//! `start == end` insert text.

use std::fmt::Display;

use super::Error;
use crate::router::{RouteContext, RouteUnit};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Logical table name, as written.
    Table { logic_table: String, original: String },
    /// Index name of a sharded table, made unique per actual table.
    Index { index: String, logic_table: String },
    /// Generated key column appended to an `INSERT` column list.
    GeneratedKey { column: String },
    /// Items appended to a column or projection list.
    Items { items: Vec<String> },
    /// `VALUES` rows, rendered per unit.
    MultipleInsertValues { table: String, rows: Vec<String> },
    /// Predicate on an encrypted column.
    WhereEncryptColumn {
        column: String,
        operator: String,
        values: Vec<String>,
        list: bool,
    },
    /// Assignment to an encrypted column.
    UpdateEncryptAssistedItem {
        cipher_column: String,
        cipher_value: String,
        assisted: Option<(String, String)>,
    },
    /// Plaintext column name replaced with its cipher column.
    EncryptColumnName { column: String },
    /// Projection of an encrypted column, aliased to its plaintext name.
    EncryptProjection { cipher_column: String, alias: String },
    /// `ORDER BY` appended after `GROUP BY`.
    OrderBy { items: Vec<String> },
    Offset { value: i64 },
    RowCount { value: i64 },
}

impl TokenKind {
    /// Order of tokens starting at the same offset.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Table { .. } => 0,
            Self::Index { .. } => 1,
            Self::GeneratedKey { .. } => 2,
            Self::Items { .. } => 3,
            Self::MultipleInsertValues { .. } => 4,
            Self::WhereEncryptColumn { .. } => 5,
            Self::UpdateEncryptAssistedItem { .. } => 6,
            Self::OrderBy { .. } => 7,
            Self::Offset { .. } => 8,
            Self::RowCount { .. } => 9,
            Self::EncryptColumnName { .. } => 10,
            Self::EncryptProjection { .. } => 11,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self { start, end, kind }
    }

    /// Insert text at `at`.
    pub fn insert(at: usize, kind: TokenKind) -> Self {
        Self::new(at, at, kind)
    }

    /// Replacement text for a route unit.
    pub fn render(&self, unit: &RouteUnit, route: &RouteContext) -> String {
        match &self.kind {
            TokenKind::Table {
                logic_table,
                original,
            } => match unit.actual_table(logic_table) {
                Some(actual) => quote_like(original, actual),
                None => original.clone(),
            },

            TokenKind::Index { index, logic_table } => match unit.actual_table(logic_table) {
                Some(actual) if !actual.eq_ignore_ascii_case(logic_table) => {
                    format!("{}_{}", index, actual)
                }
                _ => index.clone(),
            },

            TokenKind::GeneratedKey { column } => format!(", {}", column),

            TokenKind::Items { items } => items.iter().map(|i| format!(", {}", i)).collect(),

            TokenKind::MultipleInsertValues { table, rows } => {
                match route.rows_for(unit, table) {
                    Some(selected) => selected
                        .iter()
                        .filter_map(|row| rows.get(*row))
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    None => rows.join(", "),
                }
            }

            TokenKind::WhereEncryptColumn {
                column,
                operator,
                values,
                list,
            } => {
                if *list {
                    format!("{} {} ({})", column, operator, values.join(", "))
                } else {
                    format!("{} {} {}", column, operator, values.join(", "))
                }
            }

            TokenKind::UpdateEncryptAssistedItem {
                cipher_column,
                cipher_value,
                assisted,
            } => match assisted {
                Some((column, value)) => {
                    format!("{} = {}, {} = {}", cipher_column, cipher_value, column, value)
                }
                None => format!("{} = {}", cipher_column, cipher_value),
            },

            TokenKind::EncryptColumnName { column } => column.clone(),

            TokenKind::EncryptProjection {
                cipher_column,
                alias,
            } => format!("{} AS {}", cipher_column, alias),

            TokenKind::OrderBy { items } => format!(" ORDER BY {}", items.join(", ")),

            TokenKind::Offset { value } | TokenKind::RowCount { value } => value.to_string(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} [{}, {})", self.kind, self.start, self.end)
    }
}

/// Sort tokens by offset and priority, rejecting overlaps.
pub fn sort(mut tokens: Vec<Token>) -> Result<Vec<Token>, Error> {
    tokens.sort_by_key(|t| (t.start, t.kind.priority()));

    for pair in tokens.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if second.start < first.end {
            return Err(Error::TokenOverlap {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
    }

    Ok(tokens)
}

/// `actual`, quoted the way `original` is.
fn quote_like(original: &str, actual: &str) -> String {
    match (original.chars().next(), original.chars().last()) {
        (Some(open @ ('`' | '"' | '[')), Some(close)) if original.len() > 1 => {
            format!("{}{}{}", open, actual, close)
        }
        _ => actual.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::router::RouteType;

    fn route() -> RouteContext {
        RouteContext::new(
            RouteType::Standard,
            vec![RouteUnit::new("ds_0").table("t_order", "t_order_1")],
        )
        .unwrap()
    }

    fn table(start: usize, end: usize) -> Token {
        Token::new(
            start,
            end,
            TokenKind::Table {
                logic_table: "t_order".into(),
                original: "t_order".into(),
            },
        )
    }

    #[test]
    fn test_sorted_by_offset_then_priority() {
        let tokens = vec![
            Token::insert(30, TokenKind::Items { items: vec!["a".into()] }),
            table(14, 21),
            Token::insert(30, TokenKind::GeneratedKey { column: "id".into() }),
        ];
        let sorted = sort(tokens).unwrap();
        assert_eq!(sorted[0].start, 14);
        assert!(matches!(sorted[1].kind, TokenKind::GeneratedKey { .. }));
        assert!(matches!(sorted[2].kind, TokenKind::Items { .. }));
    }

    #[test]
    fn test_overlap() {
        let err = sort(vec![table(14, 21), table(20, 25)]).unwrap_err();
        assert!(matches!(err, Error::TokenOverlap { .. }));
    }

    #[test]
    fn test_render_quoted_table() {
        let route = route();
        let token = Token::new(
            0,
            9,
            TokenKind::Table {
                logic_table: "t_order".into(),
                original: "`t_order`".into(),
            },
        );
        assert_eq!(token.render(&route.units[0], &route), "`t_order_1`");
        assert_eq!(table(0, 7).render(&route.units[0], &route), "t_order_1");
    }

    #[test]
    fn test_render_index() {
        let route = route();
        let token = Token::new(
            0,
            9,
            TokenKind::Index {
                index: "idx_user".into(),
                logic_table: "t_order".into(),
            },
        );
        assert_eq!(token.render(&route.units[0], &route), "idx_user_t_order_1");
    }

    #[test]
    fn test_render_encrypt_in() {
        let route = route();
        let token = Token::new(
            0,
            10,
            TokenKind::WhereEncryptColumn {
                column: "pwd_cipher".into(),
                operator: "IN".into(),
                values: vec!["'a'".into(), "'b'".into()],
                list: true,
            },
        );
        assert_eq!(
            token.render(&route.units[0], &route),
            "pwd_cipher IN ('a', 'b')"
        );
    }
}
