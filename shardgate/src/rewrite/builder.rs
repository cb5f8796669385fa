//! SQL assembly from the original text and sorted tokens.

use super::Token;
use crate::router::{RouteContext, RouteUnit};

/// Splices rendered tokens into the original SQL.
#[derive(Debug)]
pub struct SqlBuilder<'a> {
    sql: &'a str,
    tokens: &'a [Token],
}

impl<'a> SqlBuilder<'a> {
    /// `tokens` must be sorted and non-overlapping.
    pub fn new(sql: &'a str, tokens: &'a [Token]) -> Self {
        Self { sql, tokens }
    }

    pub fn build(&self, unit: &RouteUnit, route: &RouteContext) -> String {
        let mut result = String::with_capacity(self.sql.len());
        let mut cursor = 0;

        for token in self.tokens {
            if let Some(text) = self.sql.get(cursor..token.start) {
                result.push_str(text);
            }
            result.push_str(&token.render(unit, route));
            cursor = cursor.max(token.end);
        }

        if let Some(rest) = self.sql.get(cursor..) {
            result.push_str(rest);
        }

        result
    }
}
