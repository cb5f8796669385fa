use crate::encrypt::EncryptRule;
use crate::router::{PaginationContext, RouteContext};
use crate::sharding::ShardingRule;
use crate::statement::{Statement, Value};

/// Everything generators look at.
#[derive(Debug)]
pub struct RewriteContext<'a> {
    pub sql: &'a str,
    pub statement: &'a Statement,
    pub parameters: &'a [Value],
    pub route: &'a RouteContext,
    pub sharding: &'a ShardingRule,
    pub encrypt: &'a EncryptRule,
    pub pagination: Option<PaginationContext>,
}

impl<'a> RewriteContext<'a> {
    /// Results from several units will be merged.
    pub fn multi_unit(&self) -> bool {
        !self.route.is_single()
    }

    /// Original SQL text between two offsets.
    pub fn text(&self, start: usize, end: usize) -> &'a str {
        self.sql.get(start..end).unwrap_or_default()
    }
}
