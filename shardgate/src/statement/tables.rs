//! Resolving column owners to logical tables.

use super::{ColumnSegment, SelectStatement, TableSegment};

/// Tables visible to a query.
#[derive(Debug, Clone, Default)]
pub struct TablesContext<'a> {
    tables: Vec<&'a TableSegment>,
}

impl<'a> TablesContext<'a> {
    pub fn new(tables: impl IntoIterator<Item = &'a TableSegment>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    pub fn from_select(select: &'a SelectStatement) -> Self {
        Self::new(select.simple_tables())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Logical table a column belongs to.
    ///
    /// Qualified columns match a table alias first, then a table name. Unqualified
    /// columns belong to the only table, or to the first table for which `declares`
    /// returns true.
    pub fn resolve(
        &self,
        column: &ColumnSegment,
        declares: impl Fn(&str, &str) -> bool,
    ) -> Option<&'a str> {
        if let Some(ref owner) = column.owner {
            return self
                .tables
                .iter()
                .find(|t| {
                    t.alias
                        .as_deref()
                        .is_some_and(|alias| alias.eq_ignore_ascii_case(&owner.name))
                })
                .or_else(|| {
                    self.tables
                        .iter()
                        .find(|t| t.name.eq_ignore_ascii_case(&owner.name))
                })
                .map(|t| t.name.as_str());
        }

        let mut names = self.tables.iter().map(|t| t.name.as_str());
        if self.distinct_names() == 1 {
            return names.next();
        }

        names.find(|table| declares(table, &column.name))
    }

    fn distinct_names(&self) -> usize {
        let mut names: Vec<&str> = vec![];
        for table in &self.tables {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&table.name)) {
                names.push(&table.name);
            }
        }
        names.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::statement::Span;

    #[test]
    fn test_resolve_alias_and_declared() {
        let order = TableSegment::new("t_order", Span::new(0, 6)).alias("o");
        let item = TableSegment::new("t_order_item", Span::new(10, 21)).alias("i");
        let ctx = TablesContext::new([&order, &item]);

        let qualified = ColumnSegment::new("order_id", Span::new(30, 37)).owner("i", Span::new(28, 28));
        assert_eq!(ctx.resolve(&qualified, |_, _| false), Some("t_order_item"));

        let bare = ColumnSegment::new("user_id", Span::new(40, 46));
        assert_eq!(
            ctx.resolve(&bare, |t, c| t == "t_order" && c == "user_id"),
            Some("t_order")
        );
        assert_eq!(ctx.resolve(&bare, |_, _| false), None);
    }

    #[test]
    fn test_single_table() {
        let order = TableSegment::new("t_order", Span::new(0, 6));
        let ctx = TablesContext::new([&order]);
        let bare = ColumnSegment::new("anything", Span::new(10, 17));
        assert_eq!(ctx.resolve(&bare, |_, _| false), Some("t_order"));
    }
}
