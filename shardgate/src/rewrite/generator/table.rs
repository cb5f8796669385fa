//! Table, column owner and index names.

use std::collections::HashSet;

use crate::rewrite::{RewriteContext, Token, TokenKind};
use crate::statement::Statement;

pub fn generate(context: &RewriteContext) -> Vec<Token> {
    let collector = context.statement.collect();
    let mut seen = HashSet::new();
    let mut tokens = vec![];

    let rewritten = |name: &str| {
        context.route.units.iter().any(|unit| {
            unit.actual_table(name)
                .is_some_and(|actual| !actual.eq_ignore_ascii_case(name))
        })
    };

    for table in &collector.tables {
        if !rewritten(&table.name) || !seen.insert(table.span.start) {
            continue;
        }
        tokens.push(Token::new(
            table.span.start,
            table.span.end(),
            TokenKind::Table {
                logic_table: table.name.clone(),
                original: context.text(table.span.start, table.span.end()).to_string(),
            },
        ));
    }

    // Owners naming a table rather than an alias.
    for column in &collector.columns {
        let Some(ref owner) = column.owner else {
            continue;
        };
        let aliased = collector.tables.iter().any(|t| {
            t.alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(&owner.name))
        });
        let Some(table) = collector
            .tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(&owner.name))
        else {
            continue;
        };
        if aliased || !rewritten(&table.name) || !seen.insert(owner.span.start) {
            continue;
        }
        tokens.push(Token::new(
            owner.span.start,
            owner.span.end(),
            TokenKind::Table {
                logic_table: table.name.clone(),
                original: context.text(owner.span.start, owner.span.end()).to_string(),
            },
        ));
    }

    if let Statement::Ddl(ddl) = context.statement {
        if let (Some(index), Some(table)) = (&ddl.index, ddl.tables.first()) {
            if rewritten(&table.name) {
                tokens.push(Token::new(
                    index.span.start,
                    index.span.end(),
                    TokenKind::Index {
                        index: index.name.clone(),
                        logic_table: table.name.clone(),
                    },
                ));
            }
        }
    }

    tokens
}
