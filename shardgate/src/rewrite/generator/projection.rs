//! Columns merging needs: `ORDER BY` for grouped results and derived
//! projections for sort keys and averages.

use crate::rewrite::{RewriteContext, Token, TokenKind};
use crate::statement::{
    AggregationType, ColumnSegment, OrderByItem, OrderByTarget, Projection, SelectStatement,
    Statement,
};

pub fn generate(context: &RewriteContext) -> Vec<Token> {
    let Statement::Select(select) = context.statement else {
        return vec![];
    };
    if !context.multi_unit() {
        return vec![];
    }

    let mut tokens = vec![];

    if let (Some(group_by), None) = (&select.group_by, &select.order_by) {
        if !group_by.items.is_empty() {
            tokens.push(Token::insert(
                group_by.span.end(),
                TokenKind::OrderBy {
                    items: group_by.items.iter().map(order_by_item).collect(),
                },
            ));
        }
    }

    let items = derived(select);
    if !items.is_empty() {
        tokens.push(Token::insert(
            select.projections.span.end(),
            TokenKind::Items { items },
        ));
    }

    tokens
}

fn order_by_item(item: &OrderByItem) -> String {
    let target = match item.target {
        OrderByTarget::Column(ref column) => column.qualified_name(),
        OrderByTarget::Position(position) => position.to_string(),
        OrderByTarget::Expression(ref expression) => expression.clone(),
    };
    format!("{} {}", target, item.direction)
}

/// Projections to append so every unit returns what the merge sorts and groups by.
fn derived(select: &SelectStatement) -> Vec<String> {
    let mut items = vec![];
    if select.projections.items.is_empty() || select.projections.shorthand() {
        return items;
    }

    let mut added: Vec<&str> = vec![];
    for (clause, prefix) in [
        (&select.order_by, "ORDER_BY_DERIVED"),
        (&select.group_by, "GROUP_BY_DERIVED"),
    ] {
        let mut n = 0;
        for item in clause.iter().flat_map(|c| c.items.iter()) {
            let OrderByTarget::Column(ref column) = item.target else {
                continue;
            };
            if projected(select, column)
                || added.iter().any(|a| a.eq_ignore_ascii_case(&column.name))
            {
                continue;
            }
            items.push(format!("{} AS {}_{}", column.qualified_name(), prefix, n));
            added.push(&column.name);
            n += 1;
        }
    }

    let averages = select.projections.items.iter().filter_map(|p| match p {
        Projection::Aggregation {
            kind: AggregationType::Avg,
            argument,
            ..
        } => Some(argument),
        _ => None,
    });
    for (n, argument) in averages.enumerate() {
        items.push(format!("COUNT({}) AS AVG_DERIVED_COUNT_{}", argument, n));
        items.push(format!("SUM({}) AS AVG_DERIVED_SUM_{}", argument, n));
    }

    items
}

fn projected(select: &SelectStatement, column: &ColumnSegment) -> bool {
    select.projections.items.iter().any(|projection| match projection {
        Projection::Shorthand { owner, .. } => match (owner, &column.owner) {
            (Some(owner), Some(column_owner)) => owner.eq_ignore_ascii_case(&column_owner.name),
            (None, _) => true,
            _ => false,
        },
        Projection::Column {
            column: projected,
            alias,
        } => {
            projected.name.eq_ignore_ascii_case(&column.name)
                || alias
                    .as_deref()
                    .is_some_and(|a| a.eq_ignore_ascii_case(&column.name))
        }
        other => other
            .alias()
            .is_some_and(|a| a.eq_ignore_ascii_case(&column.name)),
    })
}
