//! Encrypted columns in predicates, assignments and projections.

use tracing::trace;

use super::{encrypt_in_place, plaintext};
use crate::encrypt::{EncryptColumnRule, EncryptRule};
use crate::rewrite::{Error, ParameterBuilder, RewriteContext, Token, TokenKind};
use crate::statement::{
    ColumnSegment, Expression, Operator, Projection, Statement, TablesContext, UpdateStatement,
};

pub fn generate(
    context: &RewriteContext,
    builder: &mut ParameterBuilder,
) -> Result<Vec<Token>, Error> {
    if context.encrypt.is_empty() {
        return Ok(vec![]);
    }

    let mut tokens = vec![];
    predicates(context, builder, &mut tokens)?;
    projections(context, &mut tokens);
    if let Statement::Update(update) = context.statement {
        assignments(update, context, builder, &mut tokens)?;
    }

    trace!("{} encrypt tokens", tokens.len());

    Ok(tokens)
}

fn predicates(
    context: &RewriteContext,
    builder: &mut ParameterBuilder,
    tokens: &mut Vec<Token>,
) -> Result<(), Error> {
    let collector = context.statement.collect();
    let tables = TablesContext::new(collector.tables.iter().copied());

    for predicate in &collector.predicates {
        let mut expressions = vec![];
        predicate.walk(&mut |expr| expressions.push(expr));

        for expression in expressions {
            match expression {
                Expression::Binary {
                    left,
                    operator,
                    right,
                    span,
                } if !operator.logical() => {
                    // Encrypted columns go on the left.
                    if let Some((table, _, rule)) = rule_of(right, &tables, context.encrypt) {
                        return Err(unsupported(table, rule, &operator.to_string()));
                    }
                    let Some((table, column, rule)) = rule_of(left, &tables, context.encrypt)
                    else {
                        continue;
                    };

                    match operator {
                        Operator::Eq | Operator::NotEq => {
                            let (query_column, encryptor) = rule.query_column();
                            let value = encrypt_in_place(
                                right,
                                encryptor,
                                context.parameters,
                                builder,
                            )?
                            .ok_or_else(|| unsupported(table, rule, &operator.to_string()))?;

                            tokens.push(Token::new(
                                column.span.start,
                                span.end(),
                                TokenKind::WhereEncryptColumn {
                                    column: query_column.to_string(),
                                    operator: operator.to_string(),
                                    values: vec![value],
                                    list: false,
                                },
                            ));
                        }

                        // IS NULL / IS NOT NULL
                        Operator::Other(op) if op.starts_with("IS") => {
                            tokens.push(Token::new(
                                column.span.start,
                                column.span.end(),
                                TokenKind::EncryptColumnName {
                                    column: rule.cipher_column.clone(),
                                },
                            ));
                        }

                        _ => return Err(unsupported(table, rule, &operator.to_string())),
                    }
                }

                Expression::In {
                    left,
                    right,
                    not,
                    span,
                } => {
                    let Some((table, column, rule)) = rule_of(left, &tables, context.encrypt) else {
                        continue;
                    };
                    let operator = if *not { "NOT IN" } else { "IN" };
                    let Expression::List { items, .. } = right.as_ref() else {
                        return Err(unsupported(table, rule, operator));
                    };

                    let (query_column, encryptor) = rule.query_column();
                    let mut values = vec![];
                    for item in items {
                        values.push(
                            encrypt_in_place(item, encryptor, context.parameters, builder)?
                                .ok_or_else(|| unsupported(table, rule, operator))?,
                        );
                    }

                    tokens.push(Token::new(
                        column.span.start,
                        span.end(),
                        TokenKind::WhereEncryptColumn {
                            column: query_column.to_string(),
                            operator: operator.to_string(),
                            values,
                            list: true,
                        },
                    ));
                }

                Expression::Between { left, not, .. } => {
                    if let Some((table, _, rule)) = rule_of(left, &tables, context.encrypt) {
                        let operator = if *not { "NOT BETWEEN" } else { "BETWEEN" };
                        return Err(unsupported(table, rule, operator));
                    }
                }

                _ => (),
            }
        }
    }

    Ok(())
}

/// Encrypted column an expression refers to, with its table.
fn rule_of<'a, 'r>(
    expression: &'a Expression,
    tables: &TablesContext<'a>,
    encrypt: &'r EncryptRule,
) -> Option<(&'a str, &'a ColumnSegment, &'r EncryptColumnRule)> {
    let column = expression.column()?;
    let table = tables.resolve(column, |t, c| encrypt.column(t, c).is_some())?;
    encrypt
        .column(table, &column.name)
        .map(|rule| (table, column, rule))
}

/// `SELECT pwd` reads `pwd_cipher AS pwd`.
fn projections(context: &RewriteContext, tokens: &mut Vec<Token>) {
    let collector = context.statement.collect();

    for select in &collector.selects {
        let tables = TablesContext::from_select(select);

        for projection in &select.projections.items {
            let Projection::Column { column, alias } = projection else {
                continue;
            };
            let Some(rule) = tables
                .resolve(column, |t, c| context.encrypt.column(t, c).is_some())
                .and_then(|table| context.encrypt.column(table, &column.name))
            else {
                continue;
            };

            let kind = match alias {
                Some(_) => TokenKind::EncryptColumnName {
                    column: rule.cipher_column.clone(),
                },
                None => TokenKind::EncryptProjection {
                    cipher_column: rule.cipher_column.clone(),
                    alias: column.name.clone(),
                },
            };
            tokens.push(Token::new(column.span.start, column.span.end(), kind));
        }
    }
}

/// `SET pwd = 'x'` writes the cipher and assisted query columns.
fn assignments(
    update: &UpdateStatement,
    context: &RewriteContext,
    builder: &mut ParameterBuilder,
    tokens: &mut Vec<Token>,
) -> Result<(), Error> {
    let table = &update.table.name;
    let Some(table_rule) = context.encrypt.table(table) else {
        return Ok(());
    };

    for assignment in &update.assignments {
        let Some(rule) = table_rule.column(&assignment.column.name) else {
            continue;
        };

        let cipher_value = encrypt_in_place(
            &assignment.value,
            rule.encryptor.as_ref(),
            context.parameters,
            builder,
        )?
        .ok_or_else(|| unsupported(table, rule, "SET"))?;

        let assisted = match plaintext(&assignment.value, context.parameters)? {
            Some((value, index)) => match rule.assisted(value)? {
                Some((column, assisted)) => match index {
                    Some(index) => {
                        builder.add_after(index, assisted);
                        Some((column.to_string(), "?".to_string()))
                    }
                    None => Some((column.to_string(), assisted.to_string())),
                },
                None => None,
            },
            None => None,
        };

        tokens.push(Token::new(
            assignment.span.start,
            assignment.span.end(),
            TokenKind::UpdateEncryptAssistedItem {
                cipher_column: rule.cipher_column.clone(),
                cipher_value,
                assisted,
            },
        ));
    }

    Ok(())
}

fn unsupported(table: &str, rule: &EncryptColumnRule, operator: &str) -> Error {
    Error::UnsupportedEncryptPredicate {
        table: table.to_string(),
        column: rule.logic_column.clone(),
        operator: operator.to_string(),
    }
}
