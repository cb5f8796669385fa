//! `INSERT` column list and `VALUES` rows: generated keys, encrypted
//! columns and rows split between units.

use super::{encrypt_in_place, plaintext};
use crate::encrypt::EncryptColumnRule;
use crate::rewrite::{Error, ParameterBuilder, RewriteContext, Token, TokenKind};
use crate::statement::Statement;

pub fn generate(
    context: &RewriteContext,
    builder: &mut ParameterBuilder,
) -> Result<Vec<Token>, Error> {
    let Statement::Insert(insert) = context.statement else {
        return Ok(vec![]);
    };
    let Some(ref columns) = insert.columns else {
        return Ok(vec![]);
    };
    let table = &insert.table.name;

    let encrypted: Vec<(usize, &EncryptColumnRule)> = match context.encrypt.table(table) {
        Some(rule) => columns
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| rule.column(&c.name).map(|r| (i, r)))
            .collect(),
        None => vec![],
    };
    let generated = context.route.generated_keys.as_ref();

    let mut tokens = vec![];
    // Before the closing parenthesis.
    let append_at = columns.span.stop;

    if let Some(generated) = generated {
        tokens.push(Token::insert(
            append_at,
            TokenKind::GeneratedKey {
                column: generated.column.clone(),
            },
        ));
    }

    for (i, rule) in &encrypted {
        let column = &columns.columns[*i];
        tokens.push(Token::new(
            column.span.start,
            column.span.end(),
            TokenKind::EncryptColumnName {
                column: rule.cipher_column.clone(),
            },
        ));
    }

    let assisted: Vec<String> = encrypted
        .iter()
        .filter_map(|(_, rule)| rule.assisted_query_column.clone())
        .collect();
    if !assisted.is_empty() {
        tokens.push(Token::insert(append_at, TokenKind::Items { items: assisted }));
    }

    let split = insert.values.len() > 1 && context.multi_unit();
    let Some(values_span) = insert.values_span() else {
        return Ok(tokens);
    };
    if !split && generated.is_none() && encrypted.is_empty() {
        return Ok(tokens);
    }

    let mut rows = vec![];
    for (row, values) in insert.values.iter().enumerate() {
        let mut items = vec![];

        for (i, expression) in values.values.iter().enumerate() {
            let rendered = match encrypted.iter().find(|(column, _)| *column == i) {
                Some((_, rule)) => encrypt_in_place(
                    expression,
                    rule.encryptor.as_ref(),
                    context.parameters,
                    builder,
                )?
                .ok_or_else(|| unsupported(table, rule, "non-literal value"))?,
                None => {
                    let span = expression.span();
                    context.text(span.start, span.end()).to_string()
                }
            };
            items.push(rendered);
        }

        if let Some(key) = generated.and_then(|g| g.values.get(row)) {
            if context.parameters.is_empty() {
                items.push(key.to_string());
            } else {
                items.push("?".into());
                builder.add_to_row(row, key.clone());
            }
        }

        for (i, rule) in &encrypted {
            let Some(expression) = values.values.get(*i) else {
                continue;
            };
            let Some((value, index)) = plaintext(expression, context.parameters)? else {
                continue;
            };
            let Some((_, assisted)) = rule.assisted(value)? else {
                continue;
            };
            match index {
                Some(_) => {
                    items.push("?".into());
                    builder.add_to_row(row, assisted);
                }
                None => items.push(assisted.to_string()),
            }
        }

        rows.push(format!("({})", items.join(", ")));
    }

    tokens.push(Token::new(
        values_span.start,
        values_span.end(),
        TokenKind::MultipleInsertValues {
            table: table.clone(),
            rows,
        },
    ));

    Ok(tokens)
}

fn unsupported(table: &str, rule: &EncryptColumnRule, operator: &str) -> Error {
    Error::UnsupportedEncryptPredicate {
        table: table.to_string(),
        column: rule.logic_column.clone(),
        operator: operator.to_string(),
    }
}
