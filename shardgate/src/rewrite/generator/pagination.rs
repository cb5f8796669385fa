//! Pagination over-fetch.
//!
//! Every unit is asked for rows from the first one up to the last one needed,
//! so the merged result can be trimmed to the original page.

use tracing::debug;

use crate::rewrite::{Error, ParameterBuilder, RewriteContext, Token, TokenKind};
use crate::statement::{PaginationValue, Value};

pub fn generate(
    context: &RewriteContext,
    builder: &mut ParameterBuilder,
) -> Result<Vec<Token>, Error> {
    let Some(ref pagination) = context.pagination else {
        return Ok(vec![]);
    };
    if !context.multi_unit() {
        return Ok(vec![]);
    }

    let mut tokens = vec![];

    if let Some(offset) = pagination.offset {
        match offset.value {
            PaginationValue::Literal(_) => tokens.push(Token::new(
                offset.span.start,
                offset.span.end(),
                TokenKind::Offset { value: 0 },
            )),
            PaginationValue::Parameter(index) => builder.replace(index, Value::Integer(0)),
        }
    }

    if let Some(row_count) = pagination.row_count {
        let revised = pagination.revised_row_count(context.parameters)?;
        debug!("row count revised to {}", revised);

        match row_count.value {
            PaginationValue::Literal(_) => tokens.push(Token::new(
                row_count.span.start,
                row_count.span.end(),
                TokenKind::RowCount { value: revised },
            )),
            PaginationValue::Parameter(index) => {
                builder.replace(index, Value::Integer(revised))
            }
        }
    }

    Ok(tokens)
}
