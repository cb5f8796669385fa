//! Token generators.
//!
//! Each generator looks at the statement and rules on its own and returns
//! the tokens it needs. Parameter changes go through the builder.

pub mod encrypt;
pub mod insert;
pub mod pagination;
pub mod projection;
pub mod table;

use super::{Error, ParameterBuilder, RewriteContext, Token};
use crate::encrypt::Encryptor;
use crate::statement::{Expression, Value};

/// Run every generator.
pub fn generate(
    context: &RewriteContext,
    builder: &mut ParameterBuilder,
) -> Result<Vec<Token>, Error> {
    let mut tokens = table::generate(context);
    tokens.extend(insert::generate(context, builder)?);
    tokens.extend(encrypt::generate(context, builder)?);
    tokens.extend(projection::generate(context));
    tokens.extend(pagination::generate(context, builder)?);
    Ok(tokens)
}

/// Plaintext of a literal or a bound parameter.
fn plaintext<'a>(
    expression: &'a Expression,
    parameters: &'a [Value],
) -> Result<Option<(&'a Value, Option<usize>)>, Error> {
    match expression {
        Expression::Literal { value, .. } => Ok(Some((value, None))),
        Expression::Parameter { index, .. } => parameters
            .get(*index)
            .map(|value| Some((value, Some(*index))))
            .ok_or(Error::MissingParameter(*index)),
        _ => Ok(None),
    }
}

/// Encrypt a literal in place, or replace the parameter with its encrypted value.
/// `None` if the expression is neither.
fn encrypt_in_place(
    expression: &Expression,
    encryptor: &dyn Encryptor,
    parameters: &[Value],
    builder: &mut ParameterBuilder,
) -> Result<Option<String>, Error> {
    let Some((value, index)) = plaintext(expression, parameters)? else {
        return Ok(None);
    };
    let encrypted = encryptor.encrypt(value)?;

    match index {
        Some(index) => {
            builder.replace(index, encrypted);
            Ok(Some("?".into()))
        }
        None => Ok(Some(encrypted.to_string())),
    }
}
