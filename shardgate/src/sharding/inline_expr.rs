//! Inline expressions.
//!
//! Two uses:
//!
//! 1. Data node inventories: `ds_${0..1}.t_order_${0..3}` or `t_${['a', 'b']}`, expanded
//!    into every combination, leftmost placeholder varying slowest.
//! 2. Algorithm expressions: `t_order_${order_id % 4}`, evaluated against one value.
//!
//! Both `${...}` and `$->{...}` placeholders are accepted.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Error;
use crate::statement::Value;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(?:->)?\{([^}]*)\}").unwrap());
static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d+)\s*\.\.\s*(-?\d+)\s*$").unwrap());
static LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[(.*)\]\s*$").unwrap());
static ARITHMETIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*(?:([%+*/-])\s*(-?\d+))?\s*$").unwrap());

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Placeholder(String),
}

fn parts(expression: &str) -> Vec<Part> {
    let mut parts = vec![];
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(expression) {
        let (Some(all), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if all.start() > last {
            parts.push(Part::Text(expression[last..all.start()].to_string()));
        }
        parts.push(Part::Placeholder(inner.as_str().to_string()));
        last = all.end();
    }

    if last < expression.len() {
        parts.push(Part::Text(expression[last..].to_string()));
    }

    parts
}

/// Split on commas outside of placeholders.
fn split(expression: &str) -> Vec<&str> {
    let mut result = vec![];
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in expression.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                result.push(expression[start..i].trim());
                start = i + 1;
            }
            _ => (),
        }
    }
    result.push(expression[start..].trim());
    result.into_iter().filter(|s| !s.is_empty()).collect()
}

fn invalid(expression: &str, reason: impl ToString) -> Error {
    Error::InlineExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

/// Values of one placeholder: a range or a list.
fn placeholder_values(expression: &str, placeholder: &str) -> Result<Vec<String>, Error> {
    if let Some(captures) = RANGE.captures(placeholder) {
        let start: i64 = captures[1]
            .parse()
            .map_err(|err| invalid(expression, err))?;
        let end: i64 = captures[2]
            .parse()
            .map_err(|err| invalid(expression, err))?;
        if end < start {
            return Err(invalid(expression, "range end is before its start"));
        }
        return Ok((start..=end).map(|i| i.to_string()).collect());
    }

    if let Some(captures) = LIST.captures(placeholder) {
        return Ok(captures[1]
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|item| !item.is_empty())
            .collect());
    }

    Err(invalid(
        expression,
        format!("\"{}\" is neither a range nor a list", placeholder),
    ))
}

/// Expand an inventory expression into every name it describes.
pub fn expand(expression: &str) -> Result<Vec<String>, Error> {
    let mut result = vec![];

    for segment in split(expression) {
        let mut names = vec![String::new()];
        for part in parts(segment) {
            match part {
                Part::Text(text) => names.iter_mut().for_each(|n| n.push_str(&text)),
                Part::Placeholder(placeholder) => {
                    let values = placeholder_values(expression, &placeholder)?;
                    names = names
                        .iter()
                        .flat_map(|n| values.iter().map(move |v| format!("{}{}", n, v)))
                        .collect();
                }
            }
        }
        result.extend(names);
    }

    Ok(result)
}

/// Algorithm expression, e.g. `t_order_${order_id % 4}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    pub fn new(expression: &str) -> Result<Self, Error> {
        let parts = parts(expression);
        for part in &parts {
            if let Part::Placeholder(placeholder) = part {
                if !ARITHMETIC.is_match(placeholder) {
                    return Err(invalid(
                        expression,
                        format!("unsupported placeholder \"{}\"", placeholder),
                    ));
                }
            }
        }

        Ok(Self {
            source: expression.to_string(),
            parts,
        })
    }

    /// Render with `variable` bound to `value`.
    pub fn render(&self, variable: &str, value: &Value) -> Result<String, Error> {
        let mut result = String::new();

        for part in &self.parts {
            match part {
                Part::Text(text) => result.push_str(text),
                Part::Placeholder(placeholder) => {
                    let captures = ARITHMETIC
                        .captures(placeholder)
                        .ok_or_else(|| invalid(&self.source, placeholder))?;

                    if !captures[1].eq_ignore_ascii_case(variable) {
                        return Err(invalid(
                            &self.source,
                            format!("unknown variable \"{}\"", &captures[1]),
                        ));
                    }

                    match (captures.get(2), captures.get(3)) {
                        (Some(op), Some(operand)) => {
                            let operand: i64 = operand
                                .as_str()
                                .parse()
                                .map_err(|err| invalid(&self.source, err))?;
                            let value = value.integer().ok_or_else(|| {
                                invalid(&self.source, format!("{} is not an integer", value))
                            })?;
                            let computed = match op.as_str() {
                                "%" => value.checked_rem_euclid(operand),
                                "/" => value.checked_div_euclid(operand),
                                "+" => Some(value.saturating_add(operand)),
                                "-" => Some(value.saturating_sub(operand)),
                                "*" => Some(value.saturating_mul(operand)),
                                _ => None,
                            }
                            .ok_or_else(|| {
                                invalid(
                                    &self.source,
                                    format!("{} {} {} is undefined", value, op.as_str(), operand),
                                )
                            })?;
                            result.push_str(&computed.to_string());
                        }
                        _ => result.push_str(&value.text()),
                    }
                }
            }
        }

        Ok(result)
    }

    /// Variable the template expects, if any.
    pub fn variable(&self) -> Option<String> {
        self.parts.iter().find_map(|part| match part {
            Part::Placeholder(placeholder) => ARITHMETIC
                .captures(placeholder)
                .map(|captures| captures[1].to_string()),
            Part::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_expand_cartesian() {
        let nodes = expand("ds_${0..1}.t_order_${0..1}").unwrap();
        assert_eq!(
            nodes,
            vec![
                "ds_0.t_order_0",
                "ds_0.t_order_1",
                "ds_1.t_order_0",
                "ds_1.t_order_1"
            ]
        );
    }

    #[test]
    fn test_expand_lists_and_segments() {
        let nodes = expand("ds_${['a','b']}.t_${[1, 3]}, ds_c.t_$->{5..6}").unwrap();
        assert_eq!(
            nodes,
            vec!["ds_a.t_1", "ds_a.t_3", "ds_b.t_1", "ds_b.t_3", "ds_c.t_5", "ds_c.t_6"]
        );
        assert_eq!(expand("ds_0.t_config").unwrap(), vec!["ds_0.t_config"]);
    }

    #[test]
    fn test_expand_invalid() {
        assert!(expand("t_${3..1}").is_err());
        assert!(expand("t_${order_id}").is_err());
    }

    #[test]
    fn test_template() {
        let template = Template::new("t_order_${order_id % 4}").unwrap();
        assert_eq!(template.variable().as_deref(), Some("order_id"));
        assert_eq!(
            template.render("order_id", &Value::Integer(7)).unwrap(),
            "t_order_3"
        );
        assert!(template.render("order_id", &Value::from("abc")).is_err());

        let negative = Template::new("t_${id % -1}").unwrap();
        assert!(negative.render("id", &Value::Integer(i64::MIN)).is_err());
        let zero = Template::new("t_${id / 0}").unwrap();
        assert!(zero.render("id", &Value::Integer(1)).is_err());

        let plain = Template::new("ds_${region}").unwrap();
        assert_eq!(plain.render("region", &Value::from("eu")).unwrap(), "ds_eu");
    }
}
