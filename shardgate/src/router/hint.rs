//! Routing hints.
//!
//! Hints are supplied by the caller, or written in a C-style comment anywhere
//! in the query:
//!
//! ```text
//! /* SHARDING_HINT: t_order.database_value=1, t_order.table_value=2, data_source=ds_0 */
//! ```

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Error;
use crate::statement::Value;

static HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*\s*SHARDING_HINT:\s*(.*?)\s*\*/").unwrap());
static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:(\w+)\.)?(\w+)\s*=\s*(?:'([^']*)'|"([^"]*)"|([^\s,]+))\s*$"#).unwrap()
});

/// Hint values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HintValues {
    /// Database sharding values per logical table.
    pub database: IndexMap<String, Vec<Value>>,
    /// Table sharding values per logical table.
    pub table: IndexMap<String, Vec<Value>>,
    /// Route to this data source only.
    pub data_source: Option<String>,
}

impl HintValues {
    pub fn is_empty(&self) -> bool {
        self.database.is_empty() && self.table.is_empty() && self.data_source.is_none()
    }

    pub fn add_database_value(&mut self, table: &str, value: impl Into<Value>) -> &mut Self {
        self.database
            .entry(table.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    pub fn add_table_value(&mut self, table: &str, value: impl Into<Value>) -> &mut Self {
        self.table
            .entry(table.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    pub fn set_data_source(&mut self, data_source: impl ToString) -> &mut Self {
        self.data_source = Some(data_source.to_string());
        self
    }

    pub fn database_values(&self, table: &str) -> Option<&[Value]> {
        self.database.get(&table.to_lowercase()).map(|v| v.as_slice())
    }

    pub fn table_values(&self, table: &str) -> Option<&[Value]> {
        self.table.get(&table.to_lowercase()).map(|v| v.as_slice())
    }

    /// Parse hints from query comments. `None` if the query has none.
    pub fn from_comment(query: &str) -> Result<Option<Self>, Error> {
        let mut hints = HintValues::default();
        let mut found = false;

        for captures in HINT.captures_iter(query) {
            found = true;
            let Some(body) = captures.get(1) else {
                continue;
            };

            for assignment in body.as_str().split(',').filter(|a| !a.trim().is_empty()) {
                let captures = ASSIGNMENT
                    .captures(assignment)
                    .ok_or_else(|| Error::Hint(format!("can't parse \"{}\"", assignment.trim())))?;

                let owner = captures.get(1).map(|m| m.as_str());
                let key = &captures[2];
                let value = captures
                    .get(3)
                    .or_else(|| captures.get(4))
                    .map(|m| Value::String(m.as_str().to_string()))
                    .or_else(|| captures.get(5).map(|m| literal(m.as_str())))
                    .unwrap_or_default();

                match (owner, key.to_lowercase().as_str()) {
                    (Some(table), "database_value") => {
                        hints.add_database_value(table, value);
                    }
                    (Some(table), "table_value") => {
                        hints.add_table_value(table, value);
                    }
                    (None, "data_source") => {
                        hints.set_data_source(value.text());
                    }
                    _ => {
                        return Err(Error::Hint(format!(
                            "unknown hint \"{}\"",
                            assignment.trim()
                        )))
                    }
                }
            }
        }

        Ok(found.then_some(hints))
    }
}

// Unquoted hint value: an integer or a bare word.
fn literal(value: &str) -> Value {
    match value.parse::<i64>() {
        Ok(i) => Value::Integer(i),
        Err(_) => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_comment_hint() {
        let query = "/* SHARDING_HINT: t_order.database_value=1, t_order.table_value='a', data_source=ds_0 */ SELECT * FROM t_order";
        let hints = HintValues::from_comment(query).unwrap().unwrap();
        assert_eq!(hints.database_values("T_ORDER"), Some(&[Value::Integer(1)][..]));
        assert_eq!(hints.table_values("t_order"), Some(&[Value::from("a")][..]));
        assert_eq!(hints.data_source.as_deref(), Some("ds_0"));
    }

    #[test]
    fn test_multiple_values() {
        let query = "SELECT 1 /* SHARDING_HINT: t_order.table_value=1, t_order.table_value=3 */";
        let hints = HintValues::from_comment(query).unwrap().unwrap();
        assert_eq!(
            hints.table_values("t_order").unwrap(),
            &[Value::Integer(1), Value::Integer(3)]
        );
        assert!(hints.database_values("t_order").is_none());
    }

    #[test]
    fn test_no_hint() {
        assert_eq!(HintValues::from_comment("SELECT /* just a comment */ 1").unwrap(), None);
    }

    #[test]
    fn test_bad_hint() {
        assert!(HintValues::from_comment("/* SHARDING_HINT: shard=1 */ SELECT 1").is_err());
    }
}
