use indexmap::IndexSet;
use shardgate_config::Properties;
use tracing::warn;

use super::super::inline_expr::Template;
use super::{
    Error, HintShardingAlgorithm, HintShardingValue, PreciseShardingValue, RangeShardingValue,
    StandardShardingAlgorithm,
};

/// `INLINE`: target named by an expression over the sharding column.
#[derive(Debug, Clone)]
pub struct Inline {
    name: String,
    template: Template,
    allow_range: bool,
}

impl Inline {
    pub fn new(name: &str, props: &Properties) -> Result<Self, Error> {
        let expression =
            props
                .string("algorithm-expression")
                .ok_or_else(|| Error::MissingProperty {
                    algorithm: name.to_string(),
                    property: "algorithm-expression".into(),
                })?;

        Ok(Self {
            name: name.to_string(),
            template: Template::new(&expression)?,
            allow_range: props
                .boolean("allow-range-query-with-inline-sharding")
                .unwrap_or(false),
        })
    }
}

impl StandardShardingAlgorithm for Inline {
    fn precise(&self, available: &[String], value: &PreciseShardingValue) -> Option<String> {
        match self.template.render(value.column, value.value) {
            Ok(target) => available
                .iter()
                .find(|t| t.eq_ignore_ascii_case(&target))
                .cloned(),
            Err(err) => {
                warn!("inline sharding on \"{}\" failed: {}", self.name, err);
                None
            }
        }
    }

    fn range(&self, available: &[String], _value: &RangeShardingValue) -> Result<Vec<String>, Error> {
        if self.allow_range {
            Ok(available.to_vec())
        } else {
            Err(Error::InlineRange(self.name.clone()))
        }
    }
}

/// `HINT_INLINE`: target named by an expression over the hint value.
#[derive(Debug, Clone)]
pub struct HintInline {
    name: String,
    template: Template,
}

impl HintInline {
    pub fn new(name: &str, props: &Properties) -> Result<Self, Error> {
        let expression = props
            .string("algorithm-expression")
            .unwrap_or_else(|| "${value}".to_string());

        Ok(Self {
            name: name.to_string(),
            template: Template::new(&expression)?,
        })
    }
}

impl HintShardingAlgorithm for HintInline {
    fn shard(&self, available: &[String], value: &HintShardingValue) -> Vec<String> {
        let mut targets = IndexSet::new();

        for hint in value.values {
            match self.template.render("value", hint) {
                Ok(target) => {
                    if let Some(target) = available.iter().find(|t| t.eq_ignore_ascii_case(&target)) {
                        targets.insert(target.clone());
                    }
                }
                Err(err) => warn!("hint sharding on \"{}\" failed: {}", self.name, err),
            }
        }

        targets.into_iter().collect()
    }
}
