use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data_types::Properties;

/// Physical data source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct DataSource {
    pub name: String,
}

/// Sharded logical table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ShardingTable {
    /// Logical table name.
    pub name: String,
    /// Inline expression for the physical nodes, e.g. `ds_${0..1}.t_order_${0..3}`.
    /// When missing, the table exists on every data source under its logical name.
    #[serde(default)]
    pub actual_data_nodes: Option<String>,
    /// How to pick the data source.
    #[serde(default)]
    pub database_strategy: Option<ShardingStrategy>,
    /// How to pick the physical table.
    #[serde(default)]
    pub table_strategy: Option<ShardingStrategy>,
    /// Auto-generated key.
    #[serde(default)]
    pub key_generate_strategy: Option<KeyGenerateStrategy>,
}

/// Sharding strategy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ShardingStrategy {
    /// Single sharding column.
    Standard { column: String, algorithm: String },
    /// Multiple sharding columns.
    Complex {
        columns: Vec<String>,
        algorithm: String,
    },
    /// Routing supplied by hints.
    Hint { algorithm: String },
    /// Route to all nodes.
    #[default]
    None,
}

impl ShardingStrategy {
    pub fn algorithm(&self) -> Option<&str> {
        match self {
            Self::Standard { algorithm, .. }
            | Self::Complex { algorithm, .. }
            | Self::Hint { algorithm } => Some(algorithm),
            Self::None => None,
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Standard { column, .. } => vec![column.as_str()],
            Self::Complex { columns, .. } => columns.iter().map(|c| c.as_str()).collect(),
            Self::Hint { .. } | Self::None => vec![],
        }
    }
}

/// Key generation for a table column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct KeyGenerateStrategy {
    pub column: String,
    /// Name of the key generator.
    pub generator: String,
}

/// Named algorithm: sharding algorithm, key generator or encryptor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Algorithm {
    pub name: String,
    /// Registered type, e.g. `MOD` or `CLASS_BASED`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: Properties,
}

impl Algorithm {
    pub fn new(name: impl ToString, kind: impl ToString, props: Properties) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            props,
        }
    }
}
