use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct General {
    /// Upper bound on the number of route units a single statement can produce.
    #[serde(default = "General::max_route_units")]
    pub max_route_units: usize,
    /// Data source used for tables without any rule.
    #[serde(default)]
    pub default_data_source: Option<String>,
    /// Log logical and actual SQL.
    #[serde(default)]
    pub sql_show: bool,
    /// Snowflake worker id.
    #[serde(default)]
    pub worker_id: u64,
}

impl Default for General {
    fn default() -> Self {
        Self {
            max_route_units: Self::max_route_units(),
            default_data_source: None,
            sql_show: false,
            worker_id: 0,
        }
    }
}

impl General {
    fn max_route_units() -> usize {
        4096
    }
}
