use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use super::encrypt::EncryptTable;
use super::error::Error;
use super::general::General;
use super::sharding::{Algorithm, DataSource, ShardingStrategy, ShardingTable};

/// Configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// General configuration.
    #[serde(default)]
    pub general: General,

    /// Physical data sources.
    #[serde(default)]
    pub data_sources: Vec<DataSource>,

    /// Sharded tables.
    #[serde(default)]
    pub sharding_tables: Vec<ShardingTable>,

    /// Groups of tables sharded identically.
    #[serde(default)]
    pub binding_tables: Vec<Vec<String>>,

    /// Tables replicated to every data source.
    #[serde(default)]
    pub broadcast_tables: Vec<String>,

    /// Database strategy for sharded tables that don't declare one.
    #[serde(default)]
    pub default_database_strategy: Option<ShardingStrategy>,

    /// Table strategy for sharded tables that don't declare one.
    #[serde(default)]
    pub default_table_strategy: Option<ShardingStrategy>,

    #[serde(default)]
    pub sharding_algorithms: Vec<Algorithm>,

    #[serde(default)]
    pub key_generators: Vec<Algorithm>,

    #[serde(default)]
    pub encryptors: Vec<Algorithm>,

    /// Tables with encrypted columns.
    #[serde(default)]
    pub encrypt_tables: Vec<EncryptTable>,
}

impl Config {
    /// Load configuration from disk or use defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let config = if let Ok(source) = read_to_string(path) {
            let config: Config = source.parse()?;
            info!("loaded \"{}\"", path.display());
            config
        } else {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                path.display()
            );
            Config::default()
        };

        config.check();

        Ok(config)
    }

    /// JSON schema of the configuration file.
    pub fn schema() -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&schemars::schema_for!(Config))?)
    }

    /// Data source names, in declaration order.
    pub fn data_source_names(&self) -> Vec<String> {
        self.data_sources.iter().map(|ds| ds.name.clone()).collect()
    }

    /// Find a named sharding algorithm.
    pub fn sharding_algorithm(&self, name: &str) -> Option<&Algorithm> {
        self.sharding_algorithms.iter().find(|a| a.name == name)
    }

    pub fn key_generator(&self, name: &str) -> Option<&Algorithm> {
        self.key_generators.iter().find(|a| a.name == name)
    }

    pub fn encryptor(&self, name: &str) -> Option<&Algorithm> {
        self.encryptors.iter().find(|a| a.name == name)
    }

    /// Check configuration and warn about likely mistakes.
    pub fn check(&self) {
        let mut names = HashSet::new();
        for ds in &self.data_sources {
            if !names.insert(ds.name.as_str()) {
                warn!("data source \"{}\" is declared more than once", ds.name);
            }
        }

        if let Some(ref default) = self.general.default_data_source {
            if !names.contains(default.as_str()) {
                warn!(
                    "default data source \"{}\" isn't a declared data source",
                    default
                );
            }
        }

        let sharded: HashSet<&str> = self
            .sharding_tables
            .iter()
            .map(|t| t.name.as_str())
            .collect();

        for table in &self.broadcast_tables {
            if sharded.contains(table.as_str()) {
                warn!(
                    "table \"{}\" is both broadcast and sharded, it will be treated as sharded",
                    table
                );
            }
        }

        for group in &self.binding_tables {
            for table in group {
                if !sharded.contains(table.as_str()) {
                    warn!(
                        "binding table \"{}\" has no sharding configuration, it will be ignored",
                        table
                    );
                }
            }
        }

        for table in &self.sharding_tables {
            let strategies = [
                table
                    .database_strategy
                    .as_ref()
                    .or(self.default_database_strategy.as_ref()),
                table
                    .table_strategy
                    .as_ref()
                    .or(self.default_table_strategy.as_ref()),
            ];

            for algorithm in strategies.iter().flatten().filter_map(|s| s.algorithm()) {
                if self.sharding_algorithm(algorithm).is_none() {
                    warn!(
                        "table \"{}\" references unknown sharding algorithm \"{}\"",
                        table.name, algorithm
                    );
                }
            }

            if let Some(ref keygen) = table.key_generate_strategy {
                if self.key_generator(&keygen.generator).is_none() {
                    warn!(
                        "table \"{}\" references unknown key generator \"{}\"",
                        table.name, keygen.generator
                    );
                }
            }
        }

        if self.general.max_route_units == 0 {
            warn!("max_route_units is 0, every statement will be rejected");
        }
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).map_err(|err| Error::config(source, err))
    }
}
