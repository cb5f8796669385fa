//! Compiled rules, published as an immutable snapshot.
//!
//! Readers load the current snapshot without locking. Reloading compiles
//! a new snapshot and swaps it in.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use shardgate_config::{Config, General};
use tracing::info;

use crate::encrypt::EncryptRule;
use crate::sharding::{Registry, ShardingRule};
use crate::Error;

static RULES: Lazy<ArcSwap<Rules>> = Lazy::new(|| ArcSwap::from_pointee(Rules::default()));

static LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Sharding and encrypt rules with general settings.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub sharding: ShardingRule,
    pub encrypt: EncryptRule,
    pub general: General,
}

impl Rules {
    /// Compile rules with the built-in algorithms.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_registry(config, &Registry::default())
    }

    /// Compile rules, looking up class based algorithms in `registry`.
    pub fn with_registry(config: &Config, registry: &Registry) -> Result<Self, Error> {
        Ok(Self {
            sharding: ShardingRule::new(config, registry)?,
            encrypt: EncryptRule::new(config)?,
            general: config.general.clone(),
        })
    }
}

/// Current rules.
pub fn rules() -> Arc<Rules> {
    RULES.load().clone()
}

/// Publish new rules.
pub fn set(rules: Rules) -> Arc<Rules> {
    let _lock = LOCK.lock();
    let rules = Arc::new(rules);
    RULES.store(rules.clone());
    rules
}

/// Load, compile and publish rules from a configuration file.
pub fn load(path: impl AsRef<Path>, registry: &Registry) -> Result<Arc<Rules>, Error> {
    let config = Config::load(path)?;
    let rules = Rules::with_registry(&config, registry)?;
    info!(
        "rules loaded [{} data sources]",
        rules.sharding.data_sources().len()
    );
    Ok(set(rules))
}
