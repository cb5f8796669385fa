//! Algorithm registry.
//!
//! Maps configured algorithm types to their factories. User algorithms are
//! registered as classes and created through the `CLASS_BASED` type.

use std::collections::HashMap;
use std::sync::Arc;

use shardgate_config::{Algorithm, Properties};
use tracing::debug;

use super::{
    class_based, ClassFactory, Error, HashModulo, HintInline, Inline, Modulo, RangePartitions,
    ShardingAlgorithm,
};

type Factory = fn(&str, &Properties) -> Result<ShardingAlgorithm, Error>;

#[derive(Clone)]
pub struct Registry {
    builtin: HashMap<&'static str, Factory>,
    classes: HashMap<String, ClassFactory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("builtin", &self.builtin.keys().collect::<Vec<_>>())
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut builtin: HashMap<&'static str, Factory> = HashMap::new();
        builtin.insert("MOD", |name, props| {
            Ok(ShardingAlgorithm::standard(Modulo::new(name, props)?))
        });
        builtin.insert("HASH_MOD", |name, props| {
            Ok(ShardingAlgorithm::standard(HashModulo::new(name, props)?))
        });
        builtin.insert("BOUNDARY_RANGE", |name, props| {
            Ok(ShardingAlgorithm::standard(RangePartitions::boundary(
                name, props,
            )?))
        });
        builtin.insert("VOLUME_RANGE", |name, props| {
            Ok(ShardingAlgorithm::standard(RangePartitions::volume(
                name, props,
            )?))
        });
        builtin.insert("INLINE", |name, props| {
            Ok(ShardingAlgorithm::standard(Inline::new(name, props)?))
        });
        builtin.insert("HINT_INLINE", |name, props| {
            Ok(ShardingAlgorithm::hint(HintInline::new(name, props)?))
        });

        Self {
            builtin,
            classes: HashMap::new(),
        }
    }
}

impl Registry {
    /// Register a user algorithm, available to `CLASS_BASED` configuration
    /// as `algorithmClassName = "<class>"`.
    pub fn register_class(
        &mut self,
        class: impl ToString,
        factory: impl Fn(&Properties) -> Result<ShardingAlgorithm, Error> + Send + Sync + 'static,
    ) -> &mut Self {
        self.classes.insert(class.to_string(), Arc::new(factory));
        self
    }

    /// Create the configured algorithm.
    pub fn create(&self, algorithm: &Algorithm) -> Result<ShardingAlgorithm, Error> {
        let kind = algorithm.kind.to_uppercase();
        debug!(
            "creating sharding algorithm \"{}\" [{}]",
            algorithm.name, kind
        );

        if kind == "CLASS_BASED" {
            return class_based::create(&algorithm.name, &algorithm.props, |class| {
                self.classes.get(class).cloned()
            });
        }

        let factory = self
            .builtin
            .get(kind.as_str())
            .ok_or_else(|| Error::UnknownAlgorithmType(algorithm.kind.clone()))?;

        factory(&algorithm.name, &algorithm.props)
    }
}
