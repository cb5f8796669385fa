//! `CLASS_BASED` algorithms: user implementations registered by name.

use std::sync::Arc;

use shardgate_config::Properties;

use super::{Capability, Error, ShardingAlgorithm};

/// Builds a user algorithm from its properties.
pub type ClassFactory = Arc<dyn Fn(&Properties) -> Result<ShardingAlgorithm, Error> + Send + Sync>;

/// Create a class based algorithm, checking it provides the configured capability.
pub(super) fn create(
    name: &str,
    props: &Properties,
    lookup: impl Fn(&str) -> Option<ClassFactory>,
) -> Result<ShardingAlgorithm, Error> {
    let strategy = props
        .string("strategy")
        .ok_or_else(|| Error::MissingProperty {
            algorithm: name.to_string(),
            property: "strategy".into(),
        })?;
    let capability: Capability = strategy.parse()?;

    let class = props
        .string("algorithmClassName")
        .map(|class| class.trim().to_string())
        .filter(|class| !class.is_empty())
        .ok_or(Error::ClassNameMissing)?;

    let factory = lookup(&class).ok_or_else(|| Error::ClassNotFound(class.clone()))?;
    let algorithm = factory(props)?;

    if algorithm.capability() != capability {
        return Err(Error::CapabilityMismatch {
            algorithm: class,
            expected: capability.to_string(),
        });
    }

    Ok(algorithm)
}
