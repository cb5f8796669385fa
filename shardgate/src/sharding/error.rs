use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown sharding algorithm type \"{0}\"")]
    UnknownAlgorithmType(String),

    #[error("sharding algorithm \"{0}\" is not configured")]
    UnknownAlgorithm(String),

    #[error("key generator \"{0}\" is not configured")]
    UnknownKeyGenerator(String),

    #[error("algorithm \"{algorithm}\" is missing property \"{property}\"")]
    MissingProperty { algorithm: String, property: String },

    #[error("algorithm \"{algorithm}\" has invalid property \"{property}\": {reason}")]
    InvalidProperty {
        algorithm: String,
        property: String,
        reason: String,
    },

    #[error("class based algorithm requires \"algorithmClassName\"")]
    ClassNameMissing,

    #[error("algorithm class \"{0}\" is not registered")]
    ClassNotFound(String),

    #[error("unknown sharding strategy \"{0}\"")]
    UnknownStrategy(String),

    #[error("algorithm \"{algorithm}\" does not implement the {expected} sharding capability")]
    CapabilityMismatch { algorithm: String, expected: String },

    #[error("inline expression \"{expression}\" is invalid: {reason}")]
    InlineExpression { expression: String, reason: String },

    #[error("range queries are not allowed with inline sharding on \"{0}\", set \"allow-range-query-with-inline-sharding\"")]
    InlineRange(String),

    #[error("table \"{0}\" has no actual data nodes")]
    NoDataNodes(String),

    #[error("{0}")]
    Regex(#[from] regex::Error),
}
