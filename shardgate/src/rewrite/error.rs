use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("rewrite tokens overlap: {first} and {second}")]
    TokenOverlap { first: String, second: String },

    #[error("\"{operator}\" isn't supported on encrypted column \"{table}.{column}\"")]
    UnsupportedEncryptPredicate {
        table: String,
        column: String,
        operator: String,
    },

    #[error("parameter {0} is referenced but not bound")]
    MissingParameter(usize),

    #[error("{0}")]
    Encrypt(#[from] crate::encrypt::Error),

    #[error("{0}")]
    Router(#[from] crate::router::Error),
}
