use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] shardgate_config::Error),

    #[error("{0}")]
    Sharding(#[from] crate::sharding::Error),

    #[error("{0}")]
    Encrypt(#[from] crate::encrypt::Error),

    #[error("{0}")]
    Router(#[from] crate::router::Error),

    #[error("{0}")]
    Rewrite(#[from] crate::rewrite::Error),
}
