//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    #[error("config error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a parse error pointing at the offending line in the source.
    pub fn config(source: &str, err: toml::de::Error) -> Self {
        let Some(span) = err.span() else {
            return Self::Toml(err);
        };

        let prefix = &source[..span.start.min(source.len())];
        let line = prefix.matches('\n').count() + 1;
        let column = prefix.rfind('\n').map(|nl| prefix.len() - nl).unwrap_or(prefix.len() + 1);

        Self::Parse {
            line,
            column,
            message: err.message().to_string(),
        }
    }
}
