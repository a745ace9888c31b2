use std::path::PathBuf;

use thiserror::Error;

use crate::http::TransportError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("API request failed: {0}")]
    Network(String),

    #[error("page fetch failed: {0}")]
    Fetch(String),

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn network(err: TransportError) -> Self {
        Error::Network(err.to_string())
    }

    pub fn fetch(err: TransportError) -> Self {
        Error::Fetch(err.to_string())
    }
}
