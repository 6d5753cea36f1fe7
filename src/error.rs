use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Cannot read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config value: {0}")]
    InvalidConfig(String),

    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TreeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
