use std::path::PathBuf;
use thiserror::Error;

/// Failures of the JSON-backed stores. Logical no-ops are not errors,
/// the store methods report those as `Ok(false)`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backing file not found: {0}")]
    NotFound(PathBuf),

    #[error("backing file {path} is corrupt: {source}")]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no botconfig.txt file found in any expected location (., .., ../.., src/)")]
    NotFound,

    #[error("{0} not found in botconfig.txt")]
    Missing(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("script `{}` doesn't exist", .0.display())]
    ScriptMissing(PathBuf),

    #[error("failed to run script: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
