//! Errors raised while loading and validating simulation inputs.

use std::path::PathBuf;

use crate::workload::WorkloadId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("can't access file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse YAML from file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("can't serialize trace: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid host {host}: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("invalid workload {id}: {reason}")]
    InvalidWorkload { id: WorkloadId, reason: String },

    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("host {0} is defined more than once")]
    DuplicateHost(String),
}

pub type Result<T> = std::result::Result<T, Error>;
