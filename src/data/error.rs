use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while enumerating or reading the data directory.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed file name {0:?}: expected <customer>_<category>.csv")]
    MalformedFileName(String),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}, row {row}: {reason}")]
    Row {
        path: PathBuf,
        /// 1-based line in the file.
        row: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DataError>;
