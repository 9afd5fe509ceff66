use std::path::PathBuf;

use crate::config::Mode;

/// Errors raised while writing an STL stream.
#[derive(Debug, thiserror::Error)]
pub enum StlError {
    #[error("failed to create STL file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("STL write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("model name {name:?} contains a line break")]
    InvalidModelName { name: String },

    #[error("trailer already written; no more triangles can be added")]
    TrailerWritten,

    #[error("{mode} STL cannot hold more than {limit} triangles")]
    TooManyTriangles { mode: Mode, limit: u64 },

    #[error("STL sink already released")]
    SinkReleased,
}

pub type Result<T> = std::result::Result<T, StlError>;
