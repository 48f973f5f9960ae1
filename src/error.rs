//! Error types for catalog I/O, track fetching and counters

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors loading or persisting a catalog document
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File missing, unreadable or unwritable
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but the top level is not an object
    #[error("Catalog {path:?} must contain a JSON object at the top level")]
    NotAnObject { path: PathBuf },

    /// Could not serialize the document
    #[error("Failed to serialize {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the external track lister
#[derive(Debug, Error)]
pub enum FetchError {
    /// The tool is not installed
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    /// Could not start the process
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading output or waiting for the process failed
    #[error("I/O error while reading tool output: {0}")]
    Io(#[from] std::io::Error),

    /// The process did not finish in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The process wrote more than allowed
    #[error("Output exceeded {0} bytes")]
    OutputTooLarge(usize),

    /// The process exited abnormally
    #[error("Tool failed ({status}): {stderr}")]
    ExitStatus {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Errors from the counter store
#[derive(Debug, Error)]
pub enum StatsError {
    /// Counter path is empty or malformed
    #[error("Invalid counter path: {0:?}")]
    InvalidPath(String),
}
