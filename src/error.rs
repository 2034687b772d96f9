/// Error types
///
/// Resolution and history projection are total and have no errors.
/// Everything here belongs to the surrounding client: the catalog,
/// configuration files and the image loader.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the SQLite listing catalog
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid listing file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine user data directory")]
    NoDataDir,

    #[error("property {0} not found")]
    PropertyNotFound(i64),
}

/// Errors loading or saving JSON settings files (config, session)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Render-host load failures. `Clone` because they travel in UI messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadFailure {
    #[error("no storage root configured for {0}")]
    NoStorageRoot(String),

    #[error("failed to read {location}: {reason}")]
    Read { location: String, reason: String },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to decode {location}: {reason}")]
    Decode { location: String, reason: String },

    #[error("decode task for {location} did not finish: {reason}")]
    Join { location: String, reason: String },
}
