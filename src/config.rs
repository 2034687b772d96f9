/// Application configuration
///
/// Read once at startup from `<config dir>/listing-desk/config.json`.
/// Every field has a default, so a missing file or a partial file is fine.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::media::loader::SourceRoots;
use crate::state::history::DisplayZone;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the bundled listing images
    pub assets_dir: PathBuf,
    /// Local mirror of backend storage for storage-relative image paths
    pub storage_root: Option<PathBuf>,
    /// Catalog location; the user data directory when unset
    pub database_path: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Fixed offset for history timestamps; the local zone when unset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            storage_root: None,
            database_path: None,
            log_filter: "info".to_string(),
            utc_offset_minutes: None,
        }
    }
}

impl AppConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("listing-desk");
            path.push("config.json");
            path
        })
    }

    /// Load from `path`, falling back to defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Roots the image loader resolves locations against
    pub fn source_roots(&self) -> SourceRoots {
        SourceRoots {
            assets_dir: self.assets_dir.clone(),
            storage_root: self.storage_root.clone(),
        }
    }

    /// Zone for history timestamps. Out-of-range offsets fall back to local time.
    pub fn display_zone(&self) -> DisplayZone {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.checked_mul(60)?))
            .map(DisplayZone::Fixed)
            .unwrap_or(DisplayZone::Local)
    }
}
