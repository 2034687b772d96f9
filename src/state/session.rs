/// Session state
///
/// Who is using the client and what they were looking at. The session
/// is owned by the application and passed to whatever needs it; it is
/// loaded once at startup and saved whenever it changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Session {
    /// Opaque actor identifier recorded on status changes
    pub actor: String,
    /// Property selected when the session was last saved
    pub selected_property: Option<i64>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            actor: "guest".to_string(),
            selected_property: None,
        }
    }
}

impl Session {
    /// Default location next to the catalog in the user data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|mut path| {
            path.push("listing-desk");
            path.push("session.json");
            path
        })
    }

    /// Load a saved session; a missing file is a fresh session
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
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

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_error)?;

        debug!(path = %path.display(), "Session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let session = Session {
            actor: "agent-42".to_string(),
            selected_property: Some(3),
        };
        session.save(&path).unwrap();

        assert_eq!(Session::load(&path).unwrap(), session);
    }

    #[test]
    fn test_missing_session_is_guest() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load(&dir.path().join("session.json")).unwrap();
        assert_eq!(session.actor, "guest");
        assert_eq!(session.selected_property, None);
    }
}
