/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog layer and the UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a property
///
/// Stored and exchanged as a plain string. Unknown values are kept
/// verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyStatus {
    Available,
    Negotiating,
    Sold,
    Other(String),
}

impl PropertyStatus {
    /// Parse a status string (trimmed, ASCII case-insensitive)
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("available") {
            PropertyStatus::Available
        } else if trimmed.eq_ignore_ascii_case("negotiating") {
            PropertyStatus::Negotiating
        } else if trimmed.eq_ignore_ascii_case("sold") {
            PropertyStatus::Sold
        } else {
            PropertyStatus::Other(raw.to_string())
        }
    }

    /// Canonical storage form
    pub fn as_str(&self) -> &str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Negotiating => "negotiating",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Other(raw) => raw,
        }
    }

    /// The statuses a user can pick when changing a listing
    pub const SELECTABLE: [PropertyStatus; 3] = [
        PropertyStatus::Available,
        PropertyStatus::Negotiating,
        PropertyStatus::Sold,
    ];
}

impl From<String> for PropertyStatus {
    fn from(raw: String) -> Self {
        PropertyStatus::parse(&raw)
    }
}

impl From<PropertyStatus> for String {
    fn from(status: PropertyStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded status transition. Never modified once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEntry {
    pub status: PropertyStatus,
    /// Opaque identifier of whoever made the change
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A listing in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Unique database ID
    pub id: i64,
    pub title: String,
    /// Raw image reference as stored (see `media::reference`)
    pub image_ref: String,
    /// Current status
    pub status: PropertyStatus,
}
