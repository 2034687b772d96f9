use chrono::DateTime;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::{Property, PropertyStatus, StatusChangeEntry};
use crate::error::LibraryError;

/// The Library manages the SQLite listing catalog.
/// It stores properties and their append-only status history, and stands
/// in for the hosted backend as the source of history records.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

/// Result of a listing import operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported_count: usize,
    pub skipped_count: usize,
    /// Listings rejected by the database for reasons other than a duplicate title
    pub failed_count: usize,
}

/// One listing in an import file
#[derive(Debug, Clone, Deserialize)]
pub struct ListingImport {
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_status")]
    pub status: PropertyStatus,
    #[serde(default)]
    pub history: Vec<StatusChangeEntry>,
}

fn default_status() -> PropertyStatus {
    PropertyStatus::Available
}

impl Library {
    /// Open (or create) the catalog at `db_path`
    pub fn open(db_path: &Path) -> Result<Self, LibraryError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LibraryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(db_path)?;
        info!(path = %db_path.display(), "Catalog opened");

        let library = Library {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;

        Ok(library)
    }

    /// A throwaway in-memory catalog
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, LibraryError> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Default catalog location in the user's data directory:
    /// - Linux: ~/.local/share/listing-desk/listings.db
    /// - macOS: ~/Library/Application Support/listing-desk/listings.db
    /// - Windows: %APPDATA%\listing-desk\listings.db
    pub fn default_path() -> Result<PathBuf, LibraryError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(LibraryError::NoDataDir)?;

        path.push("listing-desk");
        path.push("listings.db");
        Ok(path)
    }

    /// Create all tables and indexes if they don't exist
    fn init_schema(&self) -> Result<(), LibraryError> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS properties (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL UNIQUE,
                image_ref       TEXT NOT NULL DEFAULT '',
                status          TEXT NOT NULL DEFAULT 'available',
                created_at      INTEGER NOT NULL
            );

            -- Append-only; rows are never updated or deleted by the client
            CREATE TABLE IF NOT EXISTS status_changes (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                property_id     INTEGER NOT NULL,
                status          TEXT NOT NULL,
                changed_by      TEXT NOT NULL,
                changed_at_ms   INTEGER NOT NULL,
                notes           TEXT,
                FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_status_changes_property
            ON status_changes(property_id);",
        )?;

        debug!("Catalog schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn property_count(&self) -> Result<i64, LibraryError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Add a new property; returns its ID
    #[cfg(test)]
    pub fn insert_property(
        &self,
        title: &str,
        image_ref: &str,
        status: &PropertyStatus,
    ) -> Result<i64, LibraryError> {
        self.conn.execute(
            "INSERT INTO properties (title, image_ref, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![title, image_ref, status.as_str(), chrono::Utc::now().timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All properties, newest first
    pub fn get_all_properties(&self) -> Result<Vec<Property>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, image_ref, status FROM properties ORDER BY created_at DESC, id DESC",
        )?;

        let properties = stmt
            .query_map([], property_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(properties)
    }

    pub fn get_property(&self, property_id: i64) -> Result<Property, LibraryError> {
        self.conn
            .query_row(
                "SELECT id, title, image_ref, status FROM properties WHERE id = ?1",
                [property_id],
                property_from_row,
            )
            .optional()?
            .ok_or(LibraryError::PropertyNotFound(property_id))
    }

    /// Status history in insertion order (not time order)
    pub fn get_history(&self, property_id: i64) -> Result<Vec<StatusChangeEntry>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT status, changed_by, changed_at_ms, notes
             FROM status_changes
             WHERE property_id = ?1
             ORDER BY id ASC",
        )?;

        let entries = stmt
            .query_map([property_id], |row| {
                let millis: i64 = row.get(2)?;
                let changed_at = DateTime::from_timestamp_millis(millis)
                    .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, millis))?;
                Ok(StatusChangeEntry {
                    status: PropertyStatus::parse(&row.get::<_, String>(0)?),
                    changed_by: row.get(1)?,
                    changed_at,
                    notes: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Append a status change and make it the property's current status
    pub fn record_status_change(
        &mut self,
        property_id: i64,
        entry: &StatusChangeEntry,
    ) -> Result<(), LibraryError> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE properties SET status = ?1 WHERE id = ?2",
            params![entry.status.as_str(), property_id],
        )?;
        if updated == 0 {
            return Err(LibraryError::PropertyNotFound(property_id));
        }
        append_history(&tx, property_id, entry)?;
        tx.commit()?;

        info!(
            property_id,
            status = %entry.status,
            changed_by = %entry.changed_by,
            "Status changed"
        );
        Ok(())
    }
}

fn property_from_row(row: &Row<'_>) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get(0)?,
        title: row.get(1)?,
        image_ref: row.get(2)?,
        status: PropertyStatus::parse(&row.get::<_, String>(3)?),
    })
}

fn append_history(
    conn: &Connection,
    property_id: i64,
    entry: &StatusChangeEntry,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO status_changes (property_id, status, changed_by, changed_at_ms, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            property_id,
            entry.status.as_str(),
            entry.changed_by,
            entry.changed_at.timestamp_millis(),
            entry.notes,
        ],
    )?;
    Ok(())
}

/// Parse a listing import file (a JSON array of listings)
pub fn read_listing_file(path: &Path) -> Result<Vec<ListingImport>, LibraryError> {
    let json = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Import listings through `conn`. Titles already in the catalog are
/// skipped; any other error fails that listing alone.
///
/// Takes a bare connection so background tasks can open their own;
/// `rusqlite::Connection` is not `Send`.
pub fn import_listings(conn: &mut Connection, listings: &[ListingImport]) -> ImportResult {
    let mut result = ImportResult::default();
    let now = chrono::Utc::now().timestamp();

    for listing in listings {
        match import_listing(conn, listing, now) {
            Ok(true) => result.imported_count += 1,
            Ok(false) => {
                debug!(title = %listing.title, "Skipping duplicate listing");
                result.skipped_count += 1;
            }
            Err(e) => {
                warn!(title = %listing.title, error = %e, "Error importing listing");
                result.failed_count += 1;
            }
        }
    }

    info!(
        imported = result.imported_count,
        skipped = result.skipped_count,
        failed = result.failed_count,
        "Import complete"
    );
    result
}

/// Insert one listing with its history. `Ok(false)` means the title exists.
fn import_listing(
    conn: &mut Connection,
    listing: &ListingImport,
    created_at: i64,
) -> rusqlite::Result<bool> {
    let tx = conn.transaction()?;
    let inserted = tx.execute(
        "INSERT INTO properties (title, image_ref, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![listing.title, listing.image, listing.status.as_str(), created_at],
    );

    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            return Ok(false);
        }
        Err(e) => return Err(e),
    }

    let property_id = tx.last_insert_rowid();
    for entry in &listing.history {
        append_history(&tx, property_id, entry)?;
    }
    tx.commit()?;
    Ok(true)
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
