use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::path::{Path, PathBuf};

use super::data::{ImageFile, ImageRecord};
use super::store::{ImageStore, StoreError, StoreResult};
use crate::config::GalleryConfig;

/// Schema version written to `PRAGMA user_version`
const SCHEMA_VERSION: i64 = 1;

/// The Library manages the SQLite image catalog.
/// It stores every uploaded file together with its insertion time.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at the configured location.
    ///
    /// By default the database file lives in the user's data directory:
    /// - Linux: ~/.local/share/image-gallery/image_gallery.db
    /// - macOS: ~/Library/Application Support/image-gallery/image_gallery.db
    /// - Windows: %APPDATA%\image-gallery\image_gallery.db
    pub fn open(config: &GalleryConfig) -> StoreResult<Self> {
        Self::open_at(&config.db_path)
    }

    /// Open (or create) the catalog at an explicit path
    pub fn open_at(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;

        tracing::info!("Catalog opened at {}", db_path.display());

        let mut library = Library { conn, db_path };
        library.init_schema()?;

        Ok(library)
    }

    /// Bring the schema up to `SCHEMA_VERSION`.
    /// An existing table is never recreated or cleared.
    fn init_schema(&mut self) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let found: i64 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if found > SCHEMA_VERSION {
            return Err(StoreError::VersionMismatch {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        if found < 1 {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS images (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    name        TEXT NOT NULL,
                    mime_type   TEXT NOT NULL,
                    data        BLOB NOT NULL,
                    timestamp   TEXT NOT NULL
                )",
                [],
            )?;
            tracing::info!("Created images table (schema v{})", SCHEMA_VERSION);
        }

        if found != SCHEMA_VERSION {
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Close the catalog, reporting any error SQLite raises on close
    pub fn close(self) -> StoreResult<()> {
        let db_path = self.db_path;
        self.conn.close().map_err(|(_, err)| StoreError::from(err))?;
        tracing::info!("Catalog closed at {}", db_path.display());
        Ok(())
    }
}

impl ImageStore for Library {
    /// Insert a new record and return the key SQLite assigned to it
    fn insert(&mut self, file: &ImageFile) -> StoreResult<i64> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO images (name, mime_type, data, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![&file.name, &file.mime_type, &file.bytes[..], &timestamp],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(id, name = %file.name, bytes = file.bytes.len(), "Stored image");
        Ok(id)
    }

    /// Get all images in the catalog
    fn list_all(&self) -> StoreResult<Vec<ImageRecord>> {
        // Read everything inside one transaction so the result is a consistent snapshot
        let tx = self.conn.unchecked_transaction()?;

        let images = {
            let mut stmt =
                tx.prepare("SELECT id, name, mime_type, data, timestamp FROM images ORDER BY id")?;
            let image_iter = stmt.query_map([], record_from_row)?;

            let mut images = Vec::new();
            for image in image_iter {
                images.push(image?);
            }
            images
        };

        tx.commit()?;

        tracing::debug!(count = images.len(), "Loaded images");
        Ok(images)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    let data: Vec<u8> = row.get(3)?;
    Ok(ImageRecord {
        id: Some(row.get(0)?),
        file: ImageFile::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?, data),
        timestamp: row.get(4)?,
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
