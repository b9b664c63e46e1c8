//! SQLite catalog of garments, quiz counters and uploaded images.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::{Path, PathBuf};
use wardrobe_core::{Garment, NewGarment, ToneSignal, ToneTally};

const GARMENT_COLUMNS: &str =
    "id, garment_type, color, undertone, weather, occasion, image_path, wear_count, created_at";

/// An image uploaded for color detection only (not a garment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub id: i64,
    pub filename: String,
    /// SHA-256 of the file contents, lowercase hex.
    pub file_hash: String,
    pub file_path: String,
    pub detected_color: String,
    pub created_at: String,
}

/// Owns the SQLite connection. Not `Sync`: one owner serializes access.
pub struct GarmentStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl GarmentStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "garment database opened");
        let store = Self {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS garments (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                garment_type    TEXT NOT NULL,
                color           TEXT NOT NULL,
                undertone       TEXT NOT NULL DEFAULT 'Neutral',
                weather         TEXT NOT NULL,
                occasion        TEXT NOT NULL,
                image_path      TEXT NOT NULL,
                wear_count      INTEGER NOT NULL DEFAULT 0 CHECK (wear_count >= 0),
                created_at      TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_garments_type ON garments(garment_type);

            CREATE TABLE IF NOT EXISTS tone (
                signal  TEXT PRIMARY KEY,
                count   INTEGER NOT NULL DEFAULT 0
            );
            INSERT OR IGNORE INTO tone (signal, count) VALUES ('cool', 0);
            INSERT OR IGNORE INTO tone (signal, count) VALUES ('warm', 0);

            CREATE TABLE IF NOT EXISTS images (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                filename        TEXT NOT NULL,
                file_hash       TEXT NOT NULL UNIQUE,
                file_path       TEXT NOT NULL,
                detected_color  TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );",
        )?;
        tracing::debug!("schema initialized");
        Ok(())
    }

    // --- Garments ---

    /// All garments in insertion order.
    pub fn list_garments(&self) -> Result<Vec<Garment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GARMENT_COLUMNS} FROM garments ORDER BY id"))?;
        let rows = stmt.query_map([], garment_from_row)?;
        let garments = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(garments)
    }

    pub fn get_garment(&self, id: i64) -> Result<Option<Garment>> {
        let garment = self
            .conn
            .query_row(
                &format!("SELECT {GARMENT_COLUMNS} FROM garments WHERE id = ?1"),
                [id],
                garment_from_row,
            )
            .optional()?;
        Ok(garment)
    }

    pub fn garment_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM garments", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert a garment with `wear_count = 0`. Returns the new id.
    pub fn insert_garment(&self, garment: &NewGarment) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO garments
                (garment_type, color, undertone, weather, occasion, image_path, wear_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                garment.garment_type,
                garment.color,
                garment.undertone,
                garment.weather,
                garment.occasion,
                garment.image_path,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, garment_type = %garment.garment_type, color = %garment.color, "garment inserted");
        Ok(id)
    }

    /// Add one wear. Returns `false` if no garment has this id.
    pub fn increment_wear_count(&self, id: i64) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE garments SET wear_count = wear_count + 1 WHERE id = ?1",
            [id],
        )?;
        Ok(updated > 0)
    }

    /// Delete a garment, returning the removed row (or `None` if absent).
    pub fn delete_garment(&mut self, id: i64) -> Result<Option<Garment>> {
        let tx = self.conn.transaction()?;
        let garment = tx
            .query_row(
                &format!("SELECT {GARMENT_COLUMNS} FROM garments WHERE id = ?1"),
                [id],
                garment_from_row,
            )
            .optional()?;
        if garment.is_some() {
            tx.execute("DELETE FROM garments WHERE id = ?1", [id])?;
        }
        tx.commit()?;
        Ok(garment)
    }

    // --- Quiz counters ---

    pub fn tone_counts(&self) -> Result<ToneTally> {
        let mut tally = ToneTally::default();
        let mut stmt = self.conn.prepare("SELECT signal, count FROM tone")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?;
        for row in rows {
            let (signal, count) = row?;
            match signal.as_str() {
                "cool" => tally.cool = count,
                "warm" => tally.warm = count,
                other => tracing::warn!(signal = other, "ignoring unknown tone counter"),
            }
        }
        Ok(tally)
    }

    pub fn increment_tone(&self, signal: ToneSignal) -> Result<()> {
        self.conn.execute(
            "UPDATE tone SET count = count + 1 WHERE signal = ?1",
            [signal.key()],
        )?;
        Ok(())
    }

    pub fn reset_tone(&self) -> Result<()> {
        self.conn.execute("UPDATE tone SET count = 0", [])?;
        Ok(())
    }

    // --- Uploaded images ---

    pub fn find_image_by_hash(&self, file_hash: &str) -> Result<Option<UploadedImage>> {
        let image = self
            .conn
            .query_row(
                "SELECT id, filename, file_hash, file_path, detected_color, created_at
                 FROM images WHERE file_hash = ?1",
                [file_hash],
                |row| {
                    Ok(UploadedImage {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        file_hash: row.get(2)?,
                        file_path: row.get(3)?,
                        detected_color: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(image)
    }

    pub fn insert_image(
        &self,
        filename: &str,
        file_hash: &str,
        file_path: &str,
        detected_color: &str,
    ) -> Result<UploadedImage> {
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO images (filename, file_hash, file_path, detected_color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![filename, file_hash, file_path, detected_color, created_at],
        )?;
        Ok(UploadedImage {
            id: self.conn.last_insert_rowid(),
            filename: filename.to_string(),
            file_hash: file_hash.to_string(),
            file_path: file_path.to_string(),
            detected_color: detected_color.to_string(),
            created_at,
        })
    }
}

fn garment_from_row(row: &Row<'_>) -> rusqlite::Result<Garment> {
    Ok(Garment {
        id: row.get(0)?,
        garment_type: row.get(1)?,
        color: row.get(2)?,
        undertone: row.get(3)?,
        weather: row.get(4)?,
        occasion: row.get(5)?,
        image_path: row.get(6)?,
        wear_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_garment(kind: &str, color: &str) -> NewGarment {
        NewGarment {
            garment_type: kind.into(),
            color: color.into(),
            undertone: "Neutral".into(),
            weather: "Summer".into(),
            occasion: "Casual".into(),
            image_path: format!("{kind}.jpg"),
        }
    }

    #[test]
    fn test_insert_then_list_has_zero_wear() {
        let store = GarmentStore::open_in_memory().unwrap();
        let id = store.insert_garment(&new_garment("Jeans", "blue")).unwrap();

        let garments = store.list_garments().unwrap();
        assert_eq!(garments.len(), 1);
        assert_eq!(garments[0].id, id);
        assert_eq!(garments[0].garment_type, "Jeans");
        assert_eq!(garments[0].wear_count, 0);
        assert!(!garments[0].created_at.is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = GarmentStore::open_in_memory().unwrap();
        let a = store.insert_garment(&new_garment("Kurta", "red")).unwrap();
        let b = store.insert_garment(&new_garment("Jeans", "blue")).unwrap();
        let ids: Vec<i64> = store.list_garments().unwrap().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(store.garment_count().unwrap(), 2);
    }

    #[test]
    fn test_increment_wear_count_by_exactly_one() {
        let store = GarmentStore::open_in_memory().unwrap();
        let id = store.insert_garment(&new_garment("Kurta", "red")).unwrap();

        assert!(store.increment_wear_count(id).unwrap());
        assert_eq!(store.get_garment(id).unwrap().unwrap().wear_count, 1);
        assert!(store.increment_wear_count(id).unwrap());
        assert_eq!(store.get_garment(id).unwrap().unwrap().wear_count, 2);
    }

    #[test]
    fn test_missing_garment_is_not_an_error() {
        let mut store = GarmentStore::open_in_memory().unwrap();
        assert!(!store.increment_wear_count(42).unwrap());
        assert!(store.get_garment(42).unwrap().is_none());
        assert!(store.delete_garment(42).unwrap().is_none());
    }

    #[test]
    fn test_delete_returns_removed_row() {
        let mut store = GarmentStore::open_in_memory().unwrap();
        let id = store.insert_garment(&new_garment("Dress", "red")).unwrap();

        let removed = store.delete_garment(id).unwrap().unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(removed.image_path, "Dress.jpg");
        assert!(store.list_garments().unwrap().is_empty());
    }

    #[test]
    fn test_tone_counters_persist_and_reset() {
        let store = GarmentStore::open_in_memory().unwrap();
        assert_eq!(store.tone_counts().unwrap(), ToneTally::default());

        store.increment_tone(ToneSignal::Cool).unwrap();
        store.increment_tone(ToneSignal::Cool).unwrap();
        store.increment_tone(ToneSignal::Warm).unwrap();
        assert_eq!(store.tone_counts().unwrap(), ToneTally::new(2, 1));

        store.reset_tone().unwrap();
        assert_eq!(store.tone_counts().unwrap(), ToneTally::default());
    }

    #[test]
    fn test_image_hash_lookup() {
        let store = GarmentStore::open_in_memory().unwrap();
        assert!(store.find_image_by_hash("abc").unwrap().is_none());

        let inserted = store.insert_image("shirt.png", "abc", "x.png", "blue").unwrap();
        let found = store.find_image_by_hash("abc").unwrap().unwrap();
        assert_eq!(found, inserted);
        assert!(store.insert_image("again.png", "abc", "y.png", "blue").is_err());
    }

    #[test]
    fn test_open_on_disk_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("wardrobe-db-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("wardrobe.db");
        {
            let store = GarmentStore::open(&path).unwrap();
            store.insert_garment(&new_garment("Coat", "black")).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
        }
        let reopened = GarmentStore::open(&path).unwrap();
        assert_eq!(reopened.garment_count().unwrap(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
