//! SQLite adapter: Implementation of PatientStore.
//!
//! Provides local persistence for patient records.
//!
//! # Mutex Behavior
//!
//! Database connection is protected by `Mutex`. A poisoned mutex (from panic
//! in another thread) will cause panic. This fail-fast behavior is intentional
//! for data integrity in healthcare applications.
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::PatientRecord;
use crate::ports::{PatientStore, PatientUpdate, RecordPage, StoredPatient};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid page request: page={page}, per_page={per_page}")]
    InvalidPage { page: usize, per_page: usize },
}

const RECORD_COLUMNS: &str = "id, age, gender, height, weight, ap_hi, ap_lo, \
                              cholesterol, gluc, smoke, alco, active, cardio";

/// SQLite storage adapter.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store with the given database path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS cardio_health (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                age INTEGER NOT NULL,
                gender INTEGER NOT NULL CHECK (gender IN (0, 1)),
                height REAL NOT NULL,
                weight REAL NOT NULL,
                ap_hi INTEGER NOT NULL,
                ap_lo INTEGER NOT NULL,
                cholesterol INTEGER NOT NULL CHECK (cholesterol BETWEEN 1 AND 3),
                gluc INTEGER NOT NULL CHECK (gluc BETWEEN 1 AND 3),
                smoke INTEGER NOT NULL DEFAULT 0,
                alco INTEGER NOT NULL DEFAULT 0,
                active INTEGER NOT NULL DEFAULT 0,
                cardio INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;

        Ok(())
    }

    /// Map one `cardio_health` row (selected with `RECORD_COLUMNS`).
    ///
    /// Out-of-range small integers surface as conversion errors.
    fn stored_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredPatient> {
        Ok(StoredPatient {
            id: row.get(0)?,
            record: PatientRecord {
                age: row.get(1)?,
                gender: row.get(2)?,
                height: row.get(3)?,
                weight: row.get(4)?,
                ap_hi: row.get(5)?,
                ap_lo: row.get(6)?,
                cholesterol: row.get(7)?,
                gluc: row.get(8)?,
                smoke: row.get(9)?,
                alco: row.get(10)?,
                active: row.get(11)?,
                cardio: row.get(12)?,
            },
        })
    }

    fn query_stored(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredPatient>, StorageError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, Self::stored_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn write_record(conn: &Connection, id: i64, r: &PatientRecord) -> Result<(), StorageError> {
        conn.execute(
            r"
            UPDATE cardio_health SET
                age = ?2, gender = ?3, height = ?4, weight = ?5, ap_hi = ?6, ap_lo = ?7,
                cholesterol = ?8, gluc = ?9, smoke = ?10, alco = ?11, active = ?12, cardio = ?13
            WHERE id = ?1
            ",
            params![
                id,
                r.age,
                r.gender,
                r.height,
                r.weight,
                r.ap_hi,
                r.ap_lo,
                r.cholesterol,
                r.gluc,
                r.smoke,
                r.alco,
                r.active,
                r.cardio,
            ],
        )?;
        Ok(())
    }
}

impl PatientStore for SqliteStore {
    type Error = StorageError;

    fn fetch_all_records(&self) -> Result<Vec<PatientRecord>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let sql = format!("SELECT {RECORD_COLUMNS} FROM cardio_health ORDER BY id");
        let stored = Self::query_stored(&conn, &sql, [])?;
        tracing::debug!("Loaded {} records from storage", stored.len());
        Ok(stored.into_iter().map(|s| s.record).collect())
    }

    fn fetch_record(&self, id: i64) -> Result<Option<PatientRecord>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let sql = format!("SELECT {RECORD_COLUMNS} FROM cardio_health WHERE id = ?1");
        let stored = conn
            .query_row(&sql, params![id], Self::stored_from_row)
            .optional()?;
        Ok(stored.map(|s| s.record))
    }

    fn insert_record(&self, r: &PatientRecord) -> Result<i64, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        conn.execute(
            r"
            INSERT INTO cardio_health (
                age, gender, height, weight, ap_hi, ap_lo,
                cholesterol, gluc, smoke, alco, active, cardio
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
            params![
                r.age,
                r.gender,
                r.height,
                r.weight,
                r.ap_hi,
                r.ap_lo,
                r.cholesterol,
                r.gluc,
                r.smoke,
                r.alco,
                r.active,
                r.cardio,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Inserted record patient_id={id}");
        Ok(id)
    }

    fn update_record(
        &self,
        id: i64,
        update: &PatientUpdate,
    ) -> Result<Option<PatientRecord>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let sql = format!("SELECT {RECORD_COLUMNS} FROM cardio_health WHERE id = ?1");
        let Some(StoredPatient { mut record, .. }) = conn
            .query_row(&sql, params![id], Self::stored_from_row)
            .optional()?
        else {
            return Ok(None);
        };

        update.apply_to(&mut record);
        Self::write_record(&conn, id, &record)?;

        tracing::debug!("Updated record patient_id={id}");
        Ok(Some(record))
    }

    fn load_page(&self, page: usize, per_page: usize) -> Result<RecordPage, Self::Error> {
        if page == 0 || per_page == 0 {
            return Err(StorageError::InvalidPage { page, per_page });
        }
        let conn = self.conn.lock().expect("Lock failed");

        let total_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM cardio_health", [], |row| row.get(0))?;

        let offset = (page - 1) * per_page;
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM cardio_health ORDER BY id LIMIT ?1 OFFSET ?2"
        );
        let items = Self::query_stored(&conn, &sql, params![per_page as i64, offset as i64])?;

        Ok(RecordPage::new(items, total_count as usize, page, per_page))
    }

    fn count_records(&self) -> Result<usize, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM cardio_health", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_record, synthetic_cohort};

    #[test]
    fn test_insert_and_fetch() {
        let store = SqliteStore::in_memory().expect("Should create db");
        assert_eq!(store.count_records().expect("Should count"), 0);

        let record = sample_record();
        let id = store.insert_record(&record).expect("Should insert");

        let loaded = store
            .fetch_record(id)
            .expect("Should fetch")
            .expect("Should exist");
        assert_eq!(loaded, record);
        assert!(store.fetch_record(id + 1).expect("Should fetch").is_none());
    }

    #[test]
    fn test_fetch_all_preserves_insertion_order() {
        let store = SqliteStore::in_memory().expect("Should create db");
        let cohort = synthetic_cohort(12, 5);
        for r in &cohort {
            store.insert_record(r).expect("Should insert");
        }
        assert_eq!(store.fetch_all_records().expect("Should load"), cohort);
    }

    #[test]
    fn test_partial_update() {
        let store = SqliteStore::in_memory().expect("Should create db");
        let id = store.insert_record(&sample_record()).expect("Should insert");

        let update = PatientUpdate {
            ap_hi: Some(150),
            cholesterol: Some(3),
            ..Default::default()
        };
        let updated = store
            .update_record(id, &update)
            .expect("Should update")
            .expect("Should exist");
        assert_eq!(updated.ap_hi, 150);
        assert_eq!(updated.cholesterol, 3);
        assert_eq!(updated.ap_lo, sample_record().ap_lo);

        let reloaded = store
            .fetch_record(id)
            .expect("Should fetch")
            .expect("Should exist");
        assert_eq!(reloaded, updated);

        assert!(store
            .update_record(id + 100, &update)
            .expect("Should run")
            .is_none());
    }

    #[test]
    fn test_pagination() {
        let store = SqliteStore::in_memory().expect("Should create db");
        for r in synthetic_cohort(25, 9) {
            store.insert_record(&r).expect("Should insert");
        }

        let first = store.load_page(1, 10).expect("Should page");
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_count, 25);
        assert!(first.has_more);
        assert_eq!(first.items[0].id, 1);

        let last = store.load_page(3, 10).expect("Should page");
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_more);
        assert_eq!(last.items[0].id, 21);

        assert!(matches!(
            store.load_page(0, 10),
            Err(StorageError::InvalidPage { .. })
        ));
    }
}
