//! `SQLite` sequence store.
//!
//! One row per `(category, period_key)`, guarded by the primary key:
//!
//! ```sql
//! CREATE TABLE sequences (
//!     category       TEXT    NOT NULL,
//!     period_key     TEXT    NOT NULL,
//!     last_sequence  INTEGER NOT NULL,
//!     formatted_code TEXT    NOT NULL,
//!     PRIMARY KEY (category, period_key)
//! );
//! ```
//!
//! The first code of a period is an `INSERT`, which the primary key rejects
//! if another writer got there first. Later codes are an `UPDATE` guarded by
//! `last_sequence = expected`. Either way a lost race surfaces as
//! [`StoreError::Conflict`], including across processes sharing the file.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::code::PeriodKey;
use crate::error::StoreError;
use crate::ports::{SequenceKey, SequenceRecord, SequenceStore};

/// Default busy timeout while another process holds the write lock.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sequences (
    category       TEXT    NOT NULL,
    period_key     TEXT    NOT NULL,
    last_sequence  INTEGER NOT NULL,
    formatted_code TEXT    NOT NULL,
    PRIMARY KEY (category, period_key)
)";

/// Sequence store backed by a `SQLite` database file.
pub struct SqliteSequenceStore {
    conn: Mutex<Connection>,
}

impl SqliteSequenceStore {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open {}: {e}", path.display())))?;
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS)).map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Backend("sqlite connection lock poisoned".into()))
    }
}

fn db_err(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(format!("sqlite: {err}"))
}

fn to_sql_int(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Backend(format!("sequence {value} exceeds i64")))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, i64, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_record(
    (category, period, last, code): (String, String, i64, String),
) -> Result<SequenceRecord, StoreError> {
    Ok(SequenceRecord {
        category,
        period: PeriodKey::new(period)
            .map_err(|e| StoreError::Backend(format!("corrupt period key: {e}")))?,
        last_sequence: u64::try_from(last)
            .map_err(|_| StoreError::Backend(format!("corrupt sequence value {last}")))?,
        formatted_code: code,
    })
}

impl SequenceStore for SqliteSequenceStore {
    fn get(&self, key: &SequenceKey) -> Result<Option<SequenceRecord>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT category, period_key, last_sequence, formatted_code
                 FROM sequences WHERE category = ?1 AND period_key = ?2",
                params![key.category, key.period.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(db_err)?;
        row.map(into_record).transpose()
    }

    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        record: &SequenceRecord,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let next = to_sql_int(record.last_sequence)?;
        match expected {
            None => {
                let result = conn.execute(
                    "INSERT INTO sequences (category, period_key, last_sequence, formatted_code)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![record.category, record.period.as_str(), next, record.formatted_code],
                );
                match result {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        Err(StoreError::Conflict)
                    }
                    Err(err) => Err(db_err(err)),
                }
            }
            Some(prev) => {
                let changed = conn
                    .execute(
                        "UPDATE sequences SET last_sequence = ?3, formatted_code = ?4
                         WHERE category = ?1 AND period_key = ?2 AND last_sequence = ?5",
                        params![
                            record.category,
                            record.period.as_str(),
                            next,
                            record.formatted_code,
                            to_sql_int(prev)?
                        ],
                    )
                    .map_err(db_err)?;
                if changed == 0 {
                    return Err(StoreError::Conflict);
                }
                Ok(())
            }
        }
    }

    fn list(&self, category: Option<&str>) -> Result<Vec<SequenceRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT category, period_key, last_sequence, formatted_code
                 FROM sequences WHERE ?1 IS NULL OR category = ?1
                 ORDER BY category, period_key",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![category], row_to_record).map_err(db_err)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(into_record(row.map_err(db_err)?)?);
        }
        Ok(records)
    }
}
