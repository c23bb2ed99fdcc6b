use super::error::DbError;
use super::migrations::{self, MigrationManager};
use crate::libs::time::from_db_ts;
use chrono::{DateTime, Local};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{types::Type, Connection, Row, Transaction};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Versioned database file name, placed in the home directory by default.
pub const DB_FILE_NAME: &str = "hours.v1.db";

/// The single database handle of the process.
///
/// Cloning a `Db` shares the same connection. Every repository call locks it
/// for its whole duration, so at most one operation is in flight at a time.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Opens the database at `path`, creating the schema and applying
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Db, DbError> {
        let conn = Self::connect(path)?;
        Self::prepare(conn, &MigrationManager::new())
    }

    /// Opens a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Db, DbError> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::prepare(conn, &MigrationManager::new())
    }

    /// Opens a raw connection without touching the schema.
    ///
    /// Used by the migration tooling, which has to inspect databases that
    /// the binary would refuse to upgrade.
    pub fn open_without_migrations(path: &Path) -> Result<Connection, DbError> {
        Self::connect(path)
    }

    fn connect(path: &Path) -> Result<Connection, DbError> {
        debug!(path = %path.display(), "opening database");
        Connection::open(path).map_err(|source| DbError::Open {
            path: path.display().to_string(),
            source,
        })
    }

    fn prepare(mut conn: Connection, manager: &MigrationManager) -> Result<Db, DbError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(DbError::SchemaInitFailed)?;
        migrations::init(&mut conn)?;
        manager.upgrade(&mut conn)?;

        Ok(Db {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Locks the connection for one operation.
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

/// Runs `f` in a transaction that commits on success and rolls back on error.
///
/// A failed rollback is reported as [`DbError::RollbackFailed`] wrapping the
/// error that triggered it.
pub(crate) fn with_transaction<T>(conn: &mut Connection, f: impl FnOnce(&Transaction) -> Result<T, DbError>) -> Result<T, DbError> {
    let tx = conn.transaction().map_err(DbError::UpdateFailed)?;

    match f(&tx) {
        Ok(value) => {
            tx.commit().map_err(DbError::UpdateFailed)?;
            Ok(value)
        }
        Err(err) => match tx.rollback() {
            Ok(()) => Err(err),
            Err(rollback) => Err(DbError::RollbackFailed {
                rollback,
                source: Box::new(err),
            }),
        },
    }
}

/// Reads a stored UTC timestamp column as local time.
pub(crate) fn ts_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Local>> {
    let value: String = row.get(idx)?;
    from_db_ts(&value).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn opt_ts_column(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Local>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(value) => from_db_ts(&value)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}
