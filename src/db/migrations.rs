//! Database schema versioning.
//!
//! The schema is versioned by a single integer recorded in `db_versions`.
//! A fresh database receives the version-1 schema from [`init`]; every later
//! change is a numbered [`Migration`] applied by [`MigrationManager::upgrade`].
//!
//! ## Rules
//!
//! - **Append-only**: published migrations are never edited or removed
//! - **Forward-only**: a database newer than the binary is refused with
//!   [`DbError::DowngradeDetected`]
//! - **Atomic**: each migration and its `db_versions` row commit together
//!
//! ## Usage
//!
//! ```rust
//! use hours::db::migrations::{current_version, init, MigrationManager, LATEST_VERSION};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! init(&mut conn)?;
//! MigrationManager::new().upgrade(&mut conn)?;
//! assert_eq!(current_version(&conn)?, LATEST_VERSION);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use super::error::DbError;
use crate::libs::time::{now_utc, to_db_ts};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Transaction};
use tracing::{debug, info, warn};

/// Highest schema version this binary knows how to produce.
pub const LATEST_VERSION: u32 = 2;

/// Message raised by the active log guard trigger.
pub const ACTIVE_LOG_GUARD_MESSAGE: &str = "Only one active row is allowed";

/// Version-1 schema.
///
/// The trigger is the storage-level guarantee that at most one log is
/// active at any time.
const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS db_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    summary TEXT NOT NULL,
    secs_spent INTEGER NOT NULL DEFAULT 0,
    active BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL,
    begin_ts TEXT NOT NULL,
    end_ts TEXT,
    secs_spent INTEGER NOT NULL DEFAULT 0,
    comment VARCHAR(255),
    active BOOLEAN NOT NULL,
    FOREIGN KEY(task_id) REFERENCES task(id)
);

CREATE TRIGGER IF NOT EXISTS prevent_duplicate_active_insert
BEFORE INSERT ON task_log
BEGIN
    SELECT CASE
        WHEN EXISTS (SELECT 1 FROM task_log WHERE active = 1) AND NEW.active = 1
        THEN RAISE(ABORT, 'Only one active row is allowed')
    END;
END;
";

const INSERT_VERSION: &str = "INSERT INTO db_versions (version, created_at) VALUES (?1, ?2)";

/// A single forward schema change.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version the database is at once this migration has run
    pub version: u32,
    /// Short description, shown by `hours migrations history`
    pub name: &'static str,
    /// Runs the migration's SQL inside the migration transaction
    pub up: fn(&Transaction) -> rusqlite::Result<()>,
}

/// Registry of forward migrations and the logic to apply them.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationManager {
    /// Creates a manager holding the built-in migrations.
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    /// Creates a manager over an explicit registry.
    pub fn with_migrations(mut migrations: Vec<Migration>) -> Self {
        migrations.sort_by_key(|m| m.version);
        Self { migrations }
    }

    /// Registers the built-in migrations in version order.
    ///
    /// Version 1 is the base schema created by [`init`] and has no entry here.
    fn register_migrations(&mut self) {
        // Version 2: lookups by task and range scans over finished logs
        self.add_migration(2, "add_task_log_indices", |tx| {
            tx.execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_task_log_task_id ON task_log(task_id);
                 CREATE INDEX IF NOT EXISTS idx_task_log_end_ts ON task_log(end_ts);",
            )
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> rusqlite::Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Highest version in the registry; 1 when nothing is registered.
    pub fn latest_version(&self) -> u32 {
        self.migrations.iter().map(|m| m.version).max().unwrap_or(1).max(1)
    }

    /// Brings the database up to [`latest_version`](Self::latest_version).
    ///
    /// Each pending migration runs in its own transaction together with the
    /// `db_versions` row that records it. A failing migration is rolled back
    /// and reported as [`DbError::MigrationFailed`]; earlier migrations stay
    /// applied.
    pub fn upgrade(&self, conn: &mut Connection) -> Result<(), DbError> {
        let current = current_version(conn)?;
        let latest = self.latest_version();

        if current > latest {
            warn!(db_version = current, latest, "database is newer than this binary");
            return Err(DbError::DowngradeDetected { db_version: current, latest });
        }

        if current == latest {
            debug!(version = current, "database is up to date");
            return Ok(());
        }

        for version in (current + 1)..=latest {
            let migration = self
                .migrations
                .iter()
                .find(|m| m.version == version)
                .ok_or_else(|| DbError::MigrationFailed {
                    version,
                    source: rusqlite::Error::QueryReturnedNoRows,
                })?;

            info!(version, name = migration.name, "running migration");
            apply(conn, migration)?;
        }

        info!(version = latest, "all migrations completed");
        Ok(())
    }

    /// Lists recorded versions with the time they were applied.
    pub fn history(&self, conn: &Connection) -> Result<Vec<(u32, DateTime<Local>)>, DbError> {
        if !has_versions_table(conn)? {
            return Ok(Vec::new());
        }

        let mut stmt = conn
            .prepare("SELECT version, created_at FROM db_versions ORDER BY version, id")
            .map_err(DbError::FetchFailed)?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, super::db::ts_column(row, 1)?)))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(DbError::FetchFailed)?;

        Ok(history)
    }

    /// Name of a registered migration, used when listing history.
    pub fn name_of(&self, version: u32) -> Option<&'static str> {
        if version == 1 {
            return Some("initial_schema");
        }
        self.migrations.iter().find(|m| m.version == version).map(|m| m.name)
    }
}

fn apply(conn: &mut Connection, migration: &Migration) -> Result<(), DbError> {
    let version = migration.version;
    let failed = |source| DbError::MigrationFailed { version, source };

    let tx = conn.transaction().map_err(failed)?;
    let result = (migration.up)(&tx).and_then(|_| tx.execute(INSERT_VERSION, params![version, to_db_ts(&now_utc())]));

    match result {
        Ok(_) => tx.commit().map_err(failed),
        Err(source) => match tx.rollback() {
            Ok(()) => Err(failed(source)),
            Err(rollback) => Err(DbError::RollbackFailed {
                rollback,
                source: Box::new(failed(source)),
            }),
        },
    }
}

/// Creates the version-1 schema on a database that has no tables yet.
///
/// Databases that already contain tables are left untouched.
pub fn init(conn: &mut Connection) -> Result<(), DbError> {
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .map_err(DbError::SchemaInitFailed)?;

    if tables > 0 {
        debug!(tables, "database already initialized");
        return Ok(());
    }

    let tx = conn.transaction().map_err(DbError::SchemaInitFailed)?;
    tx.execute_batch(SCHEMA_V1).map_err(DbError::SchemaInitFailed)?;
    tx.execute(INSERT_VERSION, params![1u32, to_db_ts(&now_utc())])
        .map_err(DbError::SchemaInitFailed)?;
    tx.commit().map_err(DbError::SchemaInitFailed)?;

    info!("initialized database schema at version 1");
    Ok(())
}

/// Largest version recorded in `db_versions`, or 0 if none.
pub fn current_version(conn: &Connection) -> Result<u32, DbError> {
    if !has_versions_table(conn)? {
        return Ok(0);
    }

    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM db_versions", [], |row| row.get(0))
        .map_err(DbError::FetchFailed)?;

    Ok(version.unwrap_or(0))
}

/// Whether the database is behind the binary's latest version.
pub fn needs_migration(conn: &Connection) -> Result<bool, DbError> {
    Ok(current_version(conn)? < MigrationManager::new().latest_version())
}

fn has_versions_table(conn: &Connection) -> Result<bool, DbError> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'db_versions')",
        [],
        |row| row.get(0),
    )
    .map_err(DbError::FetchFailed)
}
