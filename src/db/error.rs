use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to fetch data: {0}")]
    FetchFailed(#[source] rusqlite::Error),
    #[error("failed to update data: {0}")]
    UpdateFailed(#[source] rusqlite::Error),
    #[error("a task is already being tracked")]
    AlreadyActive,
    #[error("no task is being tracked")]
    NoActiveLog,
    #[error("task {0} does not exist")]
    TaskNotFound(i64),
    #[error("task log {0} does not exist")]
    LogNotFound(i64),
    #[error("rollback failed ({rollback}) after: {source}")]
    RollbackFailed {
        rollback: rusqlite::Error,
        #[source]
        source: Box<DbError>,
    },
    #[error("failed to initialize database schema: {0}")]
    SchemaInitFailed(#[source] rusqlite::Error),
    #[error("database is at version {db_version}, newer than the latest version this binary knows ({latest})")]
    DowngradeDetected { db_version: u32, latest: u32 },
    #[error("migration to version {version} failed: {source}")]
    MigrationFailed {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },
}

impl DbError {
    /// Errors that leave the database unusable for this binary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DbError::Open { .. } | DbError::SchemaInitFailed(_) | DbError::DowngradeDetected { .. } | DbError::MigrationFailed { .. }
        )
    }
}
