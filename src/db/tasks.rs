//! Task storage.
//!
//! Tasks are never deleted; hiding one from the active list is done with
//! [`Tasks::set_active`]. The `secs_spent` aggregate is maintained by the
//! task log operations in [`super::task_logs`], this module only reads it.
//!
//! Writes take the instant to stamp into `created_at`/`updated_at` from the
//! caller, so an injected clock governs them too.

use super::db::{ts_column, Db};
use super::error::DbError;
use crate::libs::task::Task;
use crate::libs::time::to_db_ts;
use chrono::{DateTime, Local};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

const INSERT_TASK: &str = "INSERT INTO task (summary, secs_spent, active, created_at, updated_at) VALUES (?1, 0, 1, ?2, ?2)";
const SELECT_BY_ID: &str = "SELECT id, summary, secs_spent, active, created_at, updated_at FROM task WHERE id = ?1";
const SELECT_BY_ACTIVE: &str = "SELECT id, summary, secs_spent, active, created_at, updated_at FROM task
    WHERE active = ?1
    ORDER BY updated_at DESC, id DESC
    LIMIT ?2";
const UPDATE_SUMMARY: &str = "UPDATE task SET summary = ?1, updated_at = ?2 WHERE id = ?3";
const UPDATE_ACTIVE: &str = "UPDATE task SET active = ?1, updated_at = ?2 WHERE id = ?3";
const SELECT_AGGREGATE: &str = "SELECT secs_spent, updated_at FROM task WHERE id = ?1";

pub struct Tasks {
    db: Db,
}

impl Tasks {
    pub fn new(db: &Db) -> Self {
        Tasks { db: db.clone() }
    }

    /// Creates an active task with no time spent, created at `now`.
    pub fn insert(&self, summary: &str, now: DateTime<Local>) -> Result<Task, DbError> {
        let id = {
            let conn = self.db.lock();
            conn.execute(INSERT_TASK, params![summary, to_db_ts(&now)])
                .map_err(DbError::UpdateFailed)?;
            conn.last_insert_rowid()
        };

        info!(task_id = id, "created task");
        self.fetch(id)?.ok_or(DbError::TaskNotFound(id))
    }

    pub fn fetch(&self, id: i64) -> Result<Option<Task>, DbError> {
        let conn = self.db.lock();
        conn.query_row(SELECT_BY_ID, params![id], map_task)
            .optional()
            .map_err(DbError::FetchFailed)
    }

    /// Tasks with the given visibility, most recently touched first.
    pub fn fetch_all(&self, active: bool, limit: u32) -> Result<Vec<Task>, DbError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(SELECT_BY_ACTIVE).map_err(DbError::FetchFailed)?;

        let tasks = stmt
            .query_map(params![active, limit], map_task)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(DbError::FetchFailed)?;

        debug!(count = tasks.len(), active, "fetched tasks");
        Ok(tasks)
    }

    pub fn update_summary(&self, id: i64, summary: &str, now: DateTime<Local>) -> Result<(), DbError> {
        let conn = self.db.lock();
        let affected = conn
            .execute(UPDATE_SUMMARY, params![summary, to_db_ts(&now), id])
            .map_err(DbError::UpdateFailed)?;

        if affected == 0 {
            return Err(DbError::TaskNotFound(id));
        }
        info!(task_id = id, "updated task summary");
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool, now: DateTime<Local>) -> Result<(), DbError> {
        let conn = self.db.lock();
        let affected = conn
            .execute(UPDATE_ACTIVE, params![active, to_db_ts(&now), id])
            .map_err(DbError::UpdateFailed)?;

        if affected == 0 {
            return Err(DbError::TaskNotFound(id));
        }
        info!(task_id = id, active, "updated task visibility");
        Ok(())
    }

    /// Reloads the aggregate and `updated_at` into `task`.
    pub fn refresh(&self, task: &mut Task) -> Result<(), DbError> {
        let conn = self.db.lock();
        let (secs_spent, updated_at) = conn
            .query_row(SELECT_AGGREGATE, params![task.id], |row| Ok((row.get(0)?, ts_column(row, 1)?)))
            .optional()
            .map_err(DbError::FetchFailed)?
            .ok_or(DbError::TaskNotFound(task.id))?;

        task.secs_spent = secs_spent;
        task.updated_at = updated_at;
        Ok(())
    }
}

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        summary: row.get(1)?,
        secs_spent: row.get(2)?,
        active: row.get(3)?,
        created_at: ts_column(row, 4)?,
        updated_at: ts_column(row, 5)?,
    })
}
