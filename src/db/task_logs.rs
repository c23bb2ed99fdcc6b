//! Task log storage and the active log lifecycle.
//!
//! A task log is *active* while work on it is in progress (`end_ts` is NULL)
//! and *closed* once finished. At most one active log exists at any time;
//! the `prevent_duplicate_active_insert` trigger enforces that and its
//! rejection surfaces here as [`DbError::AlreadyActive`].
//!
//! ## Aggregate maintenance
//!
//! Every write that adds or removes a closed log also adjusts the parent
//! task's `secs_spent` and sets its `updated_at` to the caller's `now`
//! inside the same transaction:
//!
//! | Operation | Parent aggregate |
//! |-----------|------------------|
//! | [`TaskLogs::finish_active_log`] | `+= secs_spent` |
//! | [`TaskLogs::quick_switch_active`] | `+= secs_spent` of the closed log |
//! | [`TaskLogs::insert_manual_log`] | `+= secs_spent` |
//! | [`TaskLogs::delete_log`] | `-= secs_spent` |
//! | [`TaskLogs::delete_active_log`] | unchanged |
//!
//! ## Usage
//!
//! ```rust
//! use hours::db::{db::Db, task_logs::TaskLogs, tasks::Tasks};
//! use chrono::{Duration, Local};
//!
//! let db = Db::open_in_memory()?;
//! let now = Local::now();
//! let task = Tasks::new(&db).insert("write docs", now)?;
//! let logs = TaskLogs::new(&db);
//!
//! let begin = now - Duration::hours(1);
//! logs.insert_active_log(task.id, begin, None)?;
//! logs.finish_active_log(task.id, begin, now, Some("first draft"), now)?;
//! assert!(logs.fetch_active_log_details()?.is_none());
//! # Ok::<(), hours::db::error::DbError>(())
//! ```

use super::db::{opt_ts_column, ts_column, with_transaction, Db};
use super::error::DbError;
use super::migrations::ACTIVE_LOG_GUARD_MESSAGE;
use crate::libs::task::{ActiveLogDetails, TaskLog};
use crate::libs::time::{to_db_ts, MIN_LOG_DURATION_SECS};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

const SELECT_ACTIVE_DETAILS: &str = "SELECT t.id, t.summary, tl.id, tl.begin_ts, tl.comment
    FROM task_log tl JOIN task t ON tl.task_id = t.id
    WHERE tl.active = 1";
const SELECT_ACTIVE_ROW: &str = "SELECT id, task_id, begin_ts, comment FROM task_log WHERE active = 1";
const INSERT_ACTIVE: &str = "INSERT INTO task_log (task_id, begin_ts, comment, active) VALUES (?1, ?2, ?3, 1)";
const INSERT_CLOSED: &str = "INSERT INTO task_log (task_id, begin_ts, end_ts, secs_spent, comment, active) VALUES (?1, ?2, ?3, ?4, ?5, 0)";
const UPDATE_ACTIVE_BEGIN: &str = "UPDATE task_log SET begin_ts = ?1 WHERE active = 1";
const UPDATE_ACTIVE_COMMENT: &str = "UPDATE task_log SET comment = ?1 WHERE active = 1";
const CLOSE_LOG: &str = "UPDATE task_log SET active = 0, begin_ts = ?1, end_ts = ?2, secs_spent = ?3, comment = ?4 WHERE id = ?5";
const DELETE_ACTIVE: &str = "DELETE FROM task_log WHERE active = 1";
const DELETE_BY_ID: &str = "DELETE FROM task_log WHERE id = ?1";
const SELECT_CLOSED_SECS: &str = "SELECT task_id, secs_spent FROM task_log WHERE id = ?1 AND active = 0";
const ADD_TASK_SECS: &str = "UPDATE task SET secs_spent = secs_spent + ?1, updated_at = ?2 WHERE id = ?3";
const SELECT_LOGS: &str = "SELECT tl.id, tl.task_id, t.summary, tl.begin_ts, tl.end_ts, tl.secs_spent, tl.comment, tl.active
    FROM task_log tl JOIN task t ON tl.task_id = t.id";

/// The active row as read inside a transaction.
struct ActiveRow {
    id: i64,
    task_id: i64,
    begin_ts: DateTime<Local>,
    comment: Option<String>,
}

pub struct TaskLogs {
    db: Db,
}

impl TaskLogs {
    pub fn new(db: &Db) -> Self {
        TaskLogs { db: db.clone() }
    }

    /// The active log with its task, or `None` when nothing is tracked.
    pub fn fetch_active_log_details(&self) -> Result<Option<ActiveLogDetails>, DbError> {
        let conn = self.db.lock();
        conn.query_row(SELECT_ACTIVE_DETAILS, [], |row| {
            Ok(ActiveLogDetails {
                task_id: row.get(0)?,
                task_summary: row.get(1)?,
                current_log_id: row.get(2)?,
                current_begin_ts: ts_column(row, 3)?,
                current_comment: row.get(4)?,
            })
        })
        .optional()
        .map_err(DbError::FetchFailed)
    }

    /// Opens a new active log.
    ///
    /// Fails with [`DbError::AlreadyActive`] when another log is active.
    pub fn insert_active_log(&self, task_id: i64, begin: DateTime<Local>, comment: Option<&str>) -> Result<i64, DbError> {
        let conn = self.db.lock();
        let id = insert_active(&conn, task_id, begin, comment)?;
        info!(task_id, log_id = id, "started tracking");
        Ok(id)
    }

    /// Updates the supplied fields of the active log.
    ///
    /// `comment: Some(None)` clears the comment, `None` keeps it.
    pub fn edit_active_log(&self, begin: Option<DateTime<Local>>, comment: Option<Option<&str>>) -> Result<(), DbError> {
        let mut conn = self.db.lock();
        with_transaction(&mut conn, |tx| {
            if active_row(tx)?.is_none() {
                return Err(DbError::NoActiveLog);
            }
            if let Some(begin) = begin {
                tx.execute(UPDATE_ACTIVE_BEGIN, params![to_db_ts(&begin)])
                    .map_err(DbError::UpdateFailed)?;
            }
            if let Some(comment) = comment {
                tx.execute(UPDATE_ACTIVE_COMMENT, params![comment])
                    .map_err(DbError::UpdateFailed)?;
            }
            Ok(())
        })?;

        info!("edited active log");
        Ok(())
    }

    /// Closes the active log of `task_id` and adds its time to the task.
    pub fn finish_active_log(
        &self,
        task_id: i64,
        begin: DateTime<Local>,
        end: DateTime<Local>,
        comment: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<i64, DbError> {
        let mut conn = self.db.lock();
        let (id, secs_spent) = with_transaction(&mut conn, |tx| {
            let active = active_row(tx)?
                .filter(|row| row.task_id == task_id)
                .ok_or(DbError::NoActiveLog)?;

            let secs_spent = close_log(tx, active.id, task_id, begin, end, comment, now)?;
            Ok((active.id, secs_spent))
        })?;

        info!(task_id, log_id = id, secs_spent, "finished tracking");
        Ok(id)
    }

    /// Closes the active log at `now` and opens one on `new_task_id` in a
    /// single transaction.
    ///
    /// A log younger than a minute is dropped rather than closed, so that
    /// no closed log is ever shorter than [`MIN_LOG_DURATION_SECS`].
    pub fn quick_switch_active(&self, new_task_id: i64, now: DateTime<Local>, comment: Option<&str>) -> Result<i64, DbError> {
        let mut conn = self.db.lock();
        let id = with_transaction(&mut conn, |tx| {
            let active = active_row(tx)?.ok_or(DbError::NoActiveLog)?;

            if (now - active.begin_ts).num_seconds() < MIN_LOG_DURATION_SECS {
                debug!(log_id = active.id, "dropping sub-minute log on switch");
                tx.execute(DELETE_BY_ID, params![active.id])
                    .map_err(DbError::UpdateFailed)?;
            } else {
                close_log(tx, active.id, active.task_id, active.begin_ts, now, active.comment.as_deref(), now)?;
            }

            insert_active(tx, new_task_id, now, comment)
        })?;

        info!(task_id = new_task_id, log_id = id, "switched tracking");
        Ok(id)
    }

    /// Drops the active log without recording any time.
    pub fn delete_active_log(&self) -> Result<(), DbError> {
        let conn = self.db.lock();
        let affected = conn.execute(DELETE_ACTIVE, []).map_err(DbError::UpdateFailed)?;
        if affected == 0 {
            return Err(DbError::NoActiveLog);
        }
        info!("discarded active log");
        Ok(())
    }

    /// Records an already finished interval and adds its time to the task.
    pub fn insert_manual_log(
        &self,
        task_id: i64,
        begin: DateTime<Local>,
        end: DateTime<Local>,
        comment: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<i64, DbError> {
        let mut conn = self.db.lock();
        let secs_spent = (end - begin).num_seconds();
        let id = with_transaction(&mut conn, |tx| {
            tx.execute(INSERT_CLOSED, params![task_id, to_db_ts(&begin), to_db_ts(&end), secs_spent, comment])
                .map_err(DbError::UpdateFailed)?;
            let id = tx.last_insert_rowid();
            add_task_secs(tx, task_id, secs_spent, now)?;
            Ok(id)
        })?;

        info!(task_id, log_id = id, secs_spent, "inserted log");
        Ok(id)
    }

    /// Deletes a closed log and takes its time off the task.
    ///
    /// The amount removed is the stored `secs_spent` of the row, not the
    /// value carried by `log`.
    pub fn delete_log(&self, log: &TaskLog, now: DateTime<Local>) -> Result<(), DbError> {
        let mut conn = self.db.lock();
        with_transaction(&mut conn, |tx| {
            let (task_id, secs_spent): (i64, i64) = tx
                .query_row(SELECT_CLOSED_SECS, params![log.id], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()
                .map_err(DbError::FetchFailed)?
                .ok_or(DbError::LogNotFound(log.id))?;

            tx.execute(DELETE_BY_ID, params![log.id]).map_err(DbError::UpdateFailed)?;
            add_task_secs(tx, task_id, -secs_spent, now)
        })?;

        info!(log_id = log.id, "deleted log");
        Ok(())
    }

    pub fn fetch_log(&self, id: i64) -> Result<Option<TaskLog>, DbError> {
        let conn = self.db.lock();
        conn.query_row(&format!("{SELECT_LOGS} WHERE tl.id = ?1"), params![id], map_log)
            .optional()
            .map_err(DbError::FetchFailed)
    }

    /// The latest (or earliest, with `desc = false`) closed logs.
    pub fn fetch_logs(&self, desc: bool, limit: u32) -> Result<Vec<TaskLog>, DbError> {
        let order = if desc { "DESC" } else { "ASC" };
        let sql = format!("{SELECT_LOGS} WHERE tl.active = 0 ORDER BY tl.begin_ts {order}, tl.id {order} LIMIT ?1");
        self.query_logs(&sql, params![limit])
    }

    /// Closed logs that ended in `[begin, end_exclusive)`, oldest first.
    pub fn fetch_logs_between(&self, begin: DateTime<Local>, end_exclusive: DateTime<Local>, limit: u32) -> Result<Vec<TaskLog>, DbError> {
        let sql = format!(
            "{SELECT_LOGS} WHERE tl.active = 0 AND tl.end_ts >= ?1 AND tl.end_ts < ?2 ORDER BY tl.begin_ts ASC, tl.id ASC LIMIT ?3"
        );
        self.query_logs(&sql, params![to_db_ts(&begin), to_db_ts(&end_exclusive), limit])
    }

    fn query_logs(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<TaskLog>, DbError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(sql).map_err(DbError::FetchFailed)?;
        let logs = stmt
            .query_map(params, map_log)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(DbError::FetchFailed)?;

        debug!(count = logs.len(), "fetched logs");
        Ok(logs)
    }
}

fn active_row(conn: &Connection) -> Result<Option<ActiveRow>, DbError> {
    conn.query_row(SELECT_ACTIVE_ROW, [], |row| {
        Ok(ActiveRow {
            id: row.get(0)?,
            task_id: row.get(1)?,
            begin_ts: ts_column(row, 2)?,
            comment: row.get(3)?,
        })
    })
    .optional()
    .map_err(DbError::FetchFailed)
}

fn insert_active(conn: &Connection, task_id: i64, begin: DateTime<Local>, comment: Option<&str>) -> Result<i64, DbError> {
    conn.execute(INSERT_ACTIVE, params![task_id, to_db_ts(&begin), comment])
        .map_err(|err| match &err {
            rusqlite::Error::SqliteFailure(_, Some(message)) if message.contains(ACTIVE_LOG_GUARD_MESSAGE) => DbError::AlreadyActive,
            _ => DbError::UpdateFailed(err),
        })?;
    Ok(conn.last_insert_rowid())
}

/// Closes log `id` and adds its duration to `task_id`; returns the seconds recorded.
fn close_log(
    conn: &Connection,
    id: i64,
    task_id: i64,
    begin: DateTime<Local>,
    end: DateTime<Local>,
    comment: Option<&str>,
    now: DateTime<Local>,
) -> Result<i64, DbError> {
    let secs_spent = (end - begin).num_seconds();
    conn.execute(CLOSE_LOG, params![to_db_ts(&begin), to_db_ts(&end), secs_spent, comment, id])
        .map_err(DbError::UpdateFailed)?;
    add_task_secs(conn, task_id, secs_spent, now)?;
    Ok(secs_spent)
}

fn add_task_secs(conn: &Connection, task_id: i64, secs: i64, now: DateTime<Local>) -> Result<(), DbError> {
    let affected = conn
        .execute(ADD_TASK_SECS, params![secs, to_db_ts(&now), task_id])
        .map_err(DbError::UpdateFailed)?;
    if affected == 0 {
        return Err(DbError::TaskNotFound(task_id));
    }
    Ok(())
}

fn map_log(row: &Row) -> rusqlite::Result<TaskLog> {
    Ok(TaskLog {
        id: row.get(0)?,
        task_id: row.get(1)?,
        task_summary: row.get(2)?,
        begin_ts: ts_column(row, 3)?,
        end_ts: opt_ts_column(row, 4)?,
        secs_spent: row.get(5)?,
        comment: row.get(6)?,
        active: row.get(7)?,
    })
}
