use super::db::Db;
use super::error::DbError;
use crate::libs::task::TaskReportEntry;
use crate::libs::time::to_db_ts;
use chrono::{DateTime, Local};
use rusqlite::{params, Row, ToSql};
use tracing::debug;

const SELECT_ALL_TIME: &str = "SELECT tl.task_id, t.summary, COUNT(tl.id) AS num_entries, t.secs_spent
    FROM task_log tl JOIN task t ON tl.task_id = t.id
    WHERE tl.active = 0
    GROUP BY tl.task_id
    ORDER BY t.secs_spent DESC, tl.task_id ASC
    LIMIT ?1";
const SELECT_BETWEEN_BY_TIME: &str = "SELECT tl.task_id, t.summary, COUNT(tl.id) AS num_entries, SUM(tl.secs_spent) AS secs_spent
    FROM task_log tl JOIN task t ON tl.task_id = t.id
    WHERE tl.active = 0 AND tl.end_ts >= ?1 AND tl.end_ts < ?2
    GROUP BY tl.task_id
    ORDER BY secs_spent DESC, tl.task_id ASC
    LIMIT ?3";
const SELECT_BETWEEN_BY_RECENCY: &str = "SELECT tl.task_id, t.summary, COUNT(tl.id) AS num_entries, SUM(tl.secs_spent) AS secs_spent
    FROM task_log tl JOIN task t ON tl.task_id = t.id
    WHERE tl.active = 0 AND tl.end_ts >= ?1 AND tl.end_ts < ?2
    GROUP BY tl.task_id
    ORDER BY t.updated_at ASC, tl.task_id ASC
    LIMIT ?3";

/// Per-task aggregates over closed logs.
pub struct Stats {
    db: Db,
}

impl Stats {
    pub fn new(db: &Db) -> Self {
        Stats { db: db.clone() }
    }

    /// All-time totals, largest first.
    pub fn aggregate_per_task(&self, limit: u32) -> Result<Vec<TaskReportEntry>, DbError> {
        self.query(SELECT_ALL_TIME, params![limit])
    }

    /// Totals of logs that ended in `[begin, end_exclusive)`, largest first.
    pub fn aggregate_per_task_between(&self, begin: DateTime<Local>, end_exclusive: DateTime<Local>, limit: u32) -> Result<Vec<TaskReportEntry>, DbError> {
        self.query(SELECT_BETWEEN_BY_TIME, params![to_db_ts(&begin), to_db_ts(&end_exclusive), limit])
    }

    /// Same totals as [`aggregate_per_task_between`](Self::aggregate_per_task_between),
    /// ordered by when each task was last touched.
    pub fn report_per_task_between(&self, begin: DateTime<Local>, end_exclusive: DateTime<Local>, limit: u32) -> Result<Vec<TaskReportEntry>, DbError> {
        self.query(SELECT_BETWEEN_BY_RECENCY, params![to_db_ts(&begin), to_db_ts(&end_exclusive), limit])
    }

    fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<TaskReportEntry>, DbError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(sql).map_err(DbError::FetchFailed)?;
        let entries = stmt
            .query_map(params, map_entry)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(DbError::FetchFailed)?;

        debug!(count = entries.len(), "aggregated task logs");
        Ok(entries)
    }
}

fn map_entry(row: &Row) -> rusqlite::Result<TaskReportEntry> {
    Ok(TaskReportEntry {
        task_id: row.get(0)?,
        task_summary: row.get(1)?,
        num_entries: row.get(2)?,
        secs_spent: row.get(3)?,
    })
}
