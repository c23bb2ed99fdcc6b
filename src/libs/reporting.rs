//! Reporting service.
//!
//! Read-only views over tasks and closed logs. Periods are resolved with
//! [`date_range`] and bounded by the ceilings in [`LimitsConfig`]:
//! `report_max_days` for log listings, records and daily reports,
//! `stats_max_days` for statistics. Row limits are clamped the same way.

use crate::db::{db::Db, error::DbError, stats::Stats, task_logs::TaskLogs, tasks::Tasks};
use crate::libs::config::LimitsConfig;
use crate::libs::task::{Task, TaskLog, TaskReportEntry};
use crate::libs::time::{date_range, DateRange, TimeError};
use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

/// Period name that selects all-time statistics.
pub const ALL_TIME: &str = "all";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Input(#[from] TimeError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Closed logs that ended within a range.
#[derive(Debug, Clone)]
pub struct PeriodLogs {
    pub range: DateRange,
    pub logs: Vec<TaskLog>,
}

/// Per-task totals; `range` is `None` for all-time statistics.
#[derive(Debug, Clone)]
pub struct PeriodStats {
    pub range: Option<DateRange>,
    pub entries: Vec<TaskReportEntry>,
}

/// One day of a [`DailyReport`].
#[derive(Debug, Clone)]
pub struct DayReport {
    pub range: DateRange,
    pub entries: Vec<TaskReportEntry>,
}

impl DayReport {
    pub fn total_secs(&self) -> i64 {
        self.entries.iter().map(|entry| entry.secs_spent).sum()
    }
}

#[derive(Debug, Clone)]
pub struct DailyReport {
    pub range: DateRange,
    pub days: Vec<DayReport>,
}

pub struct Reporter {
    tasks: Tasks,
    logs: TaskLogs,
    stats: Stats,
    limits: LimitsConfig,
}

impl Reporter {
    pub fn new(db: &Db, limits: LimitsConfig) -> Self {
        Reporter {
            tasks: Tasks::new(db),
            logs: TaskLogs::new(db),
            stats: Stats::new(db),
            limits,
        }
    }

    /// Active or inactive tasks, most recently touched first.
    pub fn list_tasks(&self, active: bool, limit: u32) -> Result<Vec<Task>, ReportError> {
        Ok(self.tasks.fetch_all(active, limit.min(self.limits.task_list_limit))?)
    }

    /// The latest `limit` closed logs, newest first.
    pub fn list_logs(&self, limit: u32) -> Result<Vec<TaskLog>, ReportError> {
        Ok(self.logs.fetch_logs(true, self.log_limit(limit))?)
    }

    /// Row count [`Reporter::list_logs`] actually uses for `limit`.
    pub fn log_limit(&self, limit: u32) -> u32 {
        limit.min(self.limits.task_list_limit)
    }

    /// Closed logs of a period, oldest first.
    pub fn logs_for_period(&self, period: &str, now: DateTime<Local>, full_week: bool) -> Result<PeriodLogs, ReportError> {
        let range = date_range(period, now, full_week, self.limits.report_max_days)?;
        let logs = self
            .logs
            .fetch_logs_between(range.start, range.end_exclusive, self.limits.task_list_limit)?;

        debug!(period, count = logs.len(), "listed logs for period");
        Ok(PeriodLogs { range, logs })
    }

    /// Per-task totals, largest first; `all` covers every closed log.
    pub fn stats(&self, period: &str, now: DateTime<Local>, full_week: bool) -> Result<PeriodStats, ReportError> {
        if period == ALL_TIME {
            let entries = self.stats.aggregate_per_task(self.limits.stats_limit)?;
            return Ok(PeriodStats { range: None, entries });
        }

        let range = date_range(period, now, full_week, self.limits.stats_max_days)?;
        let entries = self
            .stats
            .aggregate_per_task_between(range.start, range.end_exclusive, self.limits.stats_limit)?;

        Ok(PeriodStats {
            range: Some(range),
            entries,
        })
    }

    /// Per-task totals of a period, ordered by when each task was last touched.
    pub fn records(&self, period: &str, now: DateTime<Local>, full_week: bool) -> Result<PeriodStats, ReportError> {
        let range = date_range(period, now, full_week, self.limits.report_max_days)?;
        let entries = self
            .stats
            .report_per_task_between(range.start, range.end_exclusive, self.limits.stats_limit)?;

        Ok(PeriodStats {
            range: Some(range),
            entries,
        })
    }

    /// Per-task totals for each day of a period.
    pub fn daily_report(&self, period: &str, now: DateTime<Local>, full_week: bool) -> Result<DailyReport, ReportError> {
        let range = date_range(period, now, full_week, self.limits.report_max_days)?;

        let days = range
            .days()
            .into_iter()
            .map(|day| -> Result<DayReport, DbError> {
                let entries = self
                    .stats
                    .report_per_task_between(day.start, day.end_exclusive, self.limits.stats_limit)?;
                Ok(DayReport { range: day, entries })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DailyReport { range, days })
    }
}
