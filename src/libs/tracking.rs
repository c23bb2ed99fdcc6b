//! Tracking service.
//!
//! [`Tracker`] owns the business rules on top of the repository: which task
//! may be started, when a log may be stopped, what a comment may contain.
//! Operations that change the active log or create a closed one write their
//! result as pretty-printed JSON to a caller-supplied writer, and only after
//! the repository transaction has committed.
//!
//! ## Rules
//!
//! - Starting a task while another one is tracked switches to it in one step.
//! - Starting the task that is already tracked is an error.
//! - A closed log covers at least one minute.
//! - Comments are trimmed, blank comments are dropped, and at most
//!   [`MAX_COMMENT_CHARS`] characters are kept.
//! - The task that is being tracked can't be deactivated.
//!
//! ## Usage
//!
//! ```rust
//! use hours::db::db::Db;
//! use hours::libs::time::Clock;
//! use hours::libs::tracking::Tracker;
//! use chrono::{Duration, Local};
//!
//! let db = Db::open_in_memory()?;
//! let now = Local::now();
//! let tracker = Tracker::new(&db, Clock::Fixed(now));
//!
//! let task = tracker.add_task("write docs")?;
//! let mut out = Vec::new();
//! tracker.start(&mut out, task.id, None)?;
//!
//! let tracker = Tracker::new(&db, Clock::Fixed(now + Duration::minutes(30)));
//! let log = tracker.stop(&mut out, None, None, Some("first draft".into()))?;
//! assert_eq!(log.secs_spent, 30 * 60);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::db::{db::Db, error::DbError, task_logs::TaskLogs, tasks::Tasks};
use crate::libs::task::{normalize_comment, ActiveLogDetails, Task, TaskLog, MAX_COMMENT_CHARS};
use crate::libs::time::{validate_interval, Clock, TimeError, MIN_LOG_DURATION_SECS};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("no task is being tracked right now")]
    NoActiveTask,
    #[error("this task is already being tracked")]
    AlreadyTracking,
    #[error("task summary can't be empty")]
    TaskSummaryEmpty,
    #[error("task {0} is being tracked and can't be deactivated")]
    CannotDeactivateTrackedTask(i64),
    #[error("\"{0}\" is not a valid task id")]
    TaskIdInvalid(String),
    #[error("task {0} does not exist")]
    TaskNotFound(i64),
    #[error("task log {0} does not exist")]
    LogNotFound(i64),
    #[error("comment is {len} characters long, at most {max} are allowed")]
    CommentTooLong { len: usize, max: usize },
    #[error("begin time can't be in the future")]
    BeginInFuture,
    #[error("failed to encode output: {0}")]
    JsonEncodeFailed(#[source] serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
    #[error(transparent)]
    Input(#[from] TimeError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Start, stop, switch and edit tracking, and manage tasks.
pub struct Tracker {
    tasks: Tasks,
    logs: TaskLogs,
    clock: Clock,
}

impl Tracker {
    pub fn new(db: &Db, clock: Clock) -> Self {
        Tracker {
            tasks: Tasks::new(db),
            logs: TaskLogs::new(db),
            clock,
        }
    }

    /// The active log, if any.
    pub fn active(&self) -> Result<Option<ActiveLogDetails>, TrackingError> {
        Ok(self.logs.fetch_active_log_details()?)
    }

    /// Seconds the active log has been running for.
    pub fn elapsed_secs(&self, details: &ActiveLogDetails) -> i64 {
        details.elapsed_secs(self.clock.now())
    }

    /// Writes the active log as JSON.
    pub fn show_active<W: Write>(&self, w: &mut W) -> Result<ActiveLogDetails, TrackingError> {
        let details = self.active()?.ok_or(TrackingError::NoActiveTask)?;
        emit(w, &details)?;
        Ok(details)
    }

    /// Starts tracking `task_id`, switching away from the tracked task if
    /// there is one.
    pub fn start<W: Write>(&self, w: &mut W, task_id: i64, comment: Option<String>) -> Result<ActiveLogDetails, TrackingError> {
        let comment = validate_comment(comment)?;
        self.require_task(task_id)?;
        let now = self.clock.now();

        match self.active()? {
            Some(active) if active.task_id == task_id => {
                warn!(task_id, "task is already tracked");
                return Err(TrackingError::AlreadyTracking);
            }
            Some(active) => {
                self.logs
                    .quick_switch_active(task_id, now, comment.as_deref())
                    .map_err(domain_error)?;
                info!(from = active.task_id, to = task_id, "switched task");
            }
            None => {
                self.logs
                    .insert_active_log(task_id, now, comment.as_deref())
                    .map_err(domain_error)?;
            }
        }

        self.show_active(w)
    }

    /// Moves the begin of the active log and/or replaces its comment.
    ///
    /// A blank `comment` clears the stored one.
    pub fn edit_active<W: Write>(&self, w: &mut W, begin: Option<DateTime<Local>>, comment: Option<String>) -> Result<ActiveLogDetails, TrackingError> {
        let comment = match comment {
            Some(comment) => Some(validate_comment(Some(comment))?),
            None => None,
        };

        if self.active()?.is_none() {
            return Err(TrackingError::NoActiveTask);
        }
        if begin.is_some_and(|begin| begin > self.clock.now()) {
            return Err(TrackingError::BeginInFuture);
        }

        self.logs
            .edit_active_log(begin, comment.as_ref().map(|c| c.as_deref()))
            .map_err(domain_error)?;

        self.show_active(w)
    }

    /// Closes the active log.
    ///
    /// `begin` defaults to the active log's begin and `end` to now. A missing
    /// `comment` keeps the one set when tracking started.
    pub fn stop<W: Write>(
        &self,
        w: &mut W,
        begin: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
        comment: Option<String>,
    ) -> Result<TaskLog, TrackingError> {
        let active = self.active()?.ok_or(TrackingError::NoActiveTask)?;

        let begin = begin.unwrap_or(active.current_begin_ts);
        let end = end.unwrap_or_else(|| self.clock.now());
        if end <= begin {
            return Err(TimeError::DurationNotPositive.into());
        }
        if (end - begin).num_seconds() < MIN_LOG_DURATION_SECS {
            return Err(TimeError::DurationTooShort.into());
        }

        let comment = match comment {
            Some(comment) => validate_comment(Some(comment))?,
            None => active.current_comment,
        };

        let log_id = self
            .logs
            .finish_active_log(active.task_id, begin, end, comment.as_deref(), self.clock.now())
            .map_err(domain_error)?;

        let log = self.fetch_log(log_id)?;
        emit(w, &log)?;
        Ok(log)
    }

    /// Records a finished interval for `task_id`.
    pub fn insert_manual<W: Write>(
        &self,
        w: &mut W,
        task_id: i64,
        begin: DateTime<Local>,
        end: DateTime<Local>,
        comment: Option<String>,
    ) -> Result<TaskLog, TrackingError> {
        validate_interval(begin, end)?;
        let comment = validate_comment(comment)?;
        self.require_task(task_id)?;

        let log_id = self
            .logs
            .insert_manual_log(task_id, begin, end, comment.as_deref(), self.clock.now())
            .map_err(domain_error)?;

        let log = self.fetch_log(log_id)?;
        emit(w, &log)?;
        Ok(log)
    }

    /// Drops the active log without recording time.
    pub fn discard_active(&self) -> Result<(), TrackingError> {
        self.logs.delete_active_log().map_err(domain_error)
    }

    /// A closed log by id.
    pub fn find_log(&self, log_id: i64) -> Result<TaskLog, TrackingError> {
        self.logs
            .fetch_log(log_id)?
            .filter(|log| !log.active)
            .ok_or(TrackingError::LogNotFound(log_id))
    }

    /// Deletes a closed log and takes its time off the task.
    pub fn delete_log(&self, log_id: i64) -> Result<TaskLog, TrackingError> {
        let log = self.find_log(log_id)?;
        self.logs.delete_log(&log, self.clock.now()).map_err(domain_error)?;
        Ok(log)
    }

    pub fn add_task(&self, summary: &str) -> Result<Task, TrackingError> {
        let summary = validate_summary(summary)?;
        Ok(self.tasks.insert(summary, self.clock.now())?)
    }

    pub fn rename_task(&self, task_id: i64, summary: &str) -> Result<Task, TrackingError> {
        let summary = validate_summary(summary)?;
        self.tasks.update_summary(task_id, summary, self.clock.now()).map_err(domain_error)?;
        self.require_task(task_id)
    }

    /// Shows or hides a task in the active list.
    pub fn set_task_active(&self, task_id: i64, active: bool) -> Result<Task, TrackingError> {
        self.require_task(task_id)?;

        if !active && self.active()?.is_some_and(|details| details.task_id == task_id) {
            warn!(task_id, "refusing to deactivate the tracked task");
            return Err(TrackingError::CannotDeactivateTrackedTask(task_id));
        }

        self.tasks.set_active(task_id, active, self.clock.now()).map_err(domain_error)?;
        self.require_task(task_id)
    }

    fn require_task(&self, task_id: i64) -> Result<Task, TrackingError> {
        self.tasks.fetch(task_id)?.ok_or(TrackingError::TaskNotFound(task_id))
    }

    fn fetch_log(&self, log_id: i64) -> Result<TaskLog, TrackingError> {
        self.logs.fetch_log(log_id)?.ok_or(TrackingError::LogNotFound(log_id))
    }
}

/// Parses a positive task id.
pub fn parse_task_id(input: &str) -> Result<i64, TrackingError> {
    match input.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TrackingError::TaskIdInvalid(input.to_string())),
    }
}

fn validate_summary(summary: &str) -> Result<&str, TrackingError> {
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(TrackingError::TaskSummaryEmpty);
    }
    Ok(summary)
}

fn validate_comment(comment: Option<String>) -> Result<Option<String>, TrackingError> {
    let comment = normalize_comment(comment);
    match comment {
        Some(ref text) if text.chars().count() > MAX_COMMENT_CHARS => Err(TrackingError::CommentTooLong {
            len: text.chars().count(),
            max: MAX_COMMENT_CHARS,
        }),
        _ => Ok(comment),
    }
}

/// Maps repository outcomes that callers can act on to tracking errors.
fn domain_error(err: DbError) -> TrackingError {
    match err {
        DbError::NoActiveLog => TrackingError::NoActiveTask,
        DbError::AlreadyActive => TrackingError::AlreadyTracking,
        DbError::TaskNotFound(id) => TrackingError::TaskNotFound(id),
        DbError::LogNotFound(id) => TrackingError::LogNotFound(id),
        other => TrackingError::Db(other),
    }
}

fn emit<W: Write, T: Serialize>(w: &mut W, value: &T) -> Result<(), TrackingError> {
    serde_json::to_writer_pretty(&mut *w, value).map_err(TrackingError::JsonEncodeFailed)?;
    writeln!(w).map_err(TrackingError::Write)
}
