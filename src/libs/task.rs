//! Domain records shared by the repository, the services and the views.
//!
//! Every timestamp here is already in the local zone; conversion from the
//! stored UTC text happens when rows are read. The records serialize to the
//! JSON emitted by the command line with lowerCamelCase keys, and optional
//! fields are left out when empty.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Longest comment a log may carry.
pub const MAX_COMMENT_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub summary: String,
    /// Sum of `secs_spent` over the task's closed logs
    pub secs_spent: i64,
    /// Visible in the active task list
    pub active: bool,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

/// One interval of work on a task, joined with the task summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLog {
    pub id: i64,
    pub task_id: i64,
    pub task_summary: String,
    pub begin_ts: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<DateTime<Local>>,
    pub secs_spent: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub active: bool,
}

/// The singleton active log together with its task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLogDetails {
    pub task_id: i64,
    pub task_summary: String,
    pub current_log_id: i64,
    pub current_begin_ts: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_comment: Option<String>,
}

impl ActiveLogDetails {
    /// Seconds elapsed since the log began; never negative.
    pub fn elapsed_secs(&self, now: DateTime<Local>) -> i64 {
        (now - self.current_begin_ts).num_seconds().max(0)
    }
}

/// Aggregated time for one task, used by stats and records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReportEntry {
    pub task_id: i64,
    pub task_summary: String,
    pub num_entries: i64,
    pub secs_spent: i64,
}

/// Trims a comment and turns a blank one into `None`.
pub fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}
