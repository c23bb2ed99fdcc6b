use super::types::Message;
use crate::libs::meta::{APP_METADATA_AUTHORS, APP_METADATA_ISSUES};
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === TASKS ===
            Message::TaskRenamed(id, summary) => format!("Task {} renamed to: {}", id, summary),
            Message::TaskActivated(id) => format!("Task {} is active again.", id),
            Message::TaskDeactivated(id) => format!("Task {} deactivated.", id),
            Message::TasksHeader(true) => "Active tasks".to_string(),
            Message::TasksHeader(false) => "Inactive tasks".to_string(),
            Message::NoTasksFound => "No tasks found.".to_string(),

            // === TRACKING ===
            Message::ActiveLogDiscarded => "Active task log discarded.".to_string(),

            // === LOGS ===
            Message::LogsHeader(period) => format!("Task logs ({})", period),
            Message::NoLogsFound => "No task logs found.".to_string(),
            Message::ConfirmDeleteLog(id, summary) => format!("Delete task log {} of \"{}\"?", id, summary),
            Message::LogDeleted(id) => format!("Task log {} deleted.", id),
            Message::DeletionCancelled => "Deletion cancelled.".to_string(),

            // === STATS & REPORTS ===
            Message::StatsHeader(period) => format!("Stats ({})", period),
            Message::ReportHeader(period) => format!("Report ({})", period),
            Message::RecordsHeader(period) => format!("Records ({})", period),
            Message::NoStatsFound => "Nothing tracked in this period.".to_string(),

            // === MIGRATIONS ===
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
            Message::DatabaseUpToDate => "Database schema is up to date.".to_string(),
            Message::DatabaseNeedsUpdate(current, latest) => {
                format!("Database schema needs to be updated from v{} to v{}; it happens on the next command.", current, latest)
            }
            Message::DatabaseNewerThanBinary(current, latest) => {
                format!("Database is at v{} but this binary only knows up to v{}. Upgrade hours.", current, latest)
            }
            Message::MigrationHistoryHeader => "Migration history".to_string(),
            Message::NoMigrationHistory => "No migrations recorded.".to_string(),

            // === FATAL ===
            Message::FatalStartup(error) => format!(
                "{}\n\nhours could not prepare its database. This shouldn't happen; let {} know at {}",
                error, APP_METADATA_AUTHORS, APP_METADATA_ISSUES
            ),
        };
        write!(f, "{}", text)
    }
}
