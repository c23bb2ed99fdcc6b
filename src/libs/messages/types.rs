/// Every user-facing message hours prints outside of JSON output.
///
/// Variants carry the data they interpolate; the wording lives in the
/// `Display` impl in [`super::display`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // === TASKS ===
    TaskRenamed(i64, String),
    TaskActivated(i64),
    TaskDeactivated(i64),
    TasksHeader(bool),
    NoTasksFound,

    // === TRACKING ===
    ActiveLogDiscarded,

    // === LOGS ===
    LogsHeader(String),
    NoLogsFound,
    ConfirmDeleteLog(i64, String),
    LogDeleted(i64),
    DeletionCancelled,

    // === STATS & REPORTS ===
    StatsHeader(String),
    ReportHeader(String),
    RecordsHeader(String),
    NoStatsFound,

    // === MIGRATIONS ===
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate(u32, u32),
    DatabaseNewerThanBinary(u32, u32),
    MigrationHistoryHeader,
    NoMigrationHistory,

    // === FATAL ===
    FatalStartup(String),
}
