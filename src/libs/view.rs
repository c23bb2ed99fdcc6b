use super::formatter::{format_secs, relative_label};
use super::reporting::DailyReport;
use super::task::{Task, TaskLog, TaskReportEntry};
use super::time::{classify_relative, DateRange, DATE_FORMAT};
use chrono::{DateTime, Duration, Local};
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn tasks(tasks: &[Task], now: DateTime<Local>) -> Table {
        let mut table = Table::new();

        table.add_row(row!["ID", "SUMMARY", "TIME SPENT", "UPDATED"]);
        for task in tasks {
            table.add_row(row![
                task.id,
                task.summary,
                format_secs(task.secs_spent),
                relative_label(classify_relative(task.updated_at, now), &task.updated_at)
            ]);
        }

        table
    }

    pub fn logs(logs: &[TaskLog], now: DateTime<Local>) -> Table {
        let mut table = Table::new();

        table.add_row(row!["ID", "TASK", "BEGIN", "END", "TIME", "COMMENT"]);
        for log in logs {
            let end = log
                .end_ts
                .map(|end| relative_label(classify_relative(end, now), &end))
                .unwrap_or_default();
            table.add_row(row![
                log.id,
                log.task_summary,
                relative_label(classify_relative(log.begin_ts, now), &log.begin_ts),
                end,
                format_secs(log.secs_spent),
                log.comment.as_deref().unwrap_or("")
            ]);
        }

        table
    }

    /// Per-task totals with a closing total row.
    pub fn entries(entries: &[TaskReportEntry]) -> Table {
        let mut table = Table::new();

        table.add_row(row!["ID", "TASK", "ENTRIES", "TIME SPENT"]);
        for entry in entries {
            table.add_row(row![entry.task_id, entry.task_summary, entry.num_entries, format_secs(entry.secs_spent)]);
        }
        let total: i64 = entries.iter().map(|entry| entry.secs_spent).sum();
        table.add_row(row!["", "TOTAL", "", format_secs(total)]);

        table
    }

    /// One block of rows per day; days without logs show a dash.
    pub fn daily_report(report: &DailyReport) -> Table {
        let mut table = Table::new();

        table.add_row(row!["DAY", "TASK", "ENTRIES", "TIME SPENT"]);
        for day in &report.days {
            let label = day.range.start.format("%a %Y/%m/%d").to_string();
            if day.entries.is_empty() {
                table.add_row(row![label, "-", "", ""]);
                continue;
            }

            for (i, entry) in day.entries.iter().enumerate() {
                let label = if i == 0 { label.as_str() } else { "" };
                table.add_row(row![label, entry.task_summary, entry.num_entries, format_secs(entry.secs_spent)]);
            }
            table.add_row(row!["", "total", "", format_secs(day.total_secs())]);
        }

        table
    }

    /// Human label for a period: `all time`, a single date, or `start ... end`.
    pub fn period_label(range: Option<&DateRange>) -> String {
        match range {
            None => "all time".to_string(),
            Some(range) if range.num_days == 1 => range.start.format(DATE_FORMAT).to_string(),
            Some(range) => {
                let last_day = range.end_exclusive - Duration::days(1);
                format!("{} ... {}", range.start.format(DATE_FORMAT), last_day.format(DATE_FORMAT))
            }
        }
    }
}
