//! Text formatting for tables and templates.

use super::time::{RelativeDay, TIME_FORMAT};
use chrono::{DateTime, Local};

/// Formats seconds as `2h 30m`, `45m` or `0m`.
///
/// Seconds below a full minute are dropped; negative values render as `0m`.
pub fn format_secs(secs: i64) -> String {
    let mins = secs.max(0) / 60;
    let (hours, mins) = (mins / 60, mins % 60);

    match (hours, mins) {
        (0, mins) => format!("{}m", mins),
        (hours, 0) => format!("{}h", hours),
        (hours, mins) => format!("{}h {}m", hours, mins),
    }
}

/// Formats an instant in the human time format used on the command line.
pub fn format_ts(ts: &DateTime<Local>) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Short label for when something happened relative to now.
pub fn relative_label(day: RelativeDay, ts: &DateTime<Local>) -> String {
    match day {
        RelativeDay::Future => format!("{} (future)", format_ts(ts)),
        RelativeDay::Today => format!("today {}", ts.format("%H:%M")),
        RelativeDay::Yesterday => format!("yesterday {}", ts.format("%H:%M")),
        RelativeDay::ThisWeek => ts.format("%a %H:%M").to_string(),
        RelativeDay::BeforeThisWeek => format_ts(ts),
    }
}

/// Fills `{{task}}` and `{{time}}` in a status line template.
pub fn render_template(template: &str, task: &str, elapsed_secs: i64) -> String {
    template.replace("{{task}}", task).replace("{{time}}", &format_secs(elapsed_secs))
}
