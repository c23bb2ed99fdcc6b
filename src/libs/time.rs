//! Time primitives shared by tracking and reporting.
//!
//! Everything that turns user input into instants, or a symbolic period into
//! a window of days, lives here. The rest of the crate never parses a
//! timestamp by hand.
//!
//! ## Formats
//!
//! - **Human time**: `YYYY/MM/DD HH:MM`, interpreted in the local zone
//! - **Date**: `YYYY/MM/DD`
//! - **Date range**: `YYYY/MM/DD...YYYY/MM/DD`, both ends inclusive
//! - **Storage**: `YYYY-MM-DD HH:MM:SS.mmm` in UTC, fixed width so that text
//!   order in SQLite is chronological order
//!
//! ## Usage
//!
//! ```rust
//! use hours::libs::time::{date_range, parse_log_times, REPORT_MAX_DAYS};
//! use chrono::Local;
//!
//! let (begin, end) = parse_log_times("2024/06/20 10:00", "2024/06/20 10:45")?;
//! assert_eq!((end - begin).num_minutes(), 45);
//!
//! let range = date_range("week", Local::now(), true, REPORT_MAX_DAYS)?;
//! assert_eq!(range.num_days, 7);
//! # Ok::<(), hours::libs::time::TimeError>(())
//! ```

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

/// Human time format used for all user-supplied timestamps.
pub const TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Date format used for single-day periods and ranges.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Separator between the two dates of an explicit range.
pub const RANGE_SEPARATOR: &str = "...";

/// Upper bound on the days an interactive report (log, records) may span.
pub const REPORT_MAX_DAYS: u32 = 7;

/// Upper bound on the days a statistics period may span.
pub const STATS_MAX_DAYS: u32 = 3650;

/// Shortest interval a closed log may cover.
pub const MIN_LOG_DURATION_SECS: i64 = 60;

/// Environment variable overriding the notion of "now".
pub const NOW_ENV_VAR: &str = "HOURS_NOW";

const DB_TS_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DB_TS_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Input errors raised while parsing timestamps and periods.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("begin time is empty")]
    BeginEmpty,
    #[error("end time is empty")]
    EndEmpty,
    #[error("begin time \"{0}\" is invalid, expected YYYY/MM/DD HH:MM")]
    BeginInvalid(String),
    #[error("end time \"{0}\" is invalid, expected YYYY/MM/DD HH:MM")]
    EndInvalid(String),
    #[error("time \"{0}\" is invalid, expected YYYY/MM/DD HH:MM")]
    TimeInvalid(String),
    #[error("end time is before begin time")]
    EndBeforeBegin,
    #[error("time spent needs to be at least a minute")]
    DurationTooShort,
    #[error("time spent needs to be positive")]
    DurationNotPositive,
    #[error("period \"{0}\" is invalid, expected today, yest, 3d, week, YYYY/MM/DD or YYYY/MM/DD...YYYY/MM/DD")]
    PeriodInvalid(String),
    #[error("date range \"{0}\" is invalid, expected YYYY/MM/DD...YYYY/MM/DD")]
    DateRangeInvalid(String),
    #[error("end date must be after start date")]
    EndNotAfterStart,
    #[error("date range spans {days} days, at most {max} are allowed")]
    RangeTooLarge { days: i64, max: u32 },
    #[error("HOURS_NOW value \"{0}\" is not an RFC 3339 timestamp")]
    ClockInvalid(String),
}

/// A half-open window of local days: `[start, end_exclusive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: DateTime<Local>,
    pub end_exclusive: DateTime<Local>,
    pub num_days: i64,
}

impl DateRange {
    fn from_start(start: DateTime<Local>, num_days: i64) -> Self {
        DateRange {
            start,
            end_exclusive: start + Duration::days(num_days),
            num_days,
        }
    }

    /// Splits the range into consecutive single-day ranges.
    pub fn days(&self) -> Vec<DateRange> {
        (0..self.num_days)
            .map(|offset| DateRange::from_start(self.start + Duration::days(offset), 1))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Step sizes for nudging a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeShift {
    Minute,
    FiveMinutes,
    Hour,
    Day,
}

impl TimeShift {
    fn duration(self) -> Duration {
        match self {
            TimeShift::Minute => Duration::minutes(1),
            TimeShift::FiveMinutes => Duration::minutes(5),
            TimeShift::Hour => Duration::hours(1),
            TimeShift::Day => Duration::days(1),
        }
    }
}

/// Where a timestamp falls relative to a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Future,
    Today,
    Yesterday,
    ThisWeek,
    BeforeThisWeek,
}

/// Source of "now" for the services.
///
/// `Fixed` pins the clock, which is how `HOURS_NOW` and the tests make
/// tracking deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Local>),
}

impl Clock {
    /// Reads `HOURS_NOW`, falling back to the system clock when unset.
    pub fn from_env() -> Result<Self, TimeError> {
        match std::env::var(NOW_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => DateTime::parse_from_rfc3339(value.trim())
                .map(|ts| Clock::Fixed(ts.with_timezone(&Local)))
                .map_err(|_| TimeError::ClockInvalid(value)),
            _ => Ok(Clock::System),
        }
    }

    pub fn now(&self) -> DateTime<Local> {
        match self {
            Clock::System => Local::now().trunc_subsecs(3),
            Clock::Fixed(ts) => *ts,
        }
    }
}

/// Parses the begin and end of a log entry typed by the user.
///
/// Both values are trimmed, parsed in the local zone and checked to form an
/// interval of at least one minute.
pub fn parse_log_times(begin: &str, end: &str) -> Result<(DateTime<Local>, DateTime<Local>), TimeError> {
    let begin = begin.trim();
    let end = end.trim();

    if begin.is_empty() {
        return Err(TimeError::BeginEmpty);
    }
    if end.is_empty() {
        return Err(TimeError::EndEmpty);
    }

    let begin_ts = parse_time(begin).ok_or_else(|| TimeError::BeginInvalid(begin.to_string()))?;
    let end_ts = parse_time(end).ok_or_else(|| TimeError::EndInvalid(end.to_string()))?;

    validate_interval(begin_ts, end_ts)?;

    Ok((begin_ts, end_ts))
}

/// Parses a single human timestamp in the local zone.
pub fn parse_time(input: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Parses one human timestamp given on the command line.
pub fn parse_human_time(input: &str) -> Result<DateTime<Local>, TimeError> {
    parse_time(input).ok_or_else(|| TimeError::TimeInvalid(input.trim().to_string()))
}

/// Checks that `[begin, end]` is a valid closed log interval.
pub fn validate_interval(begin: DateTime<Local>, end: DateTime<Local>) -> Result<(), TimeError> {
    if end < begin {
        return Err(TimeError::EndBeforeBegin);
    }
    if (end - begin).num_seconds() < MIN_LOG_DURATION_SECS {
        return Err(TimeError::DurationTooShort);
    }
    Ok(())
}

/// Resolves a symbolic period into a window of days.
///
/// `max_days` only bounds explicit `start...end` ranges; the symbolic
/// periods have fixed widths.
pub fn date_range(period: &str, now: DateTime<Local>, full_week: bool, max_days: u32) -> Result<DateRange, TimeError> {
    let today = now.date_naive();

    match period {
        "today" => Ok(DateRange::from_start(local_midnight(today), 1)),
        "yest" => Ok(DateRange::from_start(local_midnight(today - Duration::days(1)), 1)),
        "3d" => Ok(DateRange::from_start(local_midnight(today - Duration::days(2)), 3)),
        "week" => {
            let offset = i64::from(now.weekday().num_days_from_monday());
            let num_days = if full_week { 7 } else { offset + 1 };
            Ok(DateRange::from_start(local_midnight(today - Duration::days(offset)), num_days))
        }
        _ if period.contains(RANGE_SEPARATOR) => parse_date_range(period, max_days),
        _ => NaiveDate::parse_from_str(period, DATE_FORMAT)
            .map(|date| DateRange::from_start(local_midnight(date), 1))
            .map_err(|_| TimeError::PeriodInvalid(period.to_string())),
    }
}

fn parse_date_range(period: &str, max_days: u32) -> Result<DateRange, TimeError> {
    let invalid = || TimeError::DateRangeInvalid(period.to_string());

    let (start, end) = period.split_once(RANGE_SEPARATOR).ok_or_else(invalid)?;
    let start = NaiveDate::parse_from_str(start, DATE_FORMAT).map_err(|_| invalid())?;
    let end = NaiveDate::parse_from_str(end, DATE_FORMAT).map_err(|_| invalid())?;

    if end <= start {
        return Err(TimeError::EndNotAfterStart);
    }

    let num_days = (end - start).num_days() + 1;
    if num_days > i64::from(max_days) {
        return Err(TimeError::RangeTooLarge { days: num_days, max: max_days });
    }

    Ok(DateRange::from_start(local_midnight(start), num_days))
}

/// Midnight of `ts`'s local calendar day.
pub fn floor_to_day(ts: DateTime<Local>) -> DateTime<Local> {
    local_midnight(ts.date_naive())
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN);
    // zones that skip midnight on a DST switch fall back to the UTC reading
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

pub fn shift_time(ts: DateTime<Local>, direction: Direction, shift: TimeShift) -> DateTime<Local> {
    match direction {
        Direction::Forward => ts + shift.duration(),
        Direction::Backward => ts - shift.duration(),
    }
}

/// Classifies `ts` against `reference` by local calendar day; weeks start on Monday.
pub fn classify_relative(ts: DateTime<Local>, reference: DateTime<Local>) -> RelativeDay {
    if ts > reference {
        return RelativeDay::Future;
    }

    let day = ts.date_naive();
    let reference_day = reference.date_naive();
    let week_start = reference_day - Duration::days(i64::from(reference_day.weekday().num_days_from_monday()));

    if day == reference_day {
        RelativeDay::Today
    } else if day == reference_day - Duration::days(1) {
        RelativeDay::Yesterday
    } else if day >= week_start {
        RelativeDay::ThisWeek
    } else {
        RelativeDay::BeforeThisWeek
    }
}

/// Current instant in UTC at storage precision.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Formats an instant for storage.
pub fn to_db_ts<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
    ts.with_timezone(&Utc).format(DB_TS_WRITE_FORMAT).to_string()
}

/// Reads a stored instant back into the local zone.
pub fn from_db_ts(value: &str) -> Result<DateTime<Local>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(value, DB_TS_READ_FORMAT)?;
    Ok(naive.and_utc().with_timezone(&Local))
}
