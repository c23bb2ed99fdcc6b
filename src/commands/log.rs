use super::Session;
use crate::libs::messages::Message;
use crate::libs::reporting::Reporter;
use crate::libs::tracking::Tracker;
use crate::libs::view::View;
use crate::{msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct LogArgs {
    #[command(subcommand)]
    command: Option<LogCommand>,

    /// today, yest, 3d, week, YYYY/MM/DD or YYYY/MM/DD...YYYY/MM/DD; the latest logs when omitted
    period: Option<String>,

    /// Number of logs to show when no period is given
    #[arg(short, long, default_value_t = 20)]
    limit: u32,

    /// Count the whole week for `week`
    #[arg(long)]
    full_week: bool,
}

#[derive(Debug, Subcommand)]
enum LogCommand {
    /// Delete a task log and take its time off the task
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

pub fn cmd(args: LogArgs, session: &Session) -> Result<()> {
    match args.command {
        Some(LogCommand::Delete { id, yes }) => delete(session, id, yes),
        None => list(session, args.period.as_deref(), args.limit, args.full_week),
    }
}

fn list(session: &Session, period: Option<&str>, limit: u32, full_week: bool) -> Result<()> {
    let reporter = Reporter::new(&session.db, session.limits.clone());

    let (label, logs) = match period {
        Some(period) => {
            let period_logs = reporter.logs_for_period(period, session.now(), full_week)?;
            (View::period_label(Some(&period_logs.range)), period_logs.logs)
        }
        None => (format!("latest {}", reporter.log_limit(limit)), reporter.list_logs(limit)?),
    };

    if logs.is_empty() {
        msg_info!(Message::NoLogsFound);
        return Ok(());
    }

    msg_print!(Message::LogsHeader(label), true);
    View::logs(&logs, session.now()).printstd();
    Ok(())
}

fn delete(session: &Session, id: i64, yes: bool) -> Result<()> {
    let tracker = Tracker::new(&session.db, session.clock);
    let log = tracker.find_log(id)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteLog(log.id, log.task_summary.clone()).to_string())
            .default(false)
            .interact()?;

        if !confirmed {
            msg_info!(Message::DeletionCancelled);
            return Ok(());
        }
    }

    tracker.delete_log(log.id)?;
    msg_success!(Message::LogDeleted(log.id));
    Ok(())
}
