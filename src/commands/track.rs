use super::{human_time, Session};
use crate::libs::messages::Message;
use crate::libs::tracking::{parse_task_id, Tracker};
use crate::msg_success;
use anyhow::Result;
use chrono::{DateTime, Local};
use clap::{Args, Subcommand};
use std::io;

#[derive(Debug, Args)]
pub struct TrackArgs {
    #[command(subcommand)]
    command: TrackCommand,
}

#[derive(Debug, Subcommand)]
enum TrackCommand {
    /// Start tracking a task, switching from the tracked one if needed
    Start {
        task_id: String,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Stop tracking and record the time
    Stop {
        /// Override when tracking began (YYYY/MM/DD HH:MM)
        #[arg(long, value_parser = human_time)]
        begin: Option<DateTime<Local>>,
        /// Override when tracking ended (YYYY/MM/DD HH:MM)
        #[arg(long, value_parser = human_time)]
        end: Option<DateTime<Local>>,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Change the begin time or comment of the active log
    Edit {
        #[arg(long, value_parser = human_time)]
        begin: Option<DateTime<Local>>,
        /// An empty comment clears the current one
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Record time spent earlier
    Insert {
        task_id: String,
        #[arg(long, value_parser = human_time)]
        begin: DateTime<Local>,
        #[arg(long, value_parser = human_time)]
        end: DateTime<Local>,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Drop the active log without recording time
    Discard,
}

pub fn cmd(args: TrackArgs, session: &Session) -> Result<()> {
    let tracker = Tracker::new(&session.db, session.clock);
    let mut out = io::stdout().lock();

    match args.command {
        TrackCommand::Start { task_id, comment } => {
            tracker.start(&mut out, parse_task_id(&task_id)?, comment)?;
        }
        TrackCommand::Stop { begin, end, comment } => {
            tracker.stop(&mut out, begin, end, comment)?;
        }
        TrackCommand::Edit { begin, comment } => {
            tracker.edit_active(&mut out, begin, comment)?;
        }
        TrackCommand::Insert {
            task_id,
            begin,
            end,
            comment,
        } => {
            tracker.insert_manual(&mut out, parse_task_id(&task_id)?, begin, end, comment)?;
        }
        TrackCommand::Discard => {
            tracker.discard_active()?;
            msg_success!(Message::ActiveLogDiscarded);
        }
    }

    Ok(())
}
