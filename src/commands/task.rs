use super::Session;
use crate::libs::config::TASK_LIST_LIMIT;
use crate::libs::messages::Message;
use crate::libs::reporting::Reporter;
use crate::libs::tracking::{parse_task_id, Tracker};
use crate::libs::view::View;
use crate::{msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::{self, Write};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Create a task
    Add {
        summary: String,
    },
    /// List tasks
    List {
        /// Show deactivated tasks instead
        #[arg(long)]
        inactive: bool,
        #[arg(short, long, default_value_t = TASK_LIST_LIMIT)]
        limit: u32,
    },
    /// Change a task's summary
    Rename {
        id: String,
        summary: String,
    },
    /// Hide a task from the active list
    Deactivate {
        id: String,
    },
    /// Bring a deactivated task back
    Activate {
        id: String,
    },
}

pub fn cmd(args: TaskArgs, session: &Session) -> Result<()> {
    let tracker = Tracker::new(&session.db, session.clock);

    match args.command {
        TaskCommand::Add { summary } => {
            let task = tracker.add_task(&summary)?;
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &task)?;
            writeln!(out)?;
        }
        TaskCommand::List { inactive, limit } => {
            let tasks = Reporter::new(&session.db, session.limits.clone()).list_tasks(!inactive, limit)?;
            if tasks.is_empty() {
                msg_info!(Message::NoTasksFound);
                return Ok(());
            }
            msg_print!(Message::TasksHeader(!inactive), true);
            View::tasks(&tasks, session.now()).printstd();
        }
        TaskCommand::Rename { id, summary } => {
            let task = tracker.rename_task(parse_task_id(&id)?, &summary)?;
            msg_success!(Message::TaskRenamed(task.id, task.summary));
        }
        TaskCommand::Deactivate { id } => {
            let task = tracker.set_task_active(parse_task_id(&id)?, false)?;
            msg_success!(Message::TaskDeactivated(task.id));
        }
        TaskCommand::Activate { id } => {
            let task = tracker.set_task_active(parse_task_id(&id)?, true)?;
            msg_success!(Message::TaskActivated(task.id));
        }
    }

    Ok(())
}
