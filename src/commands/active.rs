use super::Session;
use crate::libs::formatter::render_template;
use crate::libs::tracking::Tracker;
use crate::msg_print;
use anyhow::Result;
use clap::Args;
use std::io;

#[derive(Debug, Args)]
pub struct ActiveArgs {
    /// Print this line instead of JSON; `{{task}}` and `{{time}}` are replaced
    #[arg(short, long)]
    template: Option<String>,
}

/// Prints nothing and succeeds when no task is tracked.
pub fn cmd(args: ActiveArgs, session: &Session) -> Result<()> {
    let tracker = Tracker::new(&session.db, session.clock);

    match args.template {
        Some(template) => {
            if let Some(details) = tracker.active()? {
                let elapsed = tracker.elapsed_secs(&details);
                msg_print!(render_template(&template, &details.task_summary, elapsed));
            }
        }
        None => {
            if tracker.active()?.is_some() {
                tracker.show_active(&mut io::stdout().lock())?;
            }
        }
    }

    Ok(())
}
