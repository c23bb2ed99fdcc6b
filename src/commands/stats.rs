use super::Session;
use crate::libs::messages::Message;
use crate::libs::reporting::{Reporter, ALL_TIME};
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// all, today, yest, 3d, week, YYYY/MM/DD or YYYY/MM/DD...YYYY/MM/DD
    #[arg(default_value = ALL_TIME)]
    period: String,

    /// Count the whole week for `week`
    #[arg(long)]
    full_week: bool,
}

pub fn cmd(args: StatsArgs, session: &Session) -> Result<()> {
    let stats = Reporter::new(&session.db, session.limits.clone()).stats(&args.period, session.now(), args.full_week)?;

    if stats.entries.is_empty() {
        msg_info!(Message::NoStatsFound);
        return Ok(());
    }

    msg_print!(Message::StatsHeader(View::period_label(stats.range.as_ref())), true);
    View::entries(&stats.entries).printstd();
    Ok(())
}
