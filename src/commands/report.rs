use super::Session;
use crate::libs::messages::Message;
use crate::libs::reporting::Reporter;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// today, yest, 3d, week, YYYY/MM/DD or YYYY/MM/DD...YYYY/MM/DD
    #[arg(default_value = "3d")]
    period: String,

    /// Count the whole week for `week`
    #[arg(long)]
    full_week: bool,

    /// One row per task for the whole period instead of one block per day
    #[arg(long)]
    agg: bool,
}

pub fn cmd(args: ReportArgs, session: &Session) -> Result<()> {
    let reporter = Reporter::new(&session.db, session.limits.clone());

    if args.agg {
        let records = reporter.records(&args.period, session.now(), args.full_week)?;
        if records.entries.is_empty() {
            msg_info!(Message::NoStatsFound);
            return Ok(());
        }

        msg_print!(Message::RecordsHeader(View::period_label(records.range.as_ref())), true);
        View::entries(&records.entries).printstd();
        return Ok(());
    }

    let report = reporter.daily_report(&args.period, session.now(), args.full_week)?;
    msg_print!(Message::ReportHeader(View::period_label(Some(&report.range))), true);
    View::daily_report(&report).printstd();
    Ok(())
}
