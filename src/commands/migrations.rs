use crate::db::db::Db;
use crate::db::migrations::{current_version, MigrationManager};
use crate::libs::formatter::format_ts;
use crate::libs::messages::Message;
use crate::{msg_info, msg_print, msg_warning};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::cmp::Ordering;
use std::path::Path;

#[derive(Debug, Args)]
pub struct MigrationsArgs {
    #[command(subcommand)]
    command: MigrationsCommand,
}

#[derive(Debug, Subcommand)]
enum MigrationsCommand {
    /// Show the schema version of the database
    Status,
    /// List the applied migrations
    History,
}

/// Reads the database as is; nothing here migrates it.
pub fn cmd(args: MigrationsArgs, db_path: &Path) -> Result<()> {
    let conn = Db::open_without_migrations(db_path)?;
    let manager = MigrationManager::new();

    match args.command {
        MigrationsCommand::Status => {
            let version = current_version(&conn)?;
            let latest = manager.latest_version();

            msg_print!(Message::DatabaseVersion(version));
            match version.cmp(&latest) {
                Ordering::Equal => msg_info!(Message::DatabaseUpToDate),
                Ordering::Less => msg_info!(Message::DatabaseNeedsUpdate(version, latest)),
                Ordering::Greater => msg_warning!(Message::DatabaseNewerThanBinary(version, latest)),
            }
        }
        MigrationsCommand::History => {
            let history = manager.history(&conn)?;
            if history.is_empty() {
                msg_info!(Message::NoMigrationHistory);
                return Ok(());
            }

            msg_print!(Message::MigrationHistoryHeader, true);
            for (version, applied_at) in history {
                let name = manager.name_of(version).unwrap_or("unknown");
                msg_print!(format!("  v{}: {} (applied: {})", version, name, format_ts(&applied_at)));
            }
        }
    }

    Ok(())
}
