//! Command-line surface.
//!
//! Each subcommand lives in its own module with a clap `Args` struct and a
//! `cmd` entry point. [`Session`] bundles what most commands need: the
//! database, the configured limits and the clock.

pub mod active;
pub mod log;
pub mod migrations;
pub mod report;
pub mod stats;
pub mod task;
pub mod track;

use crate::db::db::Db;
use crate::libs::config::{Config, LimitsConfig};
use crate::libs::data_storage::home_dir;
use crate::libs::meta::{APP_METADATA_NAME, APP_METADATA_VERSION};
use crate::libs::time::{parse_human_time, Clock};
use anyhow::Result;
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Show the task being tracked")]
    Active(active::ActiveArgs),
    #[command(about = "Manage tasks")]
    Task(task::TaskArgs),
    #[command(about = "Start, stop and edit tracking")]
    Track(track::TrackArgs),
    #[command(about = "List or delete task logs")]
    Log(log::LogArgs),
    #[command(about = "Show time spent per task")]
    Stats(stats::StatsArgs),
    #[command(about = "Show time spent per day")]
    Report(report::ReportArgs),
    #[command(about = "Inspect the database schema version")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(name = APP_METADATA_NAME, version = APP_METADATA_VERSION, author, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// Database file (defaults to the configured path, then ~/hours.v1.db)
    #[arg(long, global = true, value_name = "PATH")]
    dbpath: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        let config = Config::read()?;
        let db_path = config.db_path(cli.dbpath.as_deref(), &home_dir());
        debug!(path = %db_path.display(), "resolved database path");

        let session = || Session::open(&db_path, config.limits.clone());

        match cli.command {
            Commands::Active(args) => active::cmd(args, &session()?),
            Commands::Task(args) => task::cmd(args, &session()?),
            Commands::Track(args) => track::cmd(args, &session()?),
            Commands::Log(args) => log::cmd(args, &session()?),
            Commands::Stats(args) => stats::cmd(args, &session()?),
            Commands::Report(args) => report::cmd(args, &session()?),
            Commands::Migrations(args) => migrations::cmd(args, &db_path),
        }
    }
}

/// Everything a command needs to run against the database.
pub struct Session {
    pub db: Db,
    pub limits: LimitsConfig,
    pub clock: Clock,
}

impl Session {
    pub fn open(db_path: &Path, limits: LimitsConfig) -> Result<Self> {
        let clock = Clock::from_env()?;
        let db = Db::open(db_path)?;
        Ok(Session { db, limits, clock })
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }
}

/// clap value parser for `YYYY/MM/DD HH:MM` arguments.
pub(crate) fn human_time(input: &str) -> Result<DateTime<Local>, String> {
    parse_human_time(input).map_err(|err| err.to_string())
}
