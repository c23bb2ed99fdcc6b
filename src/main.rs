use hours::commands::Cli;
use hours::db::error::DbError;
use hours::libs::messages::{macros::is_debug_mode, Message};
use hours::msg_error;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hours=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    if is_debug_mode() {
        init_tracing();
    }

    match Cli::menu() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DbError>() {
                Some(db_err) if db_err.is_fatal() => msg_error!(Message::FatalStartup(format!("{:#}", err))),
                _ => msg_error!(format!("{:#}", err)),
            }
            ExitCode::FAILURE
        }
    }
}
