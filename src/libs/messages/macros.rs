//! Output macros for user-facing messages.
//!
//! Every human-readable line hours prints goes through one of these macros.
//! In debug mode (`HOURS_DEBUG` or `RUST_LOG` set) they emit `tracing`
//! events instead, so that diagnostics and messages end up in one ordered
//! stream. JSON produced by the tracking commands never goes through here;
//! it is written straight to stdout.
//!
//! | Macro | Normal mode | Debug mode |
//! |-------|-------------|------------|
//! | `msg_print!` | stdout | `info!` |
//! | `msg_success!` | stdout, `✅` prefix | `info!` |
//! | `msg_info!` | stdout, `ℹ️` prefix | `info!` |
//! | `msg_warning!` | stdout, `⚠️` prefix | `warn!` |
//! | `msg_error!` | stderr, `❌` prefix | `error!` |
//!
//! ```rust
//! use hours::libs::messages::Message;
//! use hours::{msg_info, msg_success};
//!
//! msg_success!(Message::TaskRenamed(1, "write docs".into()));
//! msg_info!(Message::NoLogsFound);
//! ```

use std::sync::OnceLock;

/// Environment variable that switches the macros to `tracing` output.
pub const DEBUG_ENV_VAR: &str = "HOURS_DEBUG";

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Whether debug output is on; read once per process.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var(DEBUG_ENV_VAR).is_ok() || std::env::var("RUST_LOG").is_ok())
}

/// Prints a message as is.
#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", $msg);
        } else {
            println!("{}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\n{}\n", $msg);
        } else {
            println!("\n{}\n", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("✅ {}", $msg);
        } else {
            println!("✅ {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", $msg);
        } else {
            println!("ℹ️ {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("⚠️ {}", $msg);
        } else {
            println!("⚠️ {}", $msg);
        }
    };
}

/// Prints an error to stderr.
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", $msg);
        } else {
            eprintln!("❌ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("\n❌ {}\n", $msg);
        } else {
            eprintln!("\n❌ {}\n", $msg);
        }
    };
}
