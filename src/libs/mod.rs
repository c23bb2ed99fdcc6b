//! Core library modules for hours.
//!
//! ## Features
//!
//! - **Domain**: task and log records, time primitives
//! - **Services**: tracking rules and reporting queries on top of [`crate::db`]
//! - **Presentation**: tables, duration formatting, user-facing messages
//! - **Infrastructure**: configuration, data directory, build metadata
//!
//! ## Usage
//!
//! ```rust
//! use hours::db::db::Db;
//! use hours::libs::config::LimitsConfig;
//! use hours::libs::reporting::Reporter;
//! use chrono::Local;
//!
//! let db = Db::open_in_memory()?;
//! let records = Reporter::new(&db, LimitsConfig::default()).records("today", Local::now(), false)?;
//! assert!(records.entries.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data_storage;
pub mod formatter;
pub mod messages;
pub mod meta;
pub mod reporting;
pub mod task;
pub mod time;
pub mod tracking;
pub mod view;
