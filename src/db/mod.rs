//! Persistence layer for hours.
//!
//! Everything that touches the SQLite file goes through this module. A single
//! [`db::Db`] handle owns the connection; the repositories are thin views
//! over it that share the same lock.
//!
//! ## Layout
//!
//! - [`db`]: connection handle, transaction helper, timestamp columns
//! - [`migrations`]: version-1 schema and forward migrations
//! - [`tasks`]: task CRUD
//! - [`task_logs`]: active log lifecycle, closed logs and aggregate upkeep
//! - [`stats`]: per-task aggregates for statistics and records
//! - [`error`]: [`error::DbError`]
//!
//! ## Usage
//!
//! ```rust
//! use hours::db::{db::Db, stats::Stats, tasks::Tasks};
//! use chrono::Local;
//!
//! let db = Db::open_in_memory()?;
//! Tasks::new(&db).insert("review pull requests", Local::now())?;
//! assert!(Stats::new(&db).aggregate_per_task(10)?.is_empty());
//! # Ok::<(), hours::db::error::DbError>(())
//! ```

/// Connection handle and shared helpers.
pub mod db;

/// Persistence errors.
pub mod error;

/// Schema creation, versioning and forward migrations.
pub mod migrations;

/// Per-task aggregates.
pub mod stats;

/// Task log storage and the active log lifecycle.
pub mod task_logs;

/// Task storage.
pub mod tasks;
