//! # Vitalog - local-first personal data core
//!
//! Embedded persistence and analytics layer for a personal-productivity
//! application. Everything lives in a single SQLite file with zero network
//! dependency.
//!
//! ## Features
//!
//! - **Schema Lifecycle**: Idempotent creation, ledger-tracked migrations,
//!   guarded default-category seeding
//! - **Entity Repositories**: Tasks, habits, calendar events, transactions,
//!   assets/liabilities, budgets, categories and focus sessions
//! - **Derived Analytics**: Calendar conflict detection, consecutive-day
//!   streaks, budget status over rolling windows, completion latency
//! - **Backup Surface**: Full JSON snapshot export
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vitalog::db::tasks::{NewTask, TaskFilter, TaskSort, Tasks};
//!
//! # fn main() -> anyhow::Result<()> {
//! let db_path = vitalog::db::db::Db::default_path()?;
//! let mut tasks = Tasks::new(&db_path)?;
//! let task = tasks.create(NewTask::new("Review budget"))?;
//! let all = tasks.fetch(&TaskFilter::default(), TaskSort::default())?;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod commands;
pub mod db;
pub mod libs;
