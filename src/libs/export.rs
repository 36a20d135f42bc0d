//! Full-snapshot export for backup.
//!
//! Reads every repository's listing and serializes the lot into one JSON
//! document with per-entity counts. There is no import path in this layer;
//! the document exists so the data can leave the device intact.

use crate::db::assets::{Asset, Assets, Liabilities, Liability};
use crate::db::budgets::{Budget, Budgets};
use crate::db::categories::{Categories, Category};
use crate::db::events::{Event, Events};
use crate::db::focus::{FocusSession, FocusSessions};
use crate::db::habits::{Habit, HabitLog, Habits};
use crate::db::migrations::get_db_version;
use crate::db::tasks::{Task, TaskFilter, TaskSort, Tasks};
use crate::db::transactions::{Transaction, TransactionFilter, Transactions};
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct SnapshotCounts {
    pub tasks: usize,
    pub habits: usize,
    pub habit_logs: usize,
    pub events: usize,
    pub transactions: usize,
    pub assets: usize,
    pub liabilities: usize,
    pub budgets: usize,
    pub categories: usize,
    pub focus_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub exported_at: String,
    pub schema_version: u32,
    pub counts: SnapshotCounts,
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
    pub habit_logs: Vec<HabitLog>,
    pub events: Vec<Event>,
    pub transactions: Vec<Transaction>,
    pub assets: Vec<Asset>,
    pub liabilities: Vec<Liability>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<Category>,
    pub focus_sessions: Vec<FocusSession>,
}

pub struct Exporter {
    db_path: PathBuf,
}

impl Exporter {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Assembles the full snapshot from every repository.
    pub fn build_snapshot(&self) -> Result<Snapshot> {
        let tasks = Tasks::new(&self.db_path)?.fetch(&TaskFilter::default(), TaskSort::default())?;
        let habits_repo = Habits::new(&self.db_path)?;
        let habits = habits_repo.list()?;
        let habit_logs = habits_repo.all_logs()?;
        let events = Events::new(&self.db_path)?.list()?;
        let transactions = Transactions::new(&self.db_path)?.fetch(&TransactionFilter::default())?;
        let assets = Assets::new(&self.db_path)?.list()?;
        let liabilities = Liabilities::new(&self.db_path)?.list()?;
        let budgets = Budgets::new(&self.db_path)?.list()?;
        let categories = Categories::new(&self.db_path)?.list()?;
        let focus_sessions = FocusSessions::new(&self.db_path)?.list()?;

        let schema_version = get_db_version(&habits_repo.conn)?;

        Ok(Snapshot {
            exported_at: chrono::Utc::now().to_rfc3339(),
            schema_version,
            counts: SnapshotCounts {
                tasks: tasks.len(),
                habits: habits.len(),
                habit_logs: habit_logs.len(),
                events: events.len(),
                transactions: transactions.len(),
                assets: assets.len(),
                liabilities: liabilities.len(),
                budgets: budgets.len(),
                categories: categories.len(),
                focus_sessions: focus_sessions.len(),
            },
            tasks,
            habits,
            habit_logs,
            events,
            transactions,
            assets,
            liabilities,
            budgets,
            categories,
            focus_sessions,
        })
    }

    /// Writes the snapshot as pretty-printed JSON to an explicit path.
    pub fn export_to(&self, output: &Path) -> Result<()> {
        let snapshot = self.build_snapshot()?;
        let file = File::create(output)?;
        serde_json::to_writer_pretty(file, &snapshot)?;
        Ok(())
    }

    /// Writes the snapshot under the application data directory with a
    /// timestamped file name and returns that path.
    pub fn export(&self) -> Result<PathBuf> {
        let file_name = format!("vitalog-snapshot-{}.json", Local::now().format("%Y%m%d-%H%M%S"));
        let output = DataStorage::new().get_path(&file_name).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        self.export_to(&output)?;
        Ok(output)
    }
}
