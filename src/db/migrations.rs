//! Database schema migration management.
//!
//! Schema evolution goes through an explicit applied-migrations ledger: every
//! migration is recorded in the `migrations` table with its version, name and
//! timestamp, and is applied exactly once. Re-running against a current
//! database is a no-op. A failing migration rolls back and propagates — the
//! store is unusable on a half-applied schema, so there is no try-and-ignore
//! path here.

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info, msg_success};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

/// Ledger of applied migrations; the single source of truth for the current
/// schema version.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of all schema migrations, applied in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    /// Registers all migrations in chronological order. Version 0 is the
    /// implicit empty database.
    fn register_migrations(&mut self) {
        // Version 1: full base schema and index set.
        self.add_migration(1, "create_base_schema", |tx| {
            // Tasks
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    status TEXT NOT NULL DEFAULT 'todo',
                    priority TEXT NOT NULL DEFAULT 'medium',
                    due_date TEXT,
                    completed_at TEXT,
                    project_id TEXT,
                    tags TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)", [])?;

            // Habits and their completion logs
            tx.execute(
                "CREATE TABLE IF NOT EXISTS habits (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    cadence TEXT NOT NULL DEFAULT 'daily',
                    target_count INTEGER NOT NULL DEFAULT 1,
                    current_streak INTEGER NOT NULL DEFAULT 0,
                    longest_streak INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_habits_cadence ON habits(cadence)", [])?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS habit_logs (
                    id TEXT PRIMARY KEY,
                    habit_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 1,
                    notes TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0,
                    UNIQUE(habit_id, date),
                    FOREIGN KEY (habit_id) REFERENCES habits(id) ON DELETE CASCADE
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_habit_logs_habit ON habit_logs(habit_id)", [])?;

            // Calendar events
            tx.execute(
                "CREATE TABLE IF NOT EXISTS events (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    start_time TEXT NOT NULL,
                    end_time TEXT NOT NULL,
                    is_all_day INTEGER NOT NULL DEFAULT 0,
                    recurrence TEXT,
                    reminder_minutes INTEGER,
                    notification_id TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_time)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_events_end ON events(end_time)", [])?;

            // Finance: transactions, assets, liabilities, budgets
            tx.execute(
                "CREATE TABLE IF NOT EXISTS transactions (
                    id TEXT PRIMARY KEY,
                    type TEXT NOT NULL,
                    amount REAL NOT NULL,
                    category TEXT NOT NULL,
                    description TEXT,
                    date TEXT NOT NULL,
                    currency TEXT NOT NULL DEFAULT 'USD',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(type)", [])?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS assets (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    type TEXT NOT NULL,
                    value REAL NOT NULL,
                    currency TEXT NOT NULL DEFAULT 'USD',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS liabilities (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    type TEXT NOT NULL,
                    amount REAL NOT NULL,
                    currency TEXT NOT NULL DEFAULT 'USD',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS budgets (
                    id TEXT PRIMARY KEY,
                    category TEXT NOT NULL,
                    amount REAL NOT NULL,
                    period TEXT NOT NULL DEFAULT 'monthly',
                    start_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    is_recurring INTEGER NOT NULL DEFAULT 0,
                    alert_threshold REAL NOT NULL DEFAULT 0.8,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0,
                    UNIQUE(category, start_date)
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_budgets_category_period ON budgets(category, period)", [])?;

            // Categories
            tx.execute(
                "CREATE TABLE IF NOT EXISTS categories (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    icon TEXT,
                    color TEXT,
                    type TEXT NOT NULL,
                    is_custom INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_categories_type_custom ON categories(type, is_custom)", [])?;

            // Focus sessions
            tx.execute(
                "CREATE TABLE IF NOT EXISTS focus_sessions (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    duration_minutes INTEGER NOT NULL,
                    actual_minutes INTEGER,
                    is_pomodoro INTEGER NOT NULL DEFAULT 0,
                    status TEXT NOT NULL DEFAULT 'scheduled',
                    start_time TEXT,
                    end_time TEXT,
                    task_id TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    synced INTEGER NOT NULL DEFAULT 0,
                    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE SET NULL
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_focus_status ON focus_sessions(status)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_focus_task ON focus_sessions(task_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_focus_start ON focus_sessions(start_time)", [])?;

            Ok(())
        });

        // Version 2: recurrence rules on tasks (JSON-encoded, optional).
        self.add_migration(2, "add_task_recurrence", |tx| {
            tx.execute("ALTER TABLE tasks ADD COLUMN recurrence TEXT", [])?;
            Ok(())
        });

        // Version 3: habit reminders and their scheduled notification handle.
        self.add_migration(3, "add_habit_reminders", |tx| {
            tx.execute("ALTER TABLE habits ADD COLUMN reminder_time TEXT", [])?;
            tx.execute("ALTER TABLE habits ADD COLUMN notification_id TEXT", [])?;
            Ok(())
        });

        // Version 4: free-form location on calendar events.
        self.add_migration(4, "add_event_location", |tx| {
            tx.execute("ALTER TABLE events ADD COLUMN location TEXT", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies all pending migrations in order, recording each in the ledger.
    /// The whole pending batch runs inside one transaction; failure rolls
    /// everything back and propagates.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!("Database is up to date");
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        let tx = conn.transaction()?;

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    msg_debug!(Message::MigrationCompleted(migration.version));
                }
                Err(e) => {
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e);
                }
            }
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0)).unwrap_or(Some(0));

        Ok(version.unwrap_or(0))
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;

        Ok(count > 0)
    }

    /// Chronological list of applied migrations as (version, name, applied_at).
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }

    /// Development-only rollback: removes ledger records beyond the target
    /// version. Does not reverse the schema changes themselves.
    #[cfg(debug_assertions)]
    pub fn rollback_to(&self, conn: &mut Connection, target_version: u32) -> Result<()> {
        let current_version = self.get_current_version(conn)?;

        if target_version >= current_version {
            msg_info!(Message::NothingToRollback);
            return Ok(());
        }

        msg_info!(Message::RollingBack(current_version, target_version));
        conn.execute("DELETE FROM migrations WHERE version > ?1", params![target_version])?;
        msg_success!(Message::RollbackCompleted(target_version));
        Ok(())
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Brings a connection to the current schema version.
pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    let manager = MigrationManager::new();
    manager.run_migrations(conn)?;
    Ok(())
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    let manager = MigrationManager::new();
    manager.get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    let current = manager.get_current_version(conn)?;
    let latest = manager.migrations.last().map(|m| m.version).unwrap_or(0);
    Ok(current < latest)
}
