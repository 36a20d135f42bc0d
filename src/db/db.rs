//! Database connection handle.
//!
//! Unlike a process-wide singleton, every `Db` is an explicit handle opened
//! from a path. Repositories take the path in their constructors and open
//! their own connection through here, so tests and callers can keep several
//! fully isolated stores side by side.

use crate::db::migrations::init_with_migrations;
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "vitalog.db";

pub struct Db {
    pub conn: Connection,
    path: PathBuf,
}

impl Db {
    /// Opens the application database in the platform data directory,
    /// applying any pending migrations.
    pub fn new() -> Result<Db> {
        let config = Config::read()?;
        let db_file_path = DataStorage::new().get_path(&config.db_file).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Self::open(&db_file_path)
    }

    /// Opens (or creates) the database at an explicit path, applying any
    /// pending migrations. Safe to call on every start: schema creation uses
    /// `CREATE ... IF NOT EXISTS` and applied migrations are skipped via the
    /// migrations ledger.
    pub fn open(path: &Path) -> Result<Db> {
        let mut conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_with_migrations(&mut conn)?;

        Ok(Db {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Opens a raw connection without running migrations. Used by the
    /// migration status command and by migration tests.
    pub fn open_without_migrations(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Resolves the default database path without opening a connection.
    pub fn default_path() -> Result<PathBuf> {
        let config = Config::read()?;
        DataStorage::new().get_path(&config.db_file).map_err(|e| anyhow::anyhow!(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drops every application table (including the migrations ledger) and
    /// recreates the schema from scratch. Destructive and irreversible; the
    /// CLI gates this behind an explicit confirmation prompt.
    pub fn reset(&mut self) -> Result<()> {
        let tables = [
            "habit_logs",
            "habits",
            "focus_sessions",
            "tasks",
            "events",
            "transactions",
            "assets",
            "liabilities",
            "budgets",
            "categories",
            "migrations",
        ];

        let tx = self.conn.transaction()?;
        // Suspend FK enforcement while tables disappear in bulk.
        tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
        for table in tables {
            tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", table))?;
        }
        tx.commit()?;

        init_with_migrations(&mut self.conn)?;
        Ok(())
    }

    /// Explicitly closes the connection. Reopening is `Db::open` again.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}
