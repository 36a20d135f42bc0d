//! Database layer for the vitalog application.
//!
//! A complete persistence layer over a single SQLite file: one repository
//! module per entity family, a ledger-based migration system, and guarded
//! seeding of default reference data. Repositories are constructed from an
//! explicit database path, so several isolated stores can coexist (the test
//! suites rely on this).

/// Core database connection handle and reset surface.
pub mod db;

/// Versioned schema migration system with an applied-migrations ledger.
pub mod migrations;

/// Task storage: status/priority enums, tag lists, filtered queries.
pub mod tasks;

/// Habit storage with per-day completion logs and derived streak counters.
pub mod habits;

/// Calendar event storage with reminder side effects.
pub mod events;

/// Financial transaction storage and spend aggregation helpers.
pub mod transactions;

/// Asset and liability storage.
pub mod assets;

/// Budget definition storage.
pub mod budgets;

/// Transaction categories and default-catalogue seeding.
pub mod categories;

/// Focus session storage and its status state machine.
pub mod focus;
