/// Application configuration file handling.
pub mod config;

/// Platform-specific application data paths.
pub mod data_storage;

/// Full-snapshot JSON export for backup.
pub mod export;

/// Entity id and timestamp generation.
pub mod id;

/// Centralized user-facing message catalogue and display macros.
pub mod messages;

/// Reminder schedule/cancel contract consumed by the repositories.
pub mod notifier;
