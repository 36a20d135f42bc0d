//! Display implementation for vitalog application messages.
//!
//! All user-facing message text lives here, keyed by the `Message` enum.
//! Keeping the text in one place gives consistent formatting and makes the
//! message catalogue easy to audit.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            // === DATABASE & MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Applying migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} applied", version),
            Message::MigrationFailed(version, err) => format!("Migration v{} failed: {}", version, err),
            Message::AllMigrationsCompleted => "Database schema is up to date".to_string(),
            Message::DatabaseVersion(version) => format!("Database schema version: {}", version),
            Message::DatabaseNeedsUpdate => "Database needs migration".to_string(),
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationHistory => "Migration history".to_string(),
            Message::NothingToRollback => "Nothing to roll back".to_string(),
            Message::RollingBack(from, to) => format!("Rolling back from v{} to v{}", from, to),
            Message::RollbackCompleted(version) => format!("Rolled back to v{}", version),
            Message::DatabaseInitialized(path) => format!("Database initialized at {}", path),

            // === TASK MESSAGES ===
            Message::TaskNotFound(id) => format!("Task '{}' not found", id),
            Message::TaskProjectCleared(project_id, count) => {
                format!("Cleared project '{}' from {} task(s)", project_id, count)
            }

            // === HABIT MESSAGES ===
            Message::HabitNotFound(id) => format!("Habit '{}' not found", id),
            Message::HabitLogRecorded(id, date) => format!("Completion logged for habit '{}' on {}", id, date),
            Message::HabitStreakUpdated(id, current, longest) => {
                format!("Habit '{}' streaks updated: current {}, longest {}", id, current, longest)
            }

            // === CALENDAR MESSAGES ===
            Message::EventNotFound(id) => format!("Event '{}' not found", id),
            Message::ReminderScheduleFailed(err) => format!("Could not schedule reminder: {}", err),
            Message::ReminderCancelFailed(err) => format!("Could not cancel reminder: {}", err),

            // === FINANCE MESSAGES ===
            Message::TransactionNotFound(id) => format!("Transaction '{}' not found", id),
            Message::AssetNotFound(id) => format!("Asset '{}' not found", id),
            Message::LiabilityNotFound(id) => format!("Liability '{}' not found", id),
            Message::BudgetNotFound(id) => format!("Budget '{}' not found", id),
            Message::BudgetAlreadyExists(category, start) => {
                format!("A budget for '{}' starting {} already exists", category, start)
            }
            Message::BudgetRolloverCreated(category, start) => {
                format!("Recurring budget for '{}' rolled over to {}", category, start)
            }

            // === CATEGORY MESSAGES ===
            Message::CategoryNotFound(id) => format!("Category '{}' not found", id),
            Message::CategoryNameTaken(name) => format!("A category named '{}' already exists", name),
            Message::DefaultCategoryImmutable(name) => format!("Default category '{}' cannot be modified or deleted", name),
            Message::DefaultCategoriesSeeded(count) => format!("Seeded {} default categories", count),
            Message::DefaultCategoriesPresent => "Default categories already present, skipping seed".to_string(),

            // === FOCUS SESSION MESSAGES ===
            Message::SessionNotFound(id) => format!("Focus session '{}' not found", id),

            // === EXPORT MESSAGES ===
            Message::ExportCompleted(path) => format!("Snapshot exported to: {}", path),
            Message::ExportFailed(err) => format!("Export failed: {}", err),

            // === RESET MESSAGES ===
            Message::ResetConfirmPrompt => "This will permanently delete ALL local data. Continue?".to_string(),
            Message::ResetCancelled => "Reset cancelled".to_string(),
            Message::ResetCompleted => "All data cleared, schema recreated".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigParseError(err) => format!("Failed to parse configuration: {}", err),

            // === SUMMARY MESSAGES ===
            Message::BudgetSummaryHeader => "💰 Budget summary".to_string(),
            Message::NoActiveBudgets => "No active budgets for today".to_string(),

            // === GENERIC ===
            Message::Custom(text) => text.clone(),
        };
        write!(f, "{}", msg)
    }
}
