#[derive(Debug, Clone)]
pub enum Message {
    // === DATABASE & MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseNeedsUpdate,
    DatabaseUpToDate,
    MigrationHistory,
    NothingToRollback,
    RollingBack(u32, u32),
    RollbackCompleted(u32),
    DatabaseInitialized(String),

    // === TASK MESSAGES ===
    TaskNotFound(String),
    TaskProjectCleared(String, usize), // project id, tasks detached

    // === HABIT MESSAGES ===
    HabitNotFound(String),
    HabitLogRecorded(String, String), // habit id, date
    HabitStreakUpdated(String, u32, u32),

    // === CALENDAR MESSAGES ===
    EventNotFound(String),
    ReminderScheduleFailed(String),
    ReminderCancelFailed(String),

    // === FINANCE MESSAGES ===
    TransactionNotFound(String),
    AssetNotFound(String),
    LiabilityNotFound(String),
    BudgetNotFound(String),
    BudgetAlreadyExists(String, String), // category, start date
    BudgetRolloverCreated(String, String),

    // === CATEGORY MESSAGES ===
    CategoryNotFound(String),
    CategoryNameTaken(String),
    DefaultCategoryImmutable(String),
    DefaultCategoriesSeeded(usize),
    DefaultCategoriesPresent,

    // === FOCUS SESSION MESSAGES ===
    SessionNotFound(String),

    // === EXPORT MESSAGES ===
    ExportCompleted(String),
    ExportFailed(String),

    // === RESET MESSAGES ===
    ResetConfirmPrompt,
    ResetCancelled,
    ResetCompleted,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigParseError(String),

    // === SUMMARY MESSAGES ===
    BudgetSummaryHeader,
    NoActiveBudgets,

    // === GENERIC ===
    Custom(String),
}
