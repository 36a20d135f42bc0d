//! Derived analytics computed on demand from raw persisted rows.
//!
//! No engine here caches or materializes anything: every call re-reads the
//! relevant rows through its repository and recomputes the view.

/// Budget spend aggregation, status classification and recurring rollover.
pub mod budget_status;

/// Interval-overlap conflict detection for calendar events.
pub mod conflicts;

/// Completion-latency aggregation and stale-task detection.
pub mod latency;

/// Consecutive-day streak computation for habits and focus sessions.
pub mod streaks;
