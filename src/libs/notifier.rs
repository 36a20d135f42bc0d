//! Reminder scheduling contract.
//!
//! Notification delivery itself lives outside this layer; the repositories
//! only consume a schedule/cancel interface. Both operations are best-effort
//! from the data layer's point of view: a scheduling or cancellation failure
//! is logged and never blocks the owning database mutation.

use anyhow::Result;
use chrono::NaiveDateTime;

/// External collaborator that delivers reminders.
///
/// `schedule` returns an opaque notification id which the caller persists on
/// the owning row (event or habit) so the reminder can be cancelled later.
pub trait ReminderScheduler {
    fn schedule(&self, title: &str, body: &str, trigger_time: NaiveDateTime, entity_id: &str) -> Result<String>;
    fn cancel(&self, notification_id: &str) -> Result<()>;
}

/// Default scheduler used when no platform integration is wired in.
///
/// Records schedule/cancel calls in the trace log and hands back a synthetic
/// notification id, so the repository code paths behave identically with or
/// without a real delivery backend.
pub struct LogScheduler;

impl ReminderScheduler for LogScheduler {
    fn schedule(&self, title: &str, _body: &str, trigger_time: NaiveDateTime, entity_id: &str) -> Result<String> {
        tracing::debug!(%title, %trigger_time, %entity_id, "reminder scheduled (log only)");
        Ok(format!("log-{}", entity_id))
    }

    fn cancel(&self, notification_id: &str) -> Result<()> {
        tracing::debug!(%notification_id, "reminder cancelled (log only)");
        Ok(())
    }
}
