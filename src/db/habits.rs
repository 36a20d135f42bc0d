//! Habit storage, completion logs and derived streaks.
//!
//! Habit logs are owned by their habit (one row per habit per calendar day,
//! cascade-deleted with the habit). The persisted streak counters are derived
//! data: every log mutation recomputes them through the streak calculator so
//! the stored values always match what the logs imply.

use crate::analytics::streaks::{compute_streaks, Streaks};
use crate::db::db::Db;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::libs::notifier::{LogScheduler, ReminderScheduler};
use crate::{msg_bail_anyhow, msg_debug, msg_error_anyhow, msg_warning};
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SELECT_HABIT: &str =
    "SELECT id, name, description, cadence, target_count, current_streak, longest_streak, reminder_time, notification_id, created_at, updated_at, synced FROM habits";
const INSERT_HABIT: &str = "INSERT INTO habits (id, name, description, cadence, target_count, reminder_time, notification_id, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)";
const DELETE_HABIT: &str = "DELETE FROM habits WHERE id = ?1";
const UPDATE_STREAKS: &str = "UPDATE habits SET current_streak = ?2, longest_streak = ?3, updated_at = ?4, synced = 0 WHERE id = ?1";

const SELECT_LOGS: &str = "SELECT id, habit_id, date, completed, notes, created_at, updated_at, synced FROM habit_logs WHERE habit_id = ?1 ORDER BY date DESC";
const SELECT_COMPLETED_DATES: &str = "SELECT DISTINCT date FROM habit_logs WHERE habit_id = ?1 AND completed = 1 ORDER BY date DESC";
const UPSERT_LOG: &str = "INSERT INTO habit_logs (id, habit_id, date, completed, notes, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, 1, ?4, ?5, ?5, 0)
    ON CONFLICT(habit_id, date) DO UPDATE SET completed = 1, notes = excluded.notes, updated_at = excluded.updated_at, synced = 0";
const DELETE_LOG: &str = "DELETE FROM habit_logs WHERE habit_id = ?1 AND date = ?2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitCadence {
    Daily,
    Weekly,
    Monthly,
}

impl HabitCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCadence::Daily => "daily",
            HabitCadence::Weekly => "weekly",
            HabitCadence::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(HabitCadence::Daily),
            "weekly" => Some(HabitCadence::Weekly),
            "monthly" => Some(HabitCadence::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cadence: HabitCadence,
    pub target_count: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Daily reminder as "HH:MM", when configured.
    pub reminder_time: Option<String>,
    pub notification_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: String,
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub cadence: HabitCadence,
    pub target_count: u32,
    pub reminder_time: Option<String>,
}

impl NewHabit {
    pub fn new(name: &str, cadence: HabitCadence) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            cadence,
            target_count: 1,
            reminder_time: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub cadence: Option<HabitCadence>,
    pub target_count: Option<u32>,
    pub reminder_time: Option<Option<String>>,
}

pub struct Habits {
    pub conn: Connection,
    scheduler: Box<dyn ReminderScheduler>,
}

impl Habits {
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_scheduler(db_path, Box::new(LogScheduler))
    }

    pub fn with_scheduler(db_path: &Path, scheduler: Box<dyn ReminderScheduler>) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn, scheduler })
    }

    pub fn create(&mut self, new: NewHabit) -> Result<Habit> {
        let id = new_id();
        let now = now_iso();

        let notification_id = new
            .reminder_time
            .as_deref()
            .and_then(|time| self.schedule_reminder(&id, &new.name, time));

        self.conn.execute(
            INSERT_HABIT,
            params![
                id,
                new.name,
                new.description,
                new.cadence.as_str(),
                new.target_count,
                new.reminder_time,
                notification_id,
                now,
                now,
            ],
        )?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::HabitNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Habit>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_HABIT), params![id], map_habit)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY created_at DESC", SELECT_HABIT))?;
        let habit_iter = stmt.query_map([], map_habit)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }
        Ok(habits)
    }

    pub fn list_by_cadence(&self, cadence: HabitCadence) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE cadence = ?1 ORDER BY created_at DESC", SELECT_HABIT))?;
        let habit_iter = stmt.query_map(params![cadence.as_str()], map_habit)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }
        Ok(habits)
    }

    pub fn update(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit> {
        let existing = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::HabitNotFound(id.to_string())))?;
        let now = now_iso();

        // Reminder change: cancel the old schedule, create the new one.
        let mut notification_id = existing.notification_id.clone();
        if let Some(reminder) = &patch.reminder_time {
            if let Some(old_id) = &existing.notification_id {
                self.cancel_reminder(old_id);
            }
            notification_id = match reminder {
                Some(time) => {
                    let name = patch.name.as_deref().unwrap_or(&existing.name);
                    self.schedule_reminder(id, name, time)
                }
                None => None,
            };
        }

        let name = patch.name.clone().unwrap_or(existing.name);
        let description = match &patch.description {
            Some(d) => d.clone(),
            None => existing.description,
        };
        let cadence = patch.cadence.unwrap_or(existing.cadence);
        let target_count = patch.target_count.unwrap_or(existing.target_count);
        let reminder_time = match &patch.reminder_time {
            Some(r) => r.clone(),
            None => existing.reminder_time,
        };

        self.conn.execute(
            "UPDATE habits SET name = ?2, description = ?3, cadence = ?4, target_count = ?5, reminder_time = ?6, notification_id = ?7, updated_at = ?8, synced = 0 WHERE id = ?1",
            params![id, name, description, cadence.as_str(), target_count, reminder_time, notification_id, now],
        )?;

        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::HabitNotFound(id.to_string())))
    }

    /// Deletes the habit and, via cascade, all its logs. A configured
    /// reminder is cancelled first; cancellation failures never block the
    /// delete.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let habit = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::HabitNotFound(id.to_string())))?;
        if let Some(notification_id) = &habit.notification_id {
            self.cancel_reminder(notification_id);
        }

        self.conn.execute(DELETE_HABIT, params![id])?;
        Ok(())
    }

    /// Records a completion for one calendar day. A second log for the same
    /// (habit, date) collapses onto the existing row. Streak counters are
    /// recomputed afterwards.
    pub fn log_completion(&mut self, habit_id: &str, date: NaiveDate, notes: Option<&str>) -> Result<HabitLog> {
        if self.get(habit_id)?.is_none() {
            msg_bail_anyhow!(Message::HabitNotFound(habit_id.to_string()));
        }

        let now = now_iso();
        self.conn
            .execute(UPSERT_LOG, params![new_id(), habit_id, date.format("%Y-%m-%d").to_string(), notes, now])?;
        msg_debug!(Message::HabitLogRecorded(habit_id.to_string(), date.format("%Y-%m-%d").to_string()));

        self.recalculate_streaks(habit_id, Local::now().date_naive())?;

        let log = self
            .conn
            .query_row(
                "SELECT id, habit_id, date, completed, notes, created_at, updated_at, synced FROM habit_logs WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date.format("%Y-%m-%d").to_string()],
                map_log,
            )
            .optional()?;
        log.ok_or_else(|| msg_error_anyhow!(Message::HabitNotFound(habit_id.to_string())))
    }

    pub fn remove_log(&mut self, habit_id: &str, date: NaiveDate) -> Result<()> {
        self.conn.execute(DELETE_LOG, params![habit_id, date.format("%Y-%m-%d").to_string()])?;
        self.recalculate_streaks(habit_id, Local::now().date_naive())?;
        Ok(())
    }

    pub fn logs_for(&self, habit_id: &str) -> Result<Vec<HabitLog>> {
        let mut stmt = self.conn.prepare(SELECT_LOGS)?;
        let log_iter = stmt.query_map(params![habit_id], map_log)?;

        let mut logs = Vec::new();
        for log in log_iter {
            logs.push(log?);
        }
        Ok(logs)
    }

    /// Every log row across all habits, used by the snapshot export.
    pub fn all_logs(&self) -> Result<Vec<HabitLog>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, habit_id, date, completed, notes, created_at, updated_at, synced FROM habit_logs ORDER BY date DESC")?;
        let log_iter = stmt.query_map([], map_log)?;

        let mut logs = Vec::new();
        for log in log_iter {
            logs.push(log?);
        }
        Ok(logs)
    }

    /// Distinct calendar days with a completed log, newest first.
    pub fn completed_dates(&self, habit_id: &str) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(SELECT_COMPLETED_DATES)?;
        let date_iter = stmt.query_map(params![habit_id], |row| {
            let raw: String = row.get(0)?;
            Ok(raw)
        })?;

        let mut dates = Vec::new();
        for raw in date_iter {
            if let Ok(date) = NaiveDate::parse_from_str(&raw?, "%Y-%m-%d") {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    /// Recomputes streaks from the logs and persists them on the habit row.
    pub fn recalculate_streaks(&mut self, habit_id: &str, today: NaiveDate) -> Result<Streaks> {
        let dates = self.completed_dates(habit_id)?;
        let streaks = compute_streaks(&dates, today);

        self.conn
            .execute(UPDATE_STREAKS, params![habit_id, streaks.current, streaks.longest, now_iso()])?;
        msg_debug!(Message::HabitStreakUpdated(habit_id.to_string(), streaks.current, streaks.longest));
        Ok(streaks)
    }

    fn schedule_reminder(&self, habit_id: &str, name: &str, time: &str) -> Option<String> {
        let trigger = match next_trigger(time) {
            Some(t) => t,
            None => return None,
        };
        match self.scheduler.schedule(name, "Time to check in on your habit", trigger, habit_id) {
            Ok(notification_id) => Some(notification_id),
            Err(e) => {
                msg_warning!(Message::ReminderScheduleFailed(e.to_string()));
                None
            }
        }
    }

    fn cancel_reminder(&self, notification_id: &str) {
        if let Err(e) = self.scheduler.cancel(notification_id) {
            msg_warning!(Message::ReminderCancelFailed(e.to_string()));
        }
    }
}

/// Next occurrence of a daily "HH:MM" reminder: today if still ahead,
/// otherwise tomorrow.
fn next_trigger(time: &str) -> Option<chrono::NaiveDateTime> {
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let now = Local::now().naive_local();
    let today = now.date().and_time(time);
    if today > now {
        Some(today)
    } else {
        Some(today + chrono::Duration::days(1))
    }
}

fn map_habit(row: &Row) -> rusqlite::Result<Habit> {
    let cadence_raw: String = row.get(3)?;
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        cadence: HabitCadence::parse(&cadence_raw).unwrap_or(HabitCadence::Daily),
        target_count: row.get(4)?,
        current_streak: row.get(5)?,
        longest_streak: row.get(6)?,
        reminder_time: row.get(7)?,
        notification_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        synced: row.get::<_, i64>(11)? != 0,
    })
}

fn map_log(row: &Row) -> rusqlite::Result<HabitLog> {
    let date_raw: String = row.get(2)?;
    Ok(HabitLog {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        date: NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").unwrap_or_default(),
        completed: row.get::<_, i64>(3)? != 0,
        notes: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        synced: row.get::<_, i64>(7)? != 0,
    })
}
