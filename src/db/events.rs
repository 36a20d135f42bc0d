//! Calendar event storage.
//!
//! Events keep naive ISO-8601 timestamps (`%Y-%m-%dT%H:%M:%S`), which compare
//! lexicographically in the same order as chronologically, so range filters
//! run directly on the TEXT columns. All-day events carry times too but are
//! ignored by conflict detection.
//!
//! When a reminder is configured the repository schedules it through the
//! external reminder collaborator on create/update and cancels it before
//! delete; those side effects are best-effort and never block the row
//! mutation.

use crate::db::db::Db;
use crate::db::tasks::Recurrence;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::libs::notifier::{LogScheduler, ReminderScheduler};
use crate::{msg_error_anyhow, msg_warning};
use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const SELECT_EVENT: &str =
    "SELECT id, title, description, location, start_time, end_time, is_all_day, recurrence, reminder_minutes, notification_id, created_at, updated_at, synced FROM events";
const INSERT_EVENT: &str = "INSERT INTO events (id, title, description, location, start_time, end_time, is_all_day, recurrence, reminder_minutes, notification_id, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)";
const DELETE_EVENT: &str = "DELETE FROM events WHERE id = ?1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_all_day: bool,
    pub recurrence: Option<Recurrence>,
    pub reminder_minutes: Option<i64>,
    pub notification_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_all_day: bool,
    pub recurrence: Option<Recurrence>,
    pub reminder_minutes: Option<i64>,
}

impl NewEvent {
    pub fn new(title: &str, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            location: None,
            start_time,
            end_time,
            is_all_day: false,
            recurrence: None,
            reminder_minutes: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub is_all_day: Option<bool>,
    pub recurrence: Option<Option<Recurrence>>,
    pub reminder_minutes: Option<Option<i64>>,
}

pub struct Events {
    pub conn: Connection,
    scheduler: Box<dyn ReminderScheduler>,
}

impl Events {
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_scheduler(db_path, Box::new(LogScheduler))
    }

    pub fn with_scheduler(db_path: &Path, scheduler: Box<dyn ReminderScheduler>) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn, scheduler })
    }

    pub fn create(&mut self, new: NewEvent) -> Result<Event> {
        let id = new_id();
        let now = now_iso();
        let recurrence_json = match &new.recurrence {
            Some(rule) => Some(serde_json::to_string(rule)?),
            None => None,
        };

        let notification_id = new
            .reminder_minutes
            .and_then(|minutes| self.schedule_reminder(&id, &new.title, new.start_time, minutes));

        self.conn.execute(
            INSERT_EVENT,
            params![
                id,
                new.title,
                new.description,
                new.location,
                new.start_time.format(EVENT_TIME_FORMAT).to_string(),
                new.end_time.format(EVENT_TIME_FORMAT).to_string(),
                new.is_all_day as i64,
                recurrence_json,
                new.reminder_minutes,
                notification_id,
                now,
                now,
            ],
        )?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::EventNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Event>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_EVENT), params![id], map_event)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY start_time ASC", SELECT_EVENT))?;
        let events = collect_events(stmt.query_map([], map_event)?);
        events
    }

    /// Events whose interval overlaps the given window, all-day included.
    pub fn fetch_between(&self, window_start: NaiveDateTime, window_end: NaiveDateTime) -> Result<Vec<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE start_time < ?2 AND end_time > ?1 ORDER BY start_time ASC", SELECT_EVENT))?;
        let events = collect_events(stmt.query_map(
            params![
                window_start.format(EVENT_TIME_FORMAT).to_string(),
                window_end.format(EVENT_TIME_FORMAT).to_string()
            ],
            map_event,
        )?);
        events
    }

    /// Timed (non-all-day) events, optionally excluding one id — the
    /// candidate set for conflict detection.
    pub fn fetch_timed(&self, exclude_id: Option<&str>) -> Result<Vec<Event>> {
        match exclude_id {
            Some(id) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{} WHERE is_all_day = 0 AND id != ?1 ORDER BY start_time ASC", SELECT_EVENT))?;
                let events = collect_events(stmt.query_map(params![id], map_event)?);
                events
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{} WHERE is_all_day = 0 ORDER BY start_time ASC", SELECT_EVENT))?;
                let events = collect_events(stmt.query_map([], map_event)?);
                events
            }
        }
    }

    pub fn fetch_unsynced(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE synced = 0 ORDER BY start_time ASC", SELECT_EVENT))?;
        let events = collect_events(stmt.query_map([], map_event)?);
        events
    }

    pub fn update(&mut self, id: &str, patch: &EventPatch) -> Result<Event> {
        let existing = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::EventNotFound(id.to_string())))?;
        let now = now_iso();

        let title = patch.title.clone().unwrap_or(existing.title);
        let description = match &patch.description {
            Some(d) => d.clone(),
            None => existing.description,
        };
        let location = match &patch.location {
            Some(l) => l.clone(),
            None => existing.location,
        };
        let start_time = patch.start_time.unwrap_or(existing.start_time);
        let end_time = patch.end_time.unwrap_or(existing.end_time);
        let is_all_day = patch.is_all_day.unwrap_or(existing.is_all_day);
        let recurrence = match &patch.recurrence {
            Some(r) => r.clone(),
            None => existing.recurrence,
        };
        let reminder_minutes = match patch.reminder_minutes {
            Some(m) => m,
            None => existing.reminder_minutes,
        };

        // A changed start or reminder invalidates the scheduled notification.
        let reminder_changed = patch.start_time.is_some() || patch.reminder_minutes.is_some();
        let notification_id = if reminder_changed {
            if let Some(old_id) = &existing.notification_id {
                self.cancel_reminder(old_id);
            }
            reminder_minutes.and_then(|minutes| self.schedule_reminder(id, &title, start_time, minutes))
        } else {
            existing.notification_id
        };

        let recurrence_json = match &recurrence {
            Some(rule) => Some(serde_json::to_string(rule)?),
            None => None,
        };

        self.conn.execute(
            "UPDATE events SET title = ?2, description = ?3, location = ?4, start_time = ?5, end_time = ?6, is_all_day = ?7, recurrence = ?8, reminder_minutes = ?9, notification_id = ?10, updated_at = ?11, synced = 0 WHERE id = ?1",
            params![
                id,
                title,
                description,
                location,
                start_time.format(EVENT_TIME_FORMAT).to_string(),
                end_time.format(EVENT_TIME_FORMAT).to_string(),
                is_all_day as i64,
                recurrence_json,
                reminder_minutes,
                notification_id,
                now,
            ],
        )?;

        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::EventNotFound(id.to_string())))
    }

    /// Cancels any scheduled reminder, then hard-deletes the row. The delete
    /// succeeds even when cancellation fails.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let event = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::EventNotFound(id.to_string())))?;
        if let Some(notification_id) = &event.notification_id {
            self.cancel_reminder(notification_id);
        }

        self.conn.execute(DELETE_EVENT, params![id])?;
        Ok(())
    }

    fn schedule_reminder(&self, event_id: &str, title: &str, start_time: NaiveDateTime, minutes_before: i64) -> Option<String> {
        let trigger = start_time - Duration::minutes(minutes_before);
        match self.scheduler.schedule(title, "Upcoming event", trigger, event_id) {
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

fn collect_events(iter: impl Iterator<Item = rusqlite::Result<Event>>) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for event in iter {
        events.push(event?);
    }
    Ok(events)
}

fn map_event(row: &Row) -> rusqlite::Result<Event> {
    let start_raw: String = row.get(4)?;
    let end_raw: String = row.get(5)?;
    let recurrence_raw: Option<String> = row.get(7)?;

    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        start_time: parse_event_time(&start_raw, 4)?,
        end_time: parse_event_time(&end_raw, 5)?,
        is_all_day: row.get::<_, i64>(6)? != 0,
        recurrence: recurrence_raw.and_then(|raw| serde_json::from_str(&raw).ok()),
        reminder_minutes: row.get(8)?,
        notification_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        synced: row.get::<_, i64>(12)? != 0,
    })
}

fn parse_event_time(raw: &str, column: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, EVENT_TIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}
