//! Focus session storage and lifecycle.
//!
//! Sessions move through a closed state machine: `scheduled` → `in_progress`
//! → `completed`, with `cancelled` reachable from the two non-terminal
//! states. Transitions are validated against an explicit table; a call that
//! is not a valid edge from the current state is rejected with
//! `TransitionError` instead of being applied.

use crate::db::db::Db;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const SESSION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const SELECT_SESSION: &str =
    "SELECT id, title, duration_minutes, actual_minutes, is_pomodoro, status, start_time, end_time, task_id, created_at, updated_at, synced FROM focus_sessions";
const INSERT_SESSION: &str = "INSERT INTO focus_sessions (id, title, duration_minutes, actual_minutes, is_pomodoro, status, start_time, end_time, task_id, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, NULL, ?4, 'scheduled', NULL, NULL, ?5, ?6, ?7, 0)";
const DELETE_SESSION: &str = "DELETE FROM focus_sessions WHERE id = ?1";
const COMPLETED_DATES: &str = "SELECT DISTINCT date(end_time) FROM focus_sessions WHERE status = 'completed' AND end_time IS NOT NULL ORDER BY 1 DESC";
const ROLLUP: &str = "SELECT COUNT(*), COALESCE(SUM(actual_minutes), 0) FROM focus_sessions
    WHERE status = 'completed' AND end_time IS NOT NULL AND date(end_time) >= ?1 AND date(end_time) <= ?2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(SessionStatus::Scheduled),
            "in_progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }

    /// The transition table. `Completed` and `Cancelled` are terminal.
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        matches!(
            (self, to),
            (SessionStatus::Scheduled, SessionStatus::InProgress)
                | (SessionStatus::InProgress, SessionStatus::Completed)
                | (SessionStatus::Scheduled, SessionStatus::Cancelled)
                | (SessionStatus::InProgress, SessionStatus::Cancelled)
        )
    }
}

#[derive(Debug, Error)]
#[error("illegal focus session transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub title: String,
    pub duration_minutes: i64,
    pub actual_minutes: Option<i64>,
    pub is_pomodoro: bool,
    pub status: SessionStatus,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub task_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub title: String,
    pub duration_minutes: i64,
    pub is_pomodoro: bool,
    pub task_id: Option<String>,
}

impl NewSession {
    pub fn new(title: &str, duration_minutes: i64) -> Self {
        Self {
            title: title.to_string(),
            duration_minutes,
            is_pomodoro: false,
            task_id: None,
        }
    }
}

/// Count / total / average of completed minutes inside one window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionRollup {
    pub sessions: u32,
    pub total_minutes: i64,
    pub average_minutes: f64,
}

pub struct FocusSessions {
    pub conn: Connection,
}

impl FocusSessions {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    pub fn create(&mut self, new: NewSession) -> Result<FocusSession> {
        let id = new_id();
        let now = now_iso();
        self.conn.execute(
            INSERT_SESSION,
            params![id, new.title, new.duration_minutes, new.is_pomodoro as i64, new.task_id, now, now],
        )?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::SessionNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<FocusSession>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_SESSION), params![id], map_session)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<FocusSession>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY created_at DESC", SELECT_SESSION))?;
        let iter = stmt.query_map([], map_session)?;

        let mut sessions = Vec::new();
        for session in iter {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    pub fn list_by_status(&self, status: SessionStatus) -> Result<Vec<FocusSession>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE status = ?1 ORDER BY created_at DESC", SELECT_SESSION))?;
        let iter = stmt.query_map(params![status.as_str()], map_session)?;

        let mut sessions = Vec::new();
        for session in iter {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    pub fn list_for_task(&self, task_id: &str) -> Result<Vec<FocusSession>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE task_id = ?1 ORDER BY created_at DESC", SELECT_SESSION))?;
        let iter = stmt.query_map(params![task_id], map_session)?;

        let mut sessions = Vec::new();
        for session in iter {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    /// scheduled → in_progress; stamps `start_time`.
    pub fn start(&mut self, id: &str, at: NaiveDateTime) -> Result<FocusSession> {
        let session = self.require(id)?;
        self.check_transition(&session, SessionStatus::InProgress)?;

        self.conn.execute(
            "UPDATE focus_sessions SET status = 'in_progress', start_time = ?2, updated_at = ?3, synced = 0 WHERE id = ?1",
            params![id, at.format(SESSION_TIME_FORMAT).to_string(), now_iso()],
        )?;
        self.require(id)
    }

    /// in_progress → completed; stamps `end_time` and `actual_minutes`.
    /// When no explicit actual is given it is derived from the start stamp.
    pub fn complete(&mut self, id: &str, at: NaiveDateTime, actual_minutes: Option<i64>) -> Result<FocusSession> {
        let session = self.require(id)?;
        self.check_transition(&session, SessionStatus::Completed)?;

        let actual = actual_minutes
            .or_else(|| session.start_time.map(|start| (at - start).num_minutes()))
            .unwrap_or(session.duration_minutes);

        self.conn.execute(
            "UPDATE focus_sessions SET status = 'completed', end_time = ?2, actual_minutes = ?3, updated_at = ?4, synced = 0 WHERE id = ?1",
            params![id, at.format(SESSION_TIME_FORMAT).to_string(), actual, now_iso()],
        )?;
        self.require(id)
    }

    /// scheduled|in_progress → cancelled; stamps `end_time`.
    pub fn cancel(&mut self, id: &str, at: NaiveDateTime) -> Result<FocusSession> {
        let session = self.require(id)?;
        self.check_transition(&session, SessionStatus::Cancelled)?;

        self.conn.execute(
            "UPDATE focus_sessions SET status = 'cancelled', end_time = ?2, updated_at = ?3, synced = 0 WHERE id = ?1",
            params![id, at.format(SESSION_TIME_FORMAT).to_string(), now_iso()],
        )?;
        self.require(id)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let affected = self.conn.execute(DELETE_SESSION, params![id])?;
        if affected == 0 {
            msg_bail_anyhow!(Message::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Distinct calendar days with a completed session, newest first. Feeds
    /// the streak calculator.
    pub fn completed_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(COMPLETED_DATES)?;
        let iter = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut dates = Vec::new();
        for raw in iter {
            if let Ok(date) = NaiveDate::parse_from_str(&raw?, "%Y-%m-%d") {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    /// Current/longest consecutive-day streaks of completed sessions.
    pub fn streaks(&self, today: NaiveDate) -> Result<crate::analytics::streaks::Streaks> {
        let dates = self.completed_dates()?;
        Ok(crate::analytics::streaks::compute_streaks(&dates, today))
    }

    /// Completed-session rollup for one calendar day.
    pub fn rollup_for_day(&self, day: NaiveDate) -> Result<SessionRollup> {
        self.rollup_between(day, day)
    }

    /// Completed-session rollup for the Monday–Sunday week containing `day`.
    pub fn rollup_for_week(&self, day: NaiveDate) -> Result<SessionRollup> {
        let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
        let sunday = monday + Duration::days(6);
        self.rollup_between(monday, sunday)
    }

    fn rollup_between(&self, start: NaiveDate, end: NaiveDate) -> Result<SessionRollup> {
        let (sessions, total_minutes): (u32, i64) = self.conn.query_row(
            ROLLUP,
            params![start.format("%Y-%m-%d").to_string(), end.format("%Y-%m-%d").to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let average_minutes = if sessions > 0 { total_minutes as f64 / sessions as f64 } else { 0.0 };
        Ok(SessionRollup {
            sessions,
            total_minutes,
            average_minutes,
        })
    }

    fn require(&self, id: &str) -> Result<FocusSession> {
        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::SessionNotFound(id.to_string())))
    }

    fn check_transition(&self, session: &FocusSession, to: SessionStatus) -> Result<()> {
        if !session.status.can_transition_to(to) {
            return Err(TransitionError {
                from: session.status.as_str(),
                to: to.as_str(),
            }
            .into());
        }
        Ok(())
    }
}

fn map_session(row: &Row) -> rusqlite::Result<FocusSession> {
    let status_raw: String = row.get(5)?;
    let start_raw: Option<String> = row.get(6)?;
    let end_raw: Option<String> = row.get(7)?;

    Ok(FocusSession {
        id: row.get(0)?,
        title: row.get(1)?,
        duration_minutes: row.get(2)?,
        actual_minutes: row.get(3)?,
        is_pomodoro: row.get::<_, i64>(4)? != 0,
        status: SessionStatus::parse(&status_raw).unwrap_or(SessionStatus::Scheduled),
        start_time: start_raw.and_then(|raw| NaiveDateTime::parse_from_str(&raw, SESSION_TIME_FORMAT).ok()),
        end_time: end_raw.and_then(|raw| NaiveDateTime::parse_from_str(&raw, SESSION_TIME_FORMAT).ok()),
        task_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        synced: row.get::<_, i64>(11)? != 0,
    })
}
