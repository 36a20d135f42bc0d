//! Calendar conflict detection.
//!
//! Given a candidate time window, finds every existing timed event whose
//! interval overlaps it and reports the exact overlap window and its length
//! in minutes. All-day events never participate: neither as candidates (an
//! all-day candidate has no conflicts by definition) nor as matches.

use crate::db::events::{Event, Events};
use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub event: Event,
    pub overlap_start: NaiveDateTime,
    pub overlap_end: NaiveDateTime,
    pub overlap_minutes: i64,
}

/// Interval-overlap test for an event A against candidate window (S, E).
/// A conflicts when it wraps the window, starts inside it, or ends inside it.
fn overlaps(event: &Event, window_start: NaiveDateTime, window_end: NaiveDateTime) -> bool {
    let wraps = event.start_time < window_end && event.end_time > window_start;
    let starts_inside = window_start <= event.start_time && event.start_time < window_end;
    let ends_inside = window_start < event.end_time && event.end_time <= window_end;
    wraps || starts_inside || ends_inside
}

/// Pure overlap computation over an already-filtered candidate list, sorted
/// by event start time ascending.
pub fn find_conflicts(candidates: &[Event], window_start: NaiveDateTime, window_end: NaiveDateTime) -> Vec<Conflict> {
    let mut conflicts: Vec<Conflict> = candidates
        .iter()
        .filter(|event| !event.is_all_day)
        .filter(|event| overlaps(event, window_start, window_end))
        .map(|event| {
            let overlap_start = window_start.max(event.start_time);
            let overlap_end = window_end.min(event.end_time);
            let seconds = (overlap_end - overlap_start).num_seconds();
            Conflict {
                event: event.clone(),
                overlap_start,
                overlap_end,
                overlap_minutes: ((seconds as f64) / 60.0).round() as i64,
            }
        })
        .collect();

    conflicts.sort_by_key(|c| c.event.start_time);
    conflicts
}

/// Conflict detector wired to the event repository. Every call re-reads the
/// stored events; there is no cached or materialized view.
pub struct ConflictDetector {
    events: Events,
}

impl ConflictDetector {
    pub fn new(db_path: &Path) -> Result<Self> {
        Ok(Self { events: Events::new(db_path)? })
    }

    pub fn from_repo(events: Events) -> Self {
        Self { events }
    }

    /// Conflicts for a candidate window. `exclude_id` removes the event being
    /// edited from its own candidate set; an all-day candidate returns no
    /// conflicts.
    pub fn detect(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        candidate_all_day: bool,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Conflict>> {
        if candidate_all_day {
            return Ok(Vec::new());
        }

        let candidates = self.events.fetch_timed(exclude_id)?;
        Ok(find_conflicts(&candidates, window_start, window_end))
    }
}
