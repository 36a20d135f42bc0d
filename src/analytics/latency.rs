//! Task completion-latency aggregation.
//!
//! Latency is the fractional number of days between a task's creation and
//! its completion stamp. Aggregates are grouped by priority and by project,
//! plus a rolling trend bucketed by completion day. Stale detection flags
//! tasks that are neither completed nor cancelled and older than a
//! configurable threshold.

use crate::db::tasks::{Task, TaskFilter, TaskPriority, TaskSort, TaskStatus, Tasks};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatencyStats {
    pub completed_count: u32,
    pub average_days: f64,
    pub min_days: f64,
    pub max_days: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatencyReport {
    pub overall: LatencyStats,
    pub by_priority: BTreeMap<String, LatencyStats>,
    pub by_project: BTreeMap<String, LatencyStats>,
    /// Average latency per completion day, oldest first.
    pub trend: Vec<(NaiveDate, f64)>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Latency in fractional days, when both stamps are present and parseable.
pub fn completion_latency_days(task: &Task) -> Option<f64> {
    let completed = parse_timestamp(task.completed_at.as_deref()?)?;
    let created = parse_timestamp(&task.created_at)?;
    Some((completed - created).num_seconds() as f64 / 86_400.0)
}

fn stats_of(latencies: &[f64]) -> LatencyStats {
    if latencies.is_empty() {
        return LatencyStats::default();
    }
    let sum: f64 = latencies.iter().sum();
    LatencyStats {
        completed_count: latencies.len() as u32,
        average_days: sum / latencies.len() as f64,
        min_days: latencies.iter().cloned().fold(f64::INFINITY, f64::min),
        max_days: latencies.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Aggregates an already-fetched task list. Only completed tasks with a
/// completion stamp contribute.
pub fn build_report(tasks: &[Task]) -> LatencyReport {
    let mut overall = Vec::new();
    let mut by_priority: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut by_project: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();

    for task in tasks.iter().filter(|t| t.status == TaskStatus::Completed) {
        let latency = match completion_latency_days(task) {
            Some(days) => days,
            None => continue,
        };
        overall.push(latency);
        by_priority.entry(task.priority.as_str().to_string()).or_default().push(latency);
        if let Some(project) = &task.project_id {
            by_project.entry(project.clone()).or_default().push(latency);
        }
        if let Some(completed) = task.completed_at.as_deref().and_then(parse_timestamp) {
            by_day.entry(completed.date_naive()).or_default().push(latency);
        }
    }

    LatencyReport {
        overall: stats_of(&overall),
        by_priority: by_priority.iter().map(|(k, v)| (k.clone(), stats_of(v))).collect(),
        by_project: by_project.iter().map(|(k, v)| (k.clone(), stats_of(v))).collect(),
        trend: by_day
            .iter()
            .map(|(day, v)| (*day, v.iter().sum::<f64>() / v.len() as f64))
            .collect(),
    }
}

/// Tasks that are neither completed nor cancelled and were created more than
/// `threshold_days` ago.
pub fn stale_tasks(tasks: &[Task], now: DateTime<Utc>, threshold_days: i64) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed && t.status != TaskStatus::Cancelled)
        .filter(|t| match parse_timestamp(&t.created_at) {
            Some(created) => (now - created).num_days() > threshold_days,
            None => false,
        })
        .cloned()
        .collect()
}

/// Aggregator wired to the task repository; re-scans on every call.
pub struct LatencyAggregator {
    tasks: Tasks,
    stale_threshold_days: i64,
}

impl LatencyAggregator {
    pub fn new(db_path: &Path, stale_threshold_days: i64) -> Result<Self> {
        Ok(Self {
            tasks: Tasks::new(db_path)?,
            stale_threshold_days,
        })
    }

    pub fn report(&self) -> Result<LatencyReport> {
        let tasks = self.tasks.fetch(&TaskFilter::default(), TaskSort::default())?;
        Ok(build_report(&tasks))
    }

    pub fn stale(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.fetch(&TaskFilter::default(), TaskSort::default())?;
        Ok(stale_tasks(&tasks, Utc::now(), self.stale_threshold_days))
    }

    /// Latency aggregate for one priority bucket only.
    pub fn for_priority(&self, priority: TaskPriority) -> Result<LatencyStats> {
        let report = self.report()?;
        Ok(report.by_priority.get(priority.as_str()).cloned().unwrap_or_default())
    }
}
