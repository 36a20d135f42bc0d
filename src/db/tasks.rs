//! Task storage and filtered retrieval.
//!
//! Tasks carry a closed status/priority pair, an optional due date, a JSON
//! encoded tag list and an optional recurrence rule. `completed_at` is owned
//! by status changes: it is set when a task moves to `Completed` and cleared
//! when it leaves that state.

use crate::db::db::Db;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_debug, msg_error_anyhow};
use anyhow::Result;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SELECT_TASK: &str = "SELECT id, title, description, status, priority, due_date, completed_at, project_id, tags, recurrence, created_at, updated_at, synced FROM tasks";
const INSERT_TASK: &str = "INSERT INTO tasks (id, title, description, status, priority, due_date, completed_at, project_id, tags, recurrence, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";
const CLEAR_PROJECT: &str = "UPDATE tasks SET project_id = NULL, updated_at = ?2, synced = 0 WHERE project_id = ?1";

/// Ordinal mapping used when sorting by priority.
const PRIORITY_ORDINAL: &str = "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 WHEN 'high' THEN 2 WHEN 'urgent' THEN 3 ELSE 4 END";
/// Ordinal mapping used when sorting by status.
const STATUS_ORDINAL: &str =
    "CASE status WHEN 'todo' THEN 0 WHEN 'in_progress' THEN 1 WHEN 'blocked' THEN 2 WHEN 'completed' THEN 3 WHEN 'cancelled' THEN 4 ELSE 5 END";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "blocked" => Some(TaskStatus::Blocked),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

/// Recurrence rule, stored as a JSON column on tasks and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    /// daily | weekly | monthly | yearly
    pub frequency: String,
    /// Every n-th occurrence of the frequency unit.
    pub interval: u32,
    /// Optional end date (calendar day).
    pub until: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub project_id: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

/// Input for task creation; ids and timestamps are generated by the store.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<String>,
    pub project_id: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
}

impl NewTask {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update; only present fields are written. The double-`Option`
/// distinguishes "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<String>>,
    pub project_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Option<Recurrence>>,
}

/// Filter clauses composed onto the base select; all values parameterized.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub statuses: Vec<TaskStatus>,
    pub priorities: Vec<TaskPriority>,
    pub project_id: Option<String>,
    pub due_after: Option<String>,
    pub due_before: Option<String>,
    /// Substring match on the title.
    pub search: Option<String>,
    /// Tag membership, matched against the serialized tag list.
    pub tag: Option<String>,
    pub unsynced_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum TaskSortField {
    CreatedAt,
    DueDate,
    Priority,
    Status,
    Title,
}

#[derive(Debug, Clone, Copy)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub direction: SortDirection,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            field: TaskSortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TaskSort {
    fn as_sql(&self) -> String {
        let column = match self.field {
            TaskSortField::CreatedAt => "created_at",
            TaskSortField::DueDate => "due_date",
            TaskSortField::Priority => PRIORITY_ORDINAL,
            TaskSortField::Status => STATUS_ORDINAL,
            TaskSortField::Title => "title",
        };
        format!("ORDER BY {} {}", column, self.direction.as_sql())
    }
}

pub struct Tasks {
    pub conn: Connection,
}

impl Tasks {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    /// Creates a task and returns the row exactly as persisted.
    pub fn create(&mut self, new: NewTask) -> Result<Task> {
        let id = new_id();
        let now = now_iso();
        let tags_json = serde_json::to_string(&new.tags)?;
        let recurrence_json = match &new.recurrence {
            Some(rule) => Some(serde_json::to_string(rule)?),
            None => None,
        };
        let priority = new.priority.unwrap_or(TaskPriority::Medium);

        self.conn.execute(
            INSERT_TASK,
            params![
                id,
                new.title,
                new.description,
                TaskStatus::Todo.as_str(),
                priority.as_str(),
                new.due_date,
                Option::<String>::None,
                new.project_id,
                tags_json,
                recurrence_json,
                now,
                now,
            ],
        )?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::TaskNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_TASK), params![id], map_task)
            .optional()
            .map_err(Into::into)
    }

    /// Filtered, sorted listing. Clauses are appended per supplied filter
    /// onto a `WHERE 1=1` base; every value travels as a bind parameter.
    pub fn fetch(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>> {
        let mut sql = format!("{} WHERE 1=1", SELECT_TASK);
        let mut values: Vec<SqlValue> = Vec::new();

        if !filter.statuses.is_empty() {
            let placeholders = placeholders_from(values.len(), filter.statuses.len());
            sql.push_str(&format!(" AND status IN ({})", placeholders));
            values.extend(filter.statuses.iter().map(|s| SqlValue::from(s.as_str().to_string())));
        }
        if !filter.priorities.is_empty() {
            let placeholders = placeholders_from(values.len(), filter.priorities.len());
            sql.push_str(&format!(" AND priority IN ({})", placeholders));
            values.extend(filter.priorities.iter().map(|p| SqlValue::from(p.as_str().to_string())));
        }
        if let Some(project_id) = &filter.project_id {
            values.push(SqlValue::from(project_id.clone()));
            sql.push_str(&format!(" AND project_id = ?{}", values.len()));
        }
        if let Some(after) = &filter.due_after {
            values.push(SqlValue::from(after.clone()));
            sql.push_str(&format!(" AND due_date >= ?{}", values.len()));
        }
        if let Some(before) = &filter.due_before {
            values.push(SqlValue::from(before.clone()));
            sql.push_str(&format!(" AND due_date <= ?{}", values.len()));
        }
        if let Some(search) = &filter.search {
            values.push(SqlValue::from(format!("%{}%", search)));
            sql.push_str(&format!(" AND title LIKE ?{}", values.len()));
        }
        if let Some(tag) = &filter.tag {
            // Tags are stored as a JSON array of strings.
            values.push(SqlValue::from(format!("%\"{}\"%", tag)));
            sql.push_str(&format!(" AND tags LIKE ?{}", values.len()));
        }
        if filter.unsynced_only {
            sql.push_str(" AND synced = 0");
        }

        sql.push(' ');
        sql.push_str(&sort.as_sql());

        let mut stmt = self.conn.prepare(&sql)?;
        let task_iter = stmt.query_map(params_from_iter(values.iter()), map_task)?;

        let mut tasks = Vec::new();
        for task in task_iter {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Applies only the supplied fields, always touching `updated_at` and
    /// clearing `synced`. Moving into `Completed` stamps `completed_at`;
    /// moving out of it clears the stamp.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let now = now_iso();
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(title) = &patch.title {
            values.push(SqlValue::from(title.clone()));
            sets.push(format!("title = ?{}", values.len()));
        }
        if let Some(description) = &patch.description {
            values.push(option_value(description.clone()));
            sets.push(format!("description = ?{}", values.len()));
        }
        if let Some(status) = patch.status {
            values.push(SqlValue::from(status.as_str().to_string()));
            sets.push(format!("status = ?{}", values.len()));
            if status == TaskStatus::Completed {
                values.push(SqlValue::from(now.clone()));
                sets.push(format!("completed_at = ?{}", values.len()));
            } else {
                sets.push("completed_at = NULL".to_string());
            }
        }
        if let Some(priority) = patch.priority {
            values.push(SqlValue::from(priority.as_str().to_string()));
            sets.push(format!("priority = ?{}", values.len()));
        }
        if let Some(due_date) = &patch.due_date {
            values.push(option_value(due_date.clone()));
            sets.push(format!("due_date = ?{}", values.len()));
        }
        if let Some(project_id) = &patch.project_id {
            values.push(option_value(project_id.clone()));
            sets.push(format!("project_id = ?{}", values.len()));
        }
        if let Some(tags) = &patch.tags {
            values.push(SqlValue::from(serde_json::to_string(tags)?));
            sets.push(format!("tags = ?{}", values.len()));
        }
        if let Some(recurrence) = &patch.recurrence {
            let json = match recurrence {
                Some(rule) => Some(serde_json::to_string(rule)?),
                None => None,
            };
            values.push(option_value(json));
            sets.push(format!("recurrence = ?{}", values.len()));
        }

        values.push(SqlValue::from(now));
        sets.push(format!("updated_at = ?{}", values.len()));
        sets.push("synced = 0".to_string());

        values.push(SqlValue::from(id.to_string()));
        let sql = format!("UPDATE tasks SET {} WHERE id = ?{}", sets.join(", "), values.len());
        self.conn.execute(&sql, params_from_iter(values.iter()))?;

        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::TaskNotFound(id.to_string())))
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let affected = self.conn.execute(DELETE_TASK, params![id])?;
        if affected == 0 {
            msg_bail_anyhow!(Message::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete_many(&mut self, ids: &[String]) -> Result<usize> {
        let mut deleted = 0;
        for id in ids {
            deleted += self.conn.execute(DELETE_TASK, params![id])?;
        }
        Ok(deleted)
    }

    pub fn fetch_by_project(&self, project_id: &str) -> Result<Vec<Task>> {
        self.fetch(
            &TaskFilter {
                project_id: Some(project_id.to_string()),
                ..Default::default()
            },
            TaskSort::default(),
        )
    }

    pub fn fetch_unsynced(&self) -> Result<Vec<Task>> {
        self.fetch(
            &TaskFilter {
                unsynced_only: true,
                ..Default::default()
            },
            TaskSort::default(),
        )
    }

    pub fn fetch_due_between(&self, after: &str, before: &str) -> Result<Vec<Task>> {
        self.fetch(
            &TaskFilter {
                due_after: Some(after.to_string()),
                due_before: Some(before.to_string()),
                ..Default::default()
            },
            TaskSort {
                field: TaskSortField::DueDate,
                direction: SortDirection::Asc,
            },
        )
    }

    /// Detaches every task from a project that no longer exists upstream.
    pub fn clear_project(&mut self, project_id: &str) -> Result<usize> {
        let affected = self.conn.execute(CLEAR_PROJECT, params![project_id, now_iso()])?;
        msg_debug!(Message::TaskProjectCleared(project_id.to_string(), affected));
        Ok(affected)
    }
}

fn placeholders_from(offset: usize, count: usize) -> String {
    (1..=count).map(|i| format!("?{}", offset + i)).collect::<Vec<_>>().join(", ")
}

fn option_value(value: Option<String>) -> SqlValue {
    match value {
        Some(v) => SqlValue::from(v),
        None => SqlValue::Null,
    }
}

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    let status_raw: String = row.get(3)?;
    let priority_raw: String = row.get(4)?;
    let tags_raw: String = row.get(8)?;
    let recurrence_raw: Option<String> = row.get(9)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::parse(&status_raw).unwrap_or(TaskStatus::Todo),
        priority: TaskPriority::parse(&priority_raw).unwrap_or(TaskPriority::Medium),
        due_date: row.get(5)?,
        completed_at: row.get(6)?,
        project_id: row.get(7)?,
        // Decode failures fall back to an empty list rather than failing the read.
        tags: serde_json::from_str(&tags_raw).unwrap_or_default(),
        recurrence: recurrence_raw.and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        synced: row.get::<_, i64>(12)? != 0,
    })
}
