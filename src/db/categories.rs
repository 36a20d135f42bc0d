//! Transaction category storage and default-catalogue seeding.
//!
//! Default (non-custom) categories are reference data: seeded once, never
//! updatable or deletable through this layer. Seeding is gated on the absence
//! of any non-custom row and runs inside a single transaction, so repeated
//! calls never duplicate the catalogue.

use crate::db::db::Db;
use crate::db::transactions::TransactionType;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SELECT_CATEGORY: &str = "SELECT id, name, icon, color, type, is_custom, created_at, updated_at, synced FROM categories";
const INSERT_CATEGORY: &str =
    "INSERT INTO categories (id, name, icon, color, type, is_custom, created_at, updated_at, synced) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0)";
const COUNT_DEFAULTS: &str = "SELECT COUNT(*) FROM categories WHERE is_custom = 0";

/// Fixed default catalogue: (name, icon, color, type).
const DEFAULT_CATEGORIES: &[(&str, &str, &str, TransactionType)] = &[
    ("Salary", "💼", "#4CAF50", TransactionType::Income),
    ("Freelance", "💻", "#8BC34A", TransactionType::Income),
    ("Investments", "📈", "#009688", TransactionType::Income),
    ("Gifts", "🎁", "#CDDC39", TransactionType::Income),
    ("Other Income", "💵", "#607D8B", TransactionType::Income),
    ("Groceries", "🛒", "#FF9800", TransactionType::Expense),
    ("Dining", "🍽️", "#FF5722", TransactionType::Expense),
    ("Transport", "🚗", "#3F51B5", TransactionType::Expense),
    ("Housing", "🏠", "#795548", TransactionType::Expense),
    ("Utilities", "💡", "#FFC107", TransactionType::Expense),
    ("Health", "🏥", "#E91E63", TransactionType::Expense),
    ("Entertainment", "🎬", "#9C27B0", TransactionType::Expense),
    ("Shopping", "🛍️", "#2196F3", TransactionType::Expense),
    ("Education", "📚", "#00BCD4", TransactionType::Expense),
    ("Other Expenses", "📦", "#9E9E9E", TransactionType::Expense),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub kind: TransactionType,
    pub is_custom: bool,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

pub struct Categories {
    pub conn: Connection,
}

impl Categories {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    /// Inserts the default catalogue if no non-custom categories exist yet.
    /// Returns the number of rows seeded (zero when already present).
    pub fn seed_defaults(&mut self) -> Result<usize> {
        let existing: i64 = self.conn.query_row(COUNT_DEFAULTS, [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let now = now_iso();
        let tx = self.conn.transaction()?;
        for (name, icon, color, kind) in DEFAULT_CATEGORIES {
            tx.execute(
                INSERT_CATEGORY,
                params![new_id(), name, icon, color, kind.as_str(), 0i64, now, now],
            )?;
        }
        tx.commit()?;

        Ok(DEFAULT_CATEGORIES.len())
    }

    pub fn create(&mut self, name: &str, icon: Option<&str>, color: Option<&str>, kind: TransactionType) -> Result<Category> {
        if self.get_by_name(name)?.is_some() {
            msg_bail_anyhow!(Message::CategoryNameTaken(name.to_string()));
        }

        let id = new_id();
        let now = now_iso();
        self.conn
            .execute(INSERT_CATEGORY, params![id, name, icon, color, kind.as_str(), 1i64, now, now])?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::CategoryNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Category>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_CATEGORY), params![id], map_category)
            .optional()
            .map_err(Into::into)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.conn
            .query_row(&format!("{} WHERE name = ?1", SELECT_CATEGORY), params![name], map_category)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY name ASC", SELECT_CATEGORY))?;
        let iter = stmt.query_map([], map_category)?;

        let mut categories = Vec::new();
        for category in iter {
            categories.push(category?);
        }
        Ok(categories)
    }

    pub fn list_by_type(&self, kind: TransactionType) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE type = ?1 ORDER BY name ASC", SELECT_CATEGORY))?;
        let iter = stmt.query_map(params![kind.as_str()], map_category)?;

        let mut categories = Vec::new();
        for category in iter {
            categories.push(category?);
        }
        Ok(categories)
    }

    /// Renames/recolors a custom category. Default categories are immutable.
    pub fn update(&mut self, id: &str, name: Option<&str>, icon: Option<&str>, color: Option<&str>) -> Result<Category> {
        let existing = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::CategoryNotFound(id.to_string())))?;
        if !existing.is_custom {
            msg_bail_anyhow!(Message::DefaultCategoryImmutable(existing.name));
        }

        let new_name = name.unwrap_or(&existing.name);
        let new_icon = icon.map(|i| i.to_string()).or(existing.icon);
        let new_color = color.map(|c| c.to_string()).or(existing.color);

        self.conn.execute(
            "UPDATE categories SET name = ?2, icon = ?3, color = ?4, updated_at = ?5, synced = 0 WHERE id = ?1",
            params![id, new_name, new_icon, new_color, now_iso()],
        )?;

        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::CategoryNotFound(id.to_string())))
    }

    /// Deletes a custom category. Default categories are non-deletable.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let existing = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::CategoryNotFound(id.to_string())))?;
        if !existing.is_custom {
            msg_bail_anyhow!(Message::DefaultCategoryImmutable(existing.name));
        }

        self.conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn map_category(row: &Row) -> rusqlite::Result<Category> {
    let kind_raw: String = row.get(4)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        color: row.get(3)?,
        kind: TransactionType::parse(&kind_raw).unwrap_or(TransactionType::Expense),
        is_custom: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        synced: row.get::<_, i64>(8)? != 0,
    })
}
