//! Budget definition storage.
//!
//! A budget is a spending cap for one category over a date window, with an
//! alert threshold as a 0..1 fraction of the amount. Live spend aggregation
//! and status classification live in the budget evaluator; this module only
//! persists the definitions. (category, start_date) is unique.

use crate::db::db::Db;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_BUDGET: &str =
    "SELECT id, category, amount, period, start_date, end_date, is_recurring, alert_threshold, created_at, updated_at, synced FROM budgets";
const INSERT_BUDGET: &str = "INSERT INTO budgets (id, category, amount, period, start_date, end_date, is_recurring, alert_threshold, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0)";
const DELETE_BUDGET: &str = "DELETE FROM budgets WHERE id = ?1";
const EXISTS_IN_WINDOW: &str = "SELECT COUNT(*) FROM budgets WHERE category = ?1 AND start_date <= ?3 AND end_date >= ?2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Monthly,
    Weekly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(BudgetPeriod::Monthly),
            "weekly" => Some(BudgetPeriod::Weekly),
            "yearly" => Some(BudgetPeriod::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_recurring: bool,
    /// Fraction of `amount` (0..1) at which status flips from safe to warning.
    pub alert_threshold: f64,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_recurring: bool,
    pub alert_threshold: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub amount: Option<f64>,
    pub is_recurring: Option<bool>,
    pub alert_threshold: Option<f64>,
    pub end_date: Option<NaiveDate>,
}

pub struct Budgets {
    pub conn: Connection,
}

impl Budgets {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    pub fn create(&mut self, new: NewBudget) -> Result<Budget> {
        if self.exists_for(&new.category, new.start_date)? {
            msg_bail_anyhow!(Message::BudgetAlreadyExists(
                new.category.clone(),
                new.start_date.format(DATE_FORMAT).to_string()
            ));
        }

        let id = new_id();
        let now = now_iso();
        self.conn.execute(
            INSERT_BUDGET,
            params![
                id,
                new.category,
                new.amount,
                new.period.as_str(),
                new.start_date.format(DATE_FORMAT).to_string(),
                new.end_date.format(DATE_FORMAT).to_string(),
                new.is_recurring as i64,
                new.alert_threshold,
                now,
                now,
            ],
        )?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::BudgetNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Budget>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_BUDGET), params![id], map_budget)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY start_date DESC", SELECT_BUDGET))?;
        let iter = stmt.query_map([], map_budget)?;

        let mut budgets = Vec::new();
        for budget in iter {
            budgets.push(budget?);
        }
        Ok(budgets)
    }

    /// Budgets whose window contains the given day.
    pub fn fetch_active(&self, today: NaiveDate) -> Result<Vec<Budget>> {
        let day = today.format(DATE_FORMAT).to_string();
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE start_date <= ?1 AND end_date >= ?1 ORDER BY category ASC", SELECT_BUDGET))?;
        let iter = stmt.query_map(params![day], map_budget)?;

        let mut budgets = Vec::new();
        for budget in iter {
            budgets.push(budget?);
        }
        Ok(budgets)
    }

    /// Whether a budget for this category already starts on the given day.
    pub fn exists_for(&self, category: &str, start_date: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM budgets WHERE category = ?1 AND start_date = ?2",
            params![category, start_date.format(DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether any budget for this category overlaps the given window. The
    /// recurring rollover uses this as its idempotency check.
    pub fn exists_in_window(&self, category: &str, start: NaiveDate, end: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            EXISTS_IN_WINDOW,
            params![category, start.format(DATE_FORMAT).to_string(), end.format(DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn update(&mut self, id: &str, patch: &BudgetPatch) -> Result<Budget> {
        let existing = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::BudgetNotFound(id.to_string())))?;
        let now = now_iso();

        let amount = patch.amount.unwrap_or(existing.amount);
        let is_recurring = patch.is_recurring.unwrap_or(existing.is_recurring);
        let alert_threshold = patch.alert_threshold.unwrap_or(existing.alert_threshold);
        let end_date = patch.end_date.unwrap_or(existing.end_date);

        self.conn.execute(
            "UPDATE budgets SET amount = ?2, is_recurring = ?3, alert_threshold = ?4, end_date = ?5, updated_at = ?6, synced = 0 WHERE id = ?1",
            params![id, amount, is_recurring as i64, alert_threshold, end_date.format(DATE_FORMAT).to_string(), now],
        )?;

        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::BudgetNotFound(id.to_string())))
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let affected = self.conn.execute(DELETE_BUDGET, params![id])?;
        if affected == 0 {
            msg_bail_anyhow!(Message::BudgetNotFound(id.to_string()));
        }
        Ok(())
    }
}

fn map_budget(row: &Row) -> rusqlite::Result<Budget> {
    let period_raw: String = row.get(3)?;
    let start_raw: String = row.get(4)?;
    let end_raw: String = row.get(5)?;

    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        amount: row.get(2)?,
        period: BudgetPeriod::parse(&period_raw).unwrap_or(BudgetPeriod::Monthly),
        start_date: parse_date(&start_raw, 4)?,
        end_date: parse_date(&end_raw, 5)?,
        is_recurring: row.get::<_, i64>(6)? != 0,
        alert_threshold: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        synced: row.get::<_, i64>(10)? != 0,
    })
}

fn parse_date(raw: &str, column: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e)))
}
