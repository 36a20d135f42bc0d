//! Financial transaction storage.

use crate::db::db::Db;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_TRANSACTION: &str = "SELECT id, type, amount, category, description, date, currency, created_at, updated_at, synced FROM transactions";
const INSERT_TRANSACTION: &str = "INSERT INTO transactions (id, type, amount, category, description, date, currency, created_at, updated_at, synced)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)";
const DELETE_TRANSACTION: &str = "DELETE FROM transactions WHERE id = ?1";
const SUM_EXPENSES: &str = "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM transactions
    WHERE type = 'expense' AND category = ?1 AND date >= ?2 AND date <= ?3";
const SUM_BY_TYPE: &str = "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE type = ?1 AND date >= ?2 AND date <= ?3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionType,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub currency: String,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub date_after: Option<NaiveDate>,
    pub date_before: Option<NaiveDate>,
    pub unsynced_only: bool,
}

pub struct Transactions {
    pub conn: Connection,
}

impl Transactions {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    pub fn create(&mut self, new: NewTransaction) -> Result<Transaction> {
        let id = new_id();
        let now = now_iso();

        self.conn.execute(
            INSERT_TRANSACTION,
            params![
                id,
                new.kind.as_str(),
                new.amount,
                new.category,
                new.description,
                new.date.format(DATE_FORMAT).to_string(),
                new.currency.unwrap_or_else(|| "USD".to_string()),
                now,
                now,
            ],
        )?;

        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::TransactionNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Transaction>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_TRANSACTION), params![id], map_transaction)
            .optional()
            .map_err(Into::into)
    }

    pub fn fetch(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("{} WHERE 1=1", SELECT_TRANSACTION);
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(kind) = filter.kind {
            values.push(SqlValue::from(kind.as_str().to_string()));
            sql.push_str(&format!(" AND type = ?{}", values.len()));
        }
        if let Some(category) = &filter.category {
            values.push(SqlValue::from(category.clone()));
            sql.push_str(&format!(" AND category = ?{}", values.len()));
        }
        if let Some(after) = filter.date_after {
            values.push(SqlValue::from(after.format(DATE_FORMAT).to_string()));
            sql.push_str(&format!(" AND date >= ?{}", values.len()));
        }
        if let Some(before) = filter.date_before {
            values.push(SqlValue::from(before.format(DATE_FORMAT).to_string()));
            sql.push_str(&format!(" AND date <= ?{}", values.len()));
        }
        if filter.unsynced_only {
            sql.push_str(" AND synced = 0");
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let iter = stmt.query_map(params_from_iter(values.iter()), map_transaction)?;

        let mut transactions = Vec::new();
        for transaction in iter {
            transactions.push(transaction?);
        }
        Ok(transactions)
    }

    pub fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<Transaction> {
        let existing = self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::TransactionNotFound(id.to_string())))?;
        let now = now_iso();

        let kind = patch.kind.unwrap_or(existing.kind);
        let amount = patch.amount.unwrap_or(existing.amount);
        let category = patch.category.clone().unwrap_or(existing.category);
        let description = match &patch.description {
            Some(d) => d.clone(),
            None => existing.description,
        };
        let date = patch.date.unwrap_or(existing.date);
        let currency = patch.currency.clone().unwrap_or(existing.currency);

        self.conn.execute(
            "UPDATE transactions SET type = ?2, amount = ?3, category = ?4, description = ?5, date = ?6, currency = ?7, updated_at = ?8, synced = 0 WHERE id = ?1",
            params![id, kind.as_str(), amount, category, description, date.format(DATE_FORMAT).to_string(), currency, now],
        )?;

        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::TransactionNotFound(id.to_string())))
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let affected = self.conn.execute(DELETE_TRANSACTION, params![id])?;
        if affected == 0 {
            msg_bail_anyhow!(Message::TransactionNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Sum and count of expense transactions for one category inside a date
    /// window. Feeds the budget evaluator.
    pub fn expense_total(&self, category: &str, start: NaiveDate, end: NaiveDate) -> Result<(f64, u32)> {
        self.conn
            .query_row(
                SUM_EXPENSES,
                params![category, start.format(DATE_FORMAT).to_string(), end.format(DATE_FORMAT).to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(Into::into)
    }

    /// Total amount for one transaction type inside a date window.
    pub fn total_by_type(&self, kind: TransactionType, start: NaiveDate, end: NaiveDate) -> Result<f64> {
        self.conn
            .query_row(
                SUM_BY_TYPE,
                params![kind.as_str(), start.format(DATE_FORMAT).to_string(), end.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

fn map_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let kind_raw: String = row.get(1)?;
    let date_raw: String = row.get(5)?;

    Ok(Transaction {
        id: row.get(0)?,
        kind: TransactionType::parse(&kind_raw).unwrap_or(TransactionType::Expense),
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        date: NaiveDate::parse_from_str(&date_raw, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?,
        currency: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        synced: row.get::<_, i64>(9)? != 0,
    })
}
