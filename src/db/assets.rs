//! Asset and liability storage.
//!
//! Both tables are plain CRUD with a totals helper; no derived analytics
//! depend on them beyond the net-worth style aggregates the summary surface
//! reads.

use crate::db::db::Db;
use crate::libs::id::{new_id, now_iso};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SELECT_ASSET: &str = "SELECT id, name, type, value, currency, created_at, updated_at, synced FROM assets";
const INSERT_ASSET: &str = "INSERT INTO assets (id, name, type, value, currency, created_at, updated_at, synced) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)";
const SELECT_LIABILITY: &str = "SELECT id, name, type, amount, currency, created_at, updated_at, synced FROM liabilities";
const INSERT_LIABILITY: &str =
    "INSERT INTO liabilities (id, name, type, amount, currency, created_at, updated_at, synced) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub value: f64,
    pub currency: String,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: String,
    pub updated_at: String,
    pub synced: bool,
}

pub struct Assets {
    pub conn: Connection,
}

impl Assets {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    pub fn create(&mut self, name: &str, kind: &str, value: f64, currency: Option<&str>) -> Result<Asset> {
        let id = new_id();
        let now = now_iso();
        self.conn
            .execute(INSERT_ASSET, params![id, name, kind, value, currency.unwrap_or("USD"), now, now])?;
        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::AssetNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Asset>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_ASSET), params![id], map_asset)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Asset>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY created_at DESC", SELECT_ASSET))?;
        let iter = stmt.query_map([], map_asset)?;

        let mut assets = Vec::new();
        for asset in iter {
            assets.push(asset?);
        }
        Ok(assets)
    }

    pub fn update_value(&mut self, id: &str, value: f64) -> Result<Asset> {
        self.conn
            .execute("UPDATE assets SET value = ?2, updated_at = ?3, synced = 0 WHERE id = ?1", params![id, value, now_iso()])?;
        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::AssetNotFound(id.to_string())))
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let affected = self.conn.execute("DELETE FROM assets WHERE id = ?1", params![id])?;
        if affected == 0 {
            msg_bail_anyhow!(Message::AssetNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn total_value(&self) -> Result<f64> {
        self.conn
            .query_row("SELECT COALESCE(SUM(value), 0) FROM assets", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

pub struct Liabilities {
    pub conn: Connection,
}

impl Liabilities {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Db::open(db_path)?;
        Ok(Self { conn: db.conn })
    }

    pub fn create(&mut self, name: &str, kind: &str, amount: f64, currency: Option<&str>) -> Result<Liability> {
        let id = new_id();
        let now = now_iso();
        self.conn
            .execute(INSERT_LIABILITY, params![id, name, kind, amount, currency.unwrap_or("USD"), now, now])?;
        self.get(&id)?.ok_or_else(|| msg_error_anyhow!(Message::LiabilityNotFound(id)))
    }

    pub fn get(&self, id: &str) -> Result<Option<Liability>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_LIABILITY), params![id], map_liability)
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Liability>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY created_at DESC", SELECT_LIABILITY))?;
        let iter = stmt.query_map([], map_liability)?;

        let mut liabilities = Vec::new();
        for liability in iter {
            liabilities.push(liability?);
        }
        Ok(liabilities)
    }

    pub fn update_amount(&mut self, id: &str, amount: f64) -> Result<Liability> {
        self.conn.execute(
            "UPDATE liabilities SET amount = ?2, updated_at = ?3, synced = 0 WHERE id = ?1",
            params![id, amount, now_iso()],
        )?;
        self.get(id)?.ok_or_else(|| msg_error_anyhow!(Message::LiabilityNotFound(id.to_string())))
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let affected = self.conn.execute("DELETE FROM liabilities WHERE id = ?1", params![id])?;
        if affected == 0 {
            msg_bail_anyhow!(Message::LiabilityNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn total_amount(&self) -> Result<f64> {
        self.conn
            .query_row("SELECT COALESCE(SUM(amount), 0) FROM liabilities", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

fn map_asset(row: &Row) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        value: row.get(3)?,
        currency: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        synced: row.get::<_, i64>(7)? != 0,
    })
}

fn map_liability(row: &Row) -> rusqlite::Result<Liability> {
    Ok(Liability {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        synced: row.get::<_, i64>(7)? != 0,
    })
}
