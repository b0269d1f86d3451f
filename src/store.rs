// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local durable replica.
//!
//! The replica is a plain key-value store. `Ledger` layers the owner-scoped
//! key layout on top of it:
//!
//! ```text
//! ledger/{owner}/{table}/{id}                  record JSON
//! pending/{owner}/{table}/{id}                 PendingOp JSON
//! recurring/{owner}/{liability}/{cycle_start}  generated transaction id
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::{Account, Asset, Category, LedgerTable, Liability, Record, Table, Transaction};

pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;
    /// Returns whether the key existed.
    fn remove(&self, key: &str) -> Result<bool, LedgerError>;
    /// Keys starting with `prefix`, in lexical order.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, LedgerError>;
    fn clear(&self) -> Result<(), LedgerError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        SqliteStore::new(Connection::open_in_memory()?)
    }
}

impl LocalStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let conn = self.conn.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv(key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, LedgerError> {
        let conn = self.conn.lock();
        let n = conn.execute("DELETE FROM kv WHERE key=?1", params![key])?;
        Ok(n > 0)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, LedgerError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![prefix], |r| r.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn clear(&self) -> Result<(), LedgerError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingKind {
    Upsert,
    Delete,
}

/// A local write that has not reached the remote store yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOp {
    pub kind: PendingKind,
    pub table: Table,
    pub id: String,
    /// Remote attempts made so far, across all sync triggers.
    pub attempts: u32,
    pub last_error: String,
    pub queued_at: DateTime<Utc>,
    /// The remote refused the operation outright. Sync leaves it alone
    /// until the row is written or deleted again.
    #[serde(default)]
    pub rejected: bool,
}

/// Owner-scoped typed view over a `LocalStore`.
pub struct Ledger<'a> {
    store: &'a dyn LocalStore,
    owner: &'a str,
}

impl<'a> Ledger<'a> {
    pub fn new(store: &'a dyn LocalStore, owner: &'a str) -> Self {
        Ledger { store, owner }
    }

    pub fn owner(&self) -> &str {
        self.owner
    }

    fn table_prefix(&self, table: Table) -> String {
        format!("ledger/{}/{}/", self.owner, table)
    }

    fn record_key(&self, table: Table, id: &str) -> String {
        format!("ledger/{}/{}/{}", self.owner, table, id)
    }

    fn pending_key(&self, table: Table, id: &str) -> String {
        format!("pending/{}/{}/{}", self.owner, table, id)
    }

    fn recurring_key(&self, liability_id: &str, cycle_start: NaiveDate) -> String {
        format!("recurring/{}/{}/{}", self.owner, liability_id, cycle_start)
    }

    pub fn get(&self, table: Table, id: &str) -> Result<Option<Record>, LedgerError> {
        match self.store.get(&self.record_key(table, id))? {
            Some(raw) => Ok(Some(Record::from_value(table, serde_json::from_str(&raw)?)?)),
            None => Ok(None),
        }
    }

    pub fn put(&self, record: &Record) -> Result<(), LedgerError> {
        let raw = serde_json::to_string(&record.to_value()?)?;
        self.store
            .set(&self.record_key(record.table(), record.id()), &raw)
    }

    pub fn remove(&self, table: LedgerTable, id: &str) -> Result<bool, LedgerError> {
        self.store.remove(&self.record_key(table.table(), id))
    }

    pub fn list(&self, table: Table) -> Result<Vec<Record>, LedgerError> {
        let mut out = Vec::new();
        for key in self.store.keys(&self.table_prefix(table))? {
            if let Some(raw) = self.store.get(&key)? {
                out.push(Record::from_value(table, serde_json::from_str(&raw)?)?);
            }
        }
        Ok(out)
    }

    pub fn count(&self, table: Table) -> Result<usize, LedgerError> {
        Ok(self.store.keys(&self.table_prefix(table))?.len())
    }

    /// Removes every row of a ledger table for this owner.
    pub fn remove_all(&self, table: LedgerTable) -> Result<usize, LedgerError> {
        let keys = self.store.keys(&self.table_prefix(table.table()))?;
        for key in &keys {
            self.store.remove(key)?;
        }
        Ok(keys.len())
    }

    pub fn transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .list(Table::Transactions)?
            .into_iter()
            .filter_map(Record::into_transaction)
            .collect())
    }

    pub fn assets(&self) -> Result<Vec<Asset>, LedgerError> {
        Ok(self
            .list(Table::Assets)?
            .into_iter()
            .filter_map(Record::into_asset)
            .collect())
    }

    pub fn liabilities(&self) -> Result<Vec<Liability>, LedgerError> {
        Ok(self
            .list(Table::Liabilities)?
            .into_iter()
            .filter_map(Record::into_liability)
            .collect())
    }

    pub fn categories(&self) -> Result<Vec<Category>, LedgerError> {
        Ok(self
            .list(Table::Categories)?
            .into_iter()
            .filter_map(Record::into_category)
            .collect())
    }

    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self
            .list(Table::Accounts)?
            .into_iter()
            .filter_map(Record::into_account)
            .collect())
    }

    pub fn pending(&self) -> Result<Vec<PendingOp>, LedgerError> {
        let mut out = Vec::new();
        for key in self.store.keys(&format!("pending/{}/", self.owner))? {
            if let Some(raw) = self.store.get(&key)? {
                out.push(serde_json::from_str(&raw)?);
            }
        }
        out.sort_by(|a: &PendingOp, b| a.queued_at.cmp(&b.queued_at));
        Ok(out)
    }

    pub fn pending_for(&self, table: Table, id: &str) -> Result<Option<PendingOp>, LedgerError> {
        match self.store.get(&self.pending_key(table, id))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn put_pending(&self, op: &PendingOp) -> Result<(), LedgerError> {
        self.store
            .set(&self.pending_key(op.table, &op.id), &serde_json::to_string(op)?)
    }

    pub fn remove_pending(&self, table: Table, id: &str) -> Result<bool, LedgerError> {
        self.store.remove(&self.pending_key(table, id))
    }

    pub fn remove_pending_table(&self, table: LedgerTable) -> Result<usize, LedgerError> {
        let keys = self
            .store
            .keys(&format!("pending/{}/{}/", self.owner, table))?;
        for key in &keys {
            self.store.remove(key)?;
        }
        Ok(keys.len())
    }

    pub fn recurring_entry(
        &self,
        liability_id: &str,
        cycle_start: NaiveDate,
    ) -> Result<Option<String>, LedgerError> {
        self.store
            .get(&self.recurring_key(liability_id, cycle_start))
    }

    pub fn set_recurring_entry(
        &self,
        liability_id: &str,
        cycle_start: NaiveDate,
        transaction_id: &str,
    ) -> Result<(), LedgerError> {
        self.store
            .set(&self.recurring_key(liability_id, cycle_start), transaction_id)
    }

    pub fn clear_recurring_entries(&self) -> Result<usize, LedgerError> {
        let keys = self.store.keys(&format!("recurring/{}/", self.owner))?;
        for key in &keys {
            self.store.remove(key)?;
        }
        Ok(keys.len())
    }
}
