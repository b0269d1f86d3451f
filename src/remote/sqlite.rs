// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use super::RemoteStore;
use crate::error::RemoteError;
use crate::models::{LedgerTable, Record, Table};

/// File-backed remote with one table per entity. Rows keep the record
/// payload as JSON next to the columns the remote filters on.
pub struct SqliteRemote {
    conn: Mutex<Connection>,
}

fn unavailable(err: rusqlite::Error) -> RemoteError {
    RemoteError::Unavailable(err.to_string())
}

fn decode(table: Table, payload: &str) -> Result<Record, RemoteError> {
    let value = serde_json::from_str(payload).map_err(|e| RemoteError::Decode(e.to_string()))?;
    Record::from_value(table, value).map_err(|e| RemoteError::Decode(e.to_string()))
}

impl SqliteRemote {
    pub fn new(conn: Connection) -> Result<Self, RemoteError> {
        for table in Table::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {t}(
                    id TEXT PRIMARY KEY,
                    owner_id TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    payload TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{t}_owner ON {t}(owner_id);",
                t = table
            ))
            .map_err(unavailable)?;
        }
        Ok(SqliteRemote {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &Path) -> Result<Self, RemoteError> {
        let conn = Connection::open(path).map_err(unavailable)?;
        SqliteRemote::new(conn)
    }

    pub fn open_in_memory() -> Result<Self, RemoteError> {
        SqliteRemote::new(Connection::open_in_memory().map_err(unavailable)?)
    }
}

impl RemoteStore for SqliteRemote {
    fn upsert(&self, record: &Record) -> Result<(), RemoteError> {
        let payload = record
            .to_value()
            .map_err(|e| RemoteError::Decode(e.to_string()))?
            .to_string();
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "INSERT INTO {}(id, owner_id, updated_at, payload) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    owner_id=excluded.owner_id,
                    updated_at=excluded.updated_at,
                    payload=excluded.payload",
                record.table()
            ),
            params![
                record.id(),
                record.owner_id(),
                record.updated_at().to_rfc3339(),
                payload
            ],
        )
        .map_err(unavailable)?;
        Ok(())
    }

    fn select(&self, table: Table, owner: &str) -> Result<Vec<Record>, RemoteError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT payload FROM {} WHERE owner_id=?1 ORDER BY id",
                table
            ))
            .map_err(unavailable)?;
        let rows = stmt
            .query_map(params![owner], |r| r.get::<_, String>(0))
            .map_err(unavailable)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(decode(table, &row.map_err(unavailable)?)?);
        }
        Ok(out)
    }

    fn fetch(&self, table: Table, owner: &str, id: &str) -> Result<Option<Record>, RemoteError> {
        let conn = self.conn.lock();
        let payload: Option<String> = conn
            .query_row(
                &format!("SELECT payload FROM {} WHERE owner_id=?1 AND id=?2", table),
                params![owner, id],
                |r| r.get(0),
            )
            .optional()
            .map_err(unavailable)?;
        payload.map(|p| decode(table, &p)).transpose()
    }

    fn count(&self, table: Table, owner: &str) -> Result<usize, RemoteError> {
        let conn = self.conn.lock();
        let n: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE owner_id=?1", table),
                params![owner],
                |r| r.get(0),
            )
            .map_err(unavailable)?;
        Ok(n as usize)
    }

    fn delete(&self, table: LedgerTable, owner: &str, id: &str) -> Result<(), RemoteError> {
        let conn = self.conn.lock();
        conn.execute(
            &format!("DELETE FROM {} WHERE owner_id=?1 AND id=?2", table),
            params![owner, id],
        )
        .map_err(unavailable)?;
        Ok(())
    }

    fn delete_all(&self, table: LedgerTable, owner: &str) -> Result<(), RemoteError> {
        let conn = self.conn.lock();
        conn.execute(
            &format!("DELETE FROM {} WHERE owner_id=?1", table),
            params![owner],
        )
        .map_err(unavailable)?;
        Ok(())
    }
}
