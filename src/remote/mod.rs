// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Remote tabular store shared across devices.
//!
//! Deletes take a `LedgerTable`, so no implementation can be asked to
//! delete categories or accounts.

pub mod http;
pub mod sqlite;

pub use http::HttpRemote;
pub use sqlite::SqliteRemote;

use crate::error::RemoteError;
use crate::models::{LedgerTable, Record, Table};

pub trait RemoteStore: Send + Sync {
    /// Insert or replace the row with the record's id.
    fn upsert(&self, record: &Record) -> Result<(), RemoteError>;

    fn select(&self, table: Table, owner: &str) -> Result<Vec<Record>, RemoteError>;

    fn fetch(&self, table: Table, owner: &str, id: &str) -> Result<Option<Record>, RemoteError> {
        Ok(self
            .select(table, owner)?
            .into_iter()
            .find(|r| r.id() == id))
    }

    fn count(&self, table: Table, owner: &str) -> Result<usize, RemoteError> {
        Ok(self.select(table, owner)?.len())
    }

    fn delete(&self, table: LedgerTable, owner: &str, id: &str) -> Result<(), RemoteError>;

    fn delete_all(&self, table: LedgerTable, owner: &str) -> Result<(), RemoteError>;
}
