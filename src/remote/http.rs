// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};

use super::RemoteStore;
use crate::error::RemoteError;
use crate::models::{LedgerTable, Record, Table};
use crate::utils::http_client;

/// PostgREST-style remote: `/rest/v1/{table}` with `owner_id=eq.` filters
/// and upserts resolved on the `id` column.
pub struct HttpRemote {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRemote {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        Ok(HttpRemote {
            client: http_client()?,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = self
            .authorize(req)
            .send()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if status.is_server_error() {
            return Err(RemoteError::Unavailable(format!("server returned {}", status)));
        }
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    fn rows(&self, table: Table, query: &[(&str, String)]) -> Result<Vec<Record>, RemoteError> {
        let resp = self.send(self.client.get(self.endpoint(table)).query(query))?;
        let values: Vec<serde_json::Value> = resp
            .json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        values
            .into_iter()
            .map(|v| Record::from_value(table, v).map_err(|e| RemoteError::Decode(e.to_string())))
            .collect()
    }
}

impl RemoteStore for HttpRemote {
    fn upsert(&self, record: &Record) -> Result<(), RemoteError> {
        let row = record
            .to_value()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let req = self
            .client
            .post(self.endpoint(record.table()))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);
        self.send(req)?;
        Ok(())
    }

    fn select(&self, table: Table, owner: &str) -> Result<Vec<Record>, RemoteError> {
        self.rows(
            table,
            &[
                ("select", "*".to_string()),
                ("owner_id", format!("eq.{}", owner)),
            ],
        )
    }

    fn fetch(&self, table: Table, owner: &str, id: &str) -> Result<Option<Record>, RemoteError> {
        let mut rows = self.rows(
            table,
            &[
                ("select", "*".to_string()),
                ("owner_id", format!("eq.{}", owner)),
                ("id", format!("eq.{}", id)),
            ],
        )?;
        Ok(rows.pop())
    }

    fn count(&self, table: Table, owner: &str) -> Result<usize, RemoteError> {
        let resp = self.send(
            self.client
                .get(self.endpoint(table))
                .query(&[("select", "id".to_string()), ("owner_id", format!("eq.{}", owner))]),
        )?;
        let ids: Vec<serde_json::Value> = resp
            .json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(ids.len())
    }

    fn delete(&self, table: LedgerTable, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.send(self.client.delete(self.endpoint(table.table())).query(&[
            ("owner_id", format!("eq.{}", owner)),
            ("id", format!("eq.{}", id)),
        ]))?;
        Ok(())
    }

    fn delete_all(&self, table: LedgerTable, owner: &str) -> Result<(), RemoteError> {
        self.send(
            self.client
                .delete(self.endpoint(table.table()))
                .query(&[("owner_id", format!("eq.{}", owner))]),
        )?;
        Ok(())
    }
}
