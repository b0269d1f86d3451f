// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bulk delete of an owner's ledger.
//!
//! Each invocation walks `Pending -> Deleting(t) -> Verifying(t)` for every
//! target table and ends in `Done` or `Failed`. Targets are `LedgerTable`
//! values, so categories and accounts cannot be named here.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

use crate::context::LedgerContext;
use crate::error::LedgerError;
use crate::models::LedgerTable;
use crate::store::{PendingKind, PendingOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "table", rename_all = "snake_case")]
pub enum ClearPhase {
    Pending,
    Deleting(LedgerTable),
    Verifying(LedgerTable),
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Ok { removed: usize },
    Failed { reason: String },
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Ok { removed } => write!(f, "ok ({} removed locally)", removed),
            TableStatus::Failed { reason } => write!(f, "failed ({})", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearReport {
    pub owner: String,
    pub tables: BTreeMap<LedgerTable, TableStatus>,
    pub phase: ClearPhase,
}

impl ClearReport {
    pub fn is_done(&self) -> bool {
        self.phase == ClearPhase::Done
    }

    pub fn failed_tables(&self) -> Vec<LedgerTable> {
        self.tables
            .iter()
            .filter(|(_, status)| matches!(status, TableStatus::Failed { .. }))
            .map(|(table, _)| *table)
            .collect()
    }

    /// One line per table, e.g. `assets: failed (3 rows remain)`.
    pub fn summary(&self) -> String {
        self.tables
            .iter()
            .map(|(table, status)| format!("{}: {}", table, status))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn into_result(self) -> Result<ClearReport, LedgerError> {
        if self.is_done() {
            Ok(self)
        } else {
            Err(LedgerError::PartialDeleteFailure(Box::new(self)))
        }
    }
}

struct Coordinator<'a> {
    ctx: &'a LedgerContext,
    owner: &'a str,
    phase: ClearPhase,
}

impl<'a> Coordinator<'a> {
    fn enter(&mut self, phase: ClearPhase) {
        debug!(owner = %self.owner, from = ?self.phase, to = ?phase, "clear phase");
        self.phase = phase;
    }

    fn clear_table(&mut self, table: LedgerTable) -> Result<TableStatus, LedgerError> {
        self.enter(ClearPhase::Deleting(table));
        let (ctx, owner) = (self.ctx, self.owner);
        let ledger = ctx.ledger(owner);
        let cleared: BTreeSet<String> = ledger
            .list(table.table())?
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        let removed = ledger.remove_all(table)?;
        ledger.remove_pending_table(table)?;
        if table == LedgerTable::Transactions {
            ledger.clear_recurring_entries()?;
        }

        let remote = ctx.remote();
        let attempts = 1 + ctx.config().clear_retries;
        let mut reason = String::new();
        for attempt in 1..=attempts {
            if attempt > 1 {
                self.enter(ClearPhase::Deleting(table));
                let delay = ctx.config().clear_delay;
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            if let Err(err) = remote.delete_all(table, owner) {
                reason = err.to_string();
                warn!(%table, attempt, error = %reason, "remote delete failed");
                continue;
            }

            self.enter(ClearPhase::Verifying(table));
            let local_left = ledger.count(table.table())?;
            match remote.count(table.table(), owner) {
                Ok(0) if local_left == 0 => return Ok(TableStatus::Ok { removed }),
                Ok(remote_left) => {
                    reason = format!("{} rows remain", remote_left + local_left);
                    warn!(%table, attempt, remote_left, local_left, "rows remain after delete");
                }
                Err(err) => {
                    reason = format!("verification failed: {}", err);
                    warn!(%table, attempt, error = %err, "could not verify delete");
                }
            }
        }
        self.queue_leftovers(table, cleared, &reason)?;
        Ok(TableStatus::Failed { reason })
    }

    /// Queues a delete for every row of a failed table so a later pull
    /// cannot restore it and the next sync finishes the job.
    fn queue_leftovers(
        &self,
        table: LedgerTable,
        mut ids: BTreeSet<String>,
        reason: &str,
    ) -> Result<(), LedgerError> {
        let (ctx, owner) = (self.ctx, self.owner);
        match ctx.remote().select(table.table(), owner) {
            Ok(rows) => ids.extend(rows.iter().map(|r| r.id().to_string())),
            Err(err) => debug!(%table, error = %err, "could not list remote leftovers"),
        }
        let ledger = ctx.ledger(owner);
        let now = ctx.now();
        for id in &ids {
            ledger.put_pending(&PendingOp {
                kind: PendingKind::Delete,
                table: table.table(),
                id: id.clone(),
                attempts: 1 + ctx.config().clear_retries,
                last_error: reason.to_string(),
                queued_at: now,
                rejected: false,
            })?;
        }
        info!(%table, queued = ids.len(), "queued deletes for uncleared rows");
        Ok(())
    }
}

/// Deletes every transaction, asset and liability of the current owner.
/// Categories and accounts are left untouched.
pub fn clear_all(ctx: &LedgerContext) -> Result<ClearReport, LedgerError> {
    clear_tables(ctx, &LedgerTable::ALL)
}

/// Bulk delete restricted to `tables`, e.g. the failures of an earlier run.
///
/// Only local storage errors are returned as `Err`; remote trouble is
/// reported per table.
pub fn clear_tables(ctx: &LedgerContext, tables: &[LedgerTable]) -> Result<ClearReport, LedgerError> {
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);

    let mut coordinator = Coordinator {
        ctx,
        owner: &owner,
        phase: ClearPhase::Pending,
    };
    let mut statuses = BTreeMap::new();
    for &table in tables {
        if statuses.contains_key(&table) {
            continue;
        }
        let status = coordinator.clear_table(table)?;
        statuses.insert(table, status);
    }

    let failed = statuses
        .values()
        .any(|s| matches!(s, TableStatus::Failed { .. }));
    coordinator.enter(if failed { ClearPhase::Failed } else { ClearPhase::Done });
    let report = ClearReport {
        owner: owner.clone(),
        tables: statuses,
        phase: coordinator.phase,
    };
    if failed {
        warn!(owner = %owner, summary = %report.summary(), "bulk delete incomplete");
    } else {
        info!(owner = %owner, summary = %report.summary(), "bulk delete complete");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(tables: Vec<(LedgerTable, TableStatus)>, phase: ClearPhase) -> ClearReport {
        ClearReport {
            owner: "o".into(),
            tables: tables.into_iter().collect(),
            phase,
        }
    }

    #[test]
    fn summary_lists_tables_in_order() {
        let r = report(
            vec![
                (LedgerTable::Assets, TableStatus::Failed { reason: "3 rows remain".into() }),
                (LedgerTable::Transactions, TableStatus::Ok { removed: 2 }),
            ],
            ClearPhase::Failed,
        );
        assert_eq!(
            r.summary(),
            "transactions: ok (2 removed locally), assets: failed (3 rows remain)"
        );
        assert_eq!(r.failed_tables(), vec![LedgerTable::Assets]);
    }

    #[test]
    fn failed_report_becomes_partial_delete_error() {
        let r = report(
            vec![(LedgerTable::Liabilities, TableStatus::Failed { reason: "down".into() })],
            ClearPhase::Failed,
        );
        let err = r.into_result().unwrap_err();
        assert!(matches!(err, LedgerError::PartialDeleteFailure(_)));
        assert_eq!(err.to_string(), "bulk delete incomplete: liabilities: failed (down)");
    }

    #[test]
    fn report_serializes_per_table() {
        let r = report(
            vec![(LedgerTable::Transactions, TableStatus::Ok { removed: 0 })],
            ClearPhase::Done,
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["tables"]["transactions"]["status"], "ok");
        assert_eq!(json["phase"]["phase"], "done");
    }
}
