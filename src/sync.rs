// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local-first reconciliation between the local replica and the remote store.
//!
//! Writes land in the local store first and are then mirrored remotely.
//! A remote failure leaves a `PendingOp` behind instead of failing the
//! caller; `sync` replays pending operations and pulls remote changes.
//! Remote collisions are settled by last-writer-wins on `updated_at`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::context::LedgerContext;
use crate::error::{LedgerError, RemoteError};
use crate::ids;
use crate::models::{LedgerTable, Record, Table};
use crate::recurring;
use crate::retry;
use crate::store::{Ledger, PendingKind, PendingOp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    Synced,
    /// Durable locally, waiting for the remote store.
    Pending { reason: String },
    /// The remote copy was newer; the local write was replaced by it.
    ConflictDiscarded,
}

impl SyncState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SyncState::Pending { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub table: Table,
    pub id: String,
    pub sync: SyncState,
    /// Transaction created by the recurring generator as part of this write.
    pub generated: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    pub table: LedgerTable,
    pub id: String,
    /// Whether the row existed locally.
    pub found: bool,
    pub sync: SyncState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushSummary {
    pub synced: usize,
    pub discarded: usize,
    pub dropped: usize,
    pub still_pending: usize,
    /// Refused by the remote earlier and left for the user to resolve.
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullSummary {
    pub pulled: usize,
    pub removed: usize,
    pub skipped_pending: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub flushed: FlushSummary,
    pub pulled: Option<PullSummary>,
    pub pull_error: Option<String>,
}

enum Push {
    Written,
    Lost(Record),
}

/// Writes `record` locally, then mirrors it to the remote store.
///
/// A malformed or empty id is replaced before anything is stored. Remote
/// failures are absorbed: the report carries `SyncState::Pending`.
pub fn upsert(ctx: &LedgerContext, record: impl Into<Record>) -> Result<WriteReport, LedgerError> {
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);
    upsert_locked(ctx, &owner, record.into())
}

/// `upsert` for callers already holding the owner's queue turn.
pub(crate) fn upsert_locked(
    ctx: &LedgerContext,
    owner: &str,
    mut record: Record,
) -> Result<WriteReport, LedgerError> {
    if !record.owner_id().is_empty() && record.owner_id() != owner {
        return Err(LedgerError::validation(
            "owner_id",
            format!("record belongs to owner '{}'", record.owner_id()),
        ));
    }
    record.set_owner(owner);

    let id = ids::coerce(record.id());
    if id != record.id() {
        info!(table = %record.table(), supplied = %record.id(), %id, "replaced malformed id");
        record.set_id(id.clone());
    }

    let table = record.table();
    let ledger = ctx.ledger(owner);
    let now = ctx.now();
    let (created_at, updated_at) = match ledger.get(table, &id)? {
        Some(prev) => (prev.created_at(), now.max(prev.updated_at())),
        None => (record.created_at(), now),
    };
    record.set_timestamps(created_at, updated_at);
    ledger.put(&record)?;
    debug!(%table, %id, "local write");

    let prior = ledger.pending_for(table, &id)?;
    let sync = push(ctx, &ledger, &record, prior.as_ref())?;

    let mut generated = None;
    if table == Table::Liabilities {
        // Run against whatever won the write, which may be the remote copy.
        let current = ledger.get(table, &id)?.and_then(Record::into_liability);
        if let Some(liability) = current {
            generated = recurring::generate_locked(ctx, owner, &liability)?
                .created()
                .map(str::to_string);
        }
    }

    Ok(WriteReport {
        table,
        id,
        sync,
        generated,
    })
}

fn push(
    ctx: &LedgerContext,
    ledger: &Ledger<'_>,
    record: &Record,
    prior: Option<&PendingOp>,
) -> Result<SyncState, LedgerError> {
    let remote = ctx.remote();
    let attempt = |_: u32| -> Result<Push, RemoteError> {
        if let Some(current) = remote.fetch(record.table(), ledger.owner(), record.id())? {
            if current.updated_at() > record.updated_at() {
                return Ok(Push::Lost(current));
            }
        }
        remote.upsert(record)?;
        Ok(Push::Written)
    };
    let outcome = retry::run_if(&ctx.config().retry, RemoteError::is_transient, attempt);

    match outcome {
        Ok((Push::Written, _)) => {
            ledger.remove_pending(record.table(), record.id())?;
            Ok(SyncState::Synced)
        }
        Ok((Push::Lost(winner), _)) => {
            info!(
                table = %record.table(),
                id = %record.id(),
                local = %record.updated_at(),
                remote = %winner.updated_at(),
                "conflict discarded: remote copy is newer"
            );
            ledger.put(&winner)?;
            ledger.remove_pending(record.table(), record.id())?;
            Ok(SyncState::ConflictDiscarded)
        }
        Err(exhausted) => {
            let reason = exhausted.last_error.to_string();
            let op = PendingOp {
                kind: PendingKind::Upsert,
                table: record.table(),
                id: record.id().to_string(),
                attempts: prior.map_or(0, |p| p.attempts) + exhausted.attempts,
                last_error: reason.clone(),
                queued_at: queued_at(prior, ctx.now()),
                rejected: !exhausted.last_error.is_transient(),
            };
            warn!(table = %op.table, id = %op.id, attempts = op.attempts, rejected = op.rejected, error = %reason, "remote upsert pending");
            ledger.put_pending(&op)?;
            Ok(SyncState::Pending { reason })
        }
    }
}

fn queued_at(prior: Option<&PendingOp>, now: DateTime<Utc>) -> DateTime<Utc> {
    prior.map_or(now, |p| p.queued_at)
}

/// Removes a ledger row locally, then remotely. A remote failure is
/// returned in the report and queued for the next sync.
pub fn delete(ctx: &LedgerContext, table: LedgerTable, id: &str) -> Result<DeleteReport, LedgerError> {
    let id = id.trim();
    if !ids::is_valid(id) {
        return Err(LedgerError::validation(
            "id",
            format!("'{}' is not a valid id", id),
        ));
    }
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);
    delete_locked(ctx, &owner, table, id)
}

pub(crate) fn delete_locked(
    ctx: &LedgerContext,
    owner: &str,
    table: LedgerTable,
    id: &str,
) -> Result<DeleteReport, LedgerError> {
    let ledger = ctx.ledger(owner);
    let found = ledger.remove(table, id)?;
    let prior = ledger.pending_for(table.table(), id)?;
    ledger.remove_pending(table.table(), id)?;
    debug!(%table, %id, found, "local delete");

    let sync = remote_delete(ctx, &ledger, table, id, prior.as_ref())?;
    Ok(DeleteReport {
        table,
        id: id.to_string(),
        found,
        sync,
    })
}

fn remote_delete(
    ctx: &LedgerContext,
    ledger: &Ledger<'_>,
    table: LedgerTable,
    id: &str,
    prior: Option<&PendingOp>,
) -> Result<SyncState, LedgerError> {
    let remote = ctx.remote();
    match retry::run_if(&ctx.config().retry, RemoteError::is_transient, |_| {
        remote.delete(table, ledger.owner(), id)
    }) {
        Ok(_) => {
            ledger.remove_pending(table.table(), id)?;
            Ok(SyncState::Synced)
        }
        Err(exhausted) => {
            let reason = exhausted.last_error.to_string();
            let op = PendingOp {
                kind: PendingKind::Delete,
                table: table.table(),
                id: id.to_string(),
                attempts: prior
                    .filter(|p| p.kind == PendingKind::Delete)
                    .map_or(0, |p| p.attempts)
                    + exhausted.attempts,
                last_error: reason.clone(),
                queued_at: queued_at(prior, ctx.now()),
                rejected: !exhausted.last_error.is_transient(),
            };
            warn!(%table, %id, attempts = op.attempts, rejected = op.rejected, error = %reason, "remote delete pending");
            ledger.put_pending(&op)?;
            Ok(SyncState::Pending { reason })
        }
    }
}

/// Replays every pending operation for the current owner. Operations the
/// remote rejected stay in `status` until the row is written again.
pub fn flush_pending(ctx: &LedgerContext) -> Result<FlushSummary, LedgerError> {
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);
    flush_locked(ctx, &owner)
}

fn flush_locked(ctx: &LedgerContext, owner: &str) -> Result<FlushSummary, LedgerError> {
    let ledger = ctx.ledger(owner);
    let mut summary = FlushSummary::default();
    for op in ledger.pending()? {
        if op.rejected {
            debug!(table = %op.table, id = %op.id, "skipping rejected operation");
            summary.rejected += 1;
            continue;
        }
        let state = match (op.kind, op.table.as_ledger()) {
            (PendingKind::Upsert, _) => match ledger.get(op.table, &op.id)? {
                Some(record) => push(ctx, &ledger, &record, Some(&op))?,
                None => {
                    ledger.remove_pending(op.table, &op.id)?;
                    summary.dropped += 1;
                    continue;
                }
            },
            (PendingKind::Delete, Some(table)) => {
                remote_delete(ctx, &ledger, table, &op.id, Some(&op))?
            }
            (PendingKind::Delete, None) => {
                warn!(table = %op.table, id = %op.id, "dropping delete queued against a classification table");
                ledger.remove_pending(op.table, &op.id)?;
                summary.dropped += 1;
                continue;
            }
        };
        match state {
            SyncState::Synced => summary.synced += 1,
            SyncState::ConflictDiscarded => summary.discarded += 1,
            SyncState::Pending { .. } => summary.still_pending += 1,
        }
    }
    Ok(summary)
}

/// Brings remote changes into the local replica.
///
/// Newer remote rows replace local ones. Rows with a pending local
/// operation are left alone. Ledger rows missing remotely and not pending
/// were deleted elsewhere and are removed; classification rows never are.
pub fn pull(ctx: &LedgerContext) -> Result<PullSummary, LedgerError> {
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);
    pull_locked(ctx, &owner)
}

fn pull_locked(ctx: &LedgerContext, owner: &str) -> Result<PullSummary, LedgerError> {
    let ledger = ctx.ledger(owner);
    let mut summary = PullSummary::default();
    for table in Table::ALL {
        let rows = ctx.remote().select(table, owner)?;
        let mut seen = HashSet::with_capacity(rows.len());
        for row in rows {
            if !ids::is_valid(row.id()) || row.owner_id() != owner {
                warn!(%table, id = %row.id(), "skipping malformed remote row");
                continue;
            }
            seen.insert(row.id().to_string());
            if ledger.pending_for(table, row.id())?.is_some() {
                summary.skipped_pending += 1;
                continue;
            }
            let newer = match ledger.get(table, row.id())? {
                Some(local) => row.updated_at() > local.updated_at(),
                None => true,
            };
            if newer {
                ledger.put(&row)?;
                summary.pulled += 1;
            }
        }

        if let Some(ledger_table) = table.as_ledger() {
            for local in ledger.list(table)? {
                if seen.contains(local.id()) || ledger.pending_for(table, local.id())?.is_some() {
                    continue;
                }
                ledger.remove(ledger_table, local.id())?;
                summary.removed += 1;
            }
        }
    }
    info!(
        pulled = summary.pulled,
        removed = summary.removed,
        skipped = summary.skipped_pending,
        "pull complete"
    );
    Ok(summary)
}

/// The explicit sync trigger: replay pending writes, then pull.
pub fn sync(ctx: &LedgerContext) -> Result<SyncSummary, LedgerError> {
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);
    let flushed = flush_locked(ctx, &owner)?;
    let mut summary = SyncSummary {
        flushed,
        ..SyncSummary::default()
    };
    match pull_locked(ctx, &owner) {
        Ok(pulled) => summary.pulled = Some(pulled),
        Err(LedgerError::RemoteUnavailable(reason)) => {
            warn!(error = %reason, "pull skipped");
            summary.pull_error = Some(reason);
        }
        Err(other) => return Err(other),
    }
    Ok(summary)
}

/// Pending operations for the current owner, oldest first.
pub fn status(ctx: &LedgerContext) -> Result<Vec<PendingOp>, LedgerError> {
    let owner = ctx.owner()?;
    ctx.ledger(&owner).pending()
}
