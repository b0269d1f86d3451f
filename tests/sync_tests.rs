// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::Duration;
use common::{OWNER, harness, now, tx_draft};
use ledgersync::LedgerError;
use ledgersync::classify;
use ledgersync::models::{LedgerTable, Record, Table};
use ledgersync::remote::RemoteStore;
use ledgersync::store::PendingKind;
use ledgersync::sync::{self, SyncState};
use rust_decimal::Decimal;

#[test]
fn same_upsert_twice_leaves_one_row_with_latest_content() {
    let h = harness();
    let mut tx = tx_draft("2025-03-02", "12.50", "Coffee")
        .validate(OWNER, now())
        .unwrap();
    let first = sync::upsert(&h.ctx, tx.clone()).unwrap();
    assert_eq!(first.sync, SyncState::Synced);

    tx.amount = Decimal::new(1375, 2);
    let second = sync::upsert(&h.ctx, tx.clone()).unwrap();
    assert_eq!(second.id, first.id);

    let local = h.ledger().transactions().unwrap();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].amount, Decimal::new(1375, 2));

    let remote = h.remote.rows(Table::Transactions);
    assert_eq!(remote.len(), 1);
    let remote_tx = remote.into_iter().next().unwrap().into_transaction().unwrap();
    assert_eq!(remote_tx.amount, Decimal::new(1375, 2));
}

#[test]
fn malformed_id_is_replaced_before_storage() {
    let h = harness();
    let mut tx = tx_draft("2025-03-02", "5", "Bus").validate(OWNER, now()).unwrap();
    tx.id = "not-a-uuid".into();
    let report = sync::upsert(&h.ctx, tx).unwrap();
    assert_ne!(report.id, "not-a-uuid");
    assert!(ledgersync::ids::is_valid(&report.id));
    assert!(h.ledger().get(Table::Transactions, &report.id).unwrap().is_some());
}

#[test]
fn record_for_another_owner_is_rejected() {
    let h = harness();
    let tx = tx_draft("2025-03-02", "5", "Bus")
        .validate("5f0c6a3e-1d2b-4c7a-9e8f-0a1b2c3d4e5f", now())
        .unwrap();
    let err = sync::upsert(&h.ctx, tx).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "owner_id", .. }));
    assert!(h.ledger().transactions().unwrap().is_empty());
}

#[test]
fn remote_outage_keeps_write_local_and_pending() {
    let h = harness();
    h.remote.set_offline(true);
    let tx = tx_draft("2025-03-03", "40", "Fuel").validate(OWNER, now()).unwrap();
    let report = sync::upsert(&h.ctx, tx).unwrap();
    assert!(report.sync.is_pending());
    assert_eq!(h.ledger().transactions().unwrap().len(), 1);

    let pending = sync::status(&h.ctx).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, PendingKind::Upsert);
    assert_eq!(pending[0].attempts, 3);
    assert!(pending[0].last_error.contains("connection refused"));

    // Still down: the next trigger retries and keeps the op.
    let summary = sync::sync(&h.ctx).unwrap();
    assert_eq!(summary.flushed.still_pending, 1);
    assert!(summary.pull_error.is_some());
    assert_eq!(sync::status(&h.ctx).unwrap()[0].attempts, 6);

    h.remote.set_offline(false);
    let summary = sync::sync(&h.ctx).unwrap();
    assert_eq!(summary.flushed.synced, 1);
    assert!(sync::status(&h.ctx).unwrap().is_empty());
    assert_eq!(h.remote.rows(Table::Transactions).len(), 1);
}

#[test]
fn rejected_write_is_not_retried_until_rewritten() {
    let h = harness();
    h.remote.reject_next(1);
    let tx = tx_draft("2025-03-03", "40", "Fuel").validate(OWNER, now()).unwrap();
    let report = sync::upsert(&h.ctx, tx.clone()).unwrap();
    assert!(report.sync.is_pending());

    let pending = sync::status(&h.ctx).unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].rejected);
    assert_eq!(pending[0].attempts, 1);
    assert!(pending[0].last_error.contains("422"));

    let summary = sync::sync(&h.ctx).unwrap();
    assert_eq!(summary.flushed.rejected, 1);
    assert_eq!(summary.flushed.synced, 0);
    assert_eq!(sync::status(&h.ctx).unwrap()[0].attempts, 1);
    assert!(h.remote.rows(Table::Transactions).is_empty());
    // The pull leaves the rejected row in place locally.
    assert_eq!(h.ledger().transactions().unwrap().len(), 1);

    let report = sync::upsert(&h.ctx, tx).unwrap();
    assert_eq!(report.sync, SyncState::Synced);
    assert!(sync::status(&h.ctx).unwrap().is_empty());
    assert_eq!(h.remote.rows(Table::Transactions).len(), 1);
}

#[test]
fn transient_failure_is_absorbed_by_retry() {
    let h = harness();
    h.remote.fail_next(2);
    let tx = tx_draft("2025-03-03", "40", "Fuel").validate(OWNER, now()).unwrap();
    let report = sync::upsert(&h.ctx, tx).unwrap();
    assert_eq!(report.sync, SyncState::Synced);
    assert!(sync::status(&h.ctx).unwrap().is_empty());
}

#[test]
fn newer_remote_copy_wins_and_local_write_is_discarded() {
    let h = harness();
    let tx = tx_draft("2025-03-04", "10", "Lunch").validate(OWNER, now()).unwrap();
    let id = sync::upsert(&h.ctx, tx).unwrap().id;

    // Another device edits the row an hour later.
    let mut theirs = h
        .ledger()
        .get(Table::Transactions, &id)
        .unwrap()
        .and_then(Record::into_transaction)
        .unwrap();
    theirs.amount = Decimal::new(99, 0);
    theirs.updated_at = now() + Duration::hours(1);
    h.remote.inner().upsert(&Record::from(theirs)).unwrap();

    let mut mine = h
        .ledger()
        .get(Table::Transactions, &id)
        .unwrap()
        .and_then(Record::into_transaction)
        .unwrap();
    mine.amount = Decimal::new(11, 0);
    let report = sync::upsert(&h.ctx, mine).unwrap();
    assert_eq!(report.sync, SyncState::ConflictDiscarded);

    let local = h
        .ledger()
        .get(Table::Transactions, &id)
        .unwrap()
        .and_then(Record::into_transaction)
        .unwrap();
    assert_eq!(local.amount, Decimal::new(99, 0));
    assert!(sync::status(&h.ctx).unwrap().is_empty());
}

#[test]
fn updated_at_never_moves_backwards() {
    let h = harness();
    let tx = tx_draft("2025-03-04", "10", "Lunch").validate(OWNER, now()).unwrap();
    let id = sync::upsert(&h.ctx, tx.clone()).unwrap().id;
    let first = h.ledger().get(Table::Transactions, &id).unwrap().unwrap();

    h.clock.set(now() - Duration::days(2));
    sync::upsert(&h.ctx, tx).unwrap();
    let second = h.ledger().get(Table::Transactions, &id).unwrap().unwrap();
    assert!(second.updated_at() >= first.updated_at());
    assert_eq!(second.created_at(), first.created_at());
}

#[test]
fn failed_single_delete_is_reported_and_replayed() {
    let h = harness();
    let tx = tx_draft("2025-03-05", "8", "Parking").validate(OWNER, now()).unwrap();
    let id = sync::upsert(&h.ctx, tx).unwrap().id;

    h.remote.set_offline(true);
    let report = sync::delete(&h.ctx, LedgerTable::Transactions, &id).unwrap();
    assert!(report.found);
    match &report.sync {
        SyncState::Pending { reason } => assert!(reason.contains("connection refused")),
        other => panic!("expected pending delete, got {:?}", other),
    }
    assert!(h.ledger().transactions().unwrap().is_empty());
    assert_eq!(sync::status(&h.ctx).unwrap()[0].kind, PendingKind::Delete);

    h.remote.set_offline(false);
    let summary = sync::sync(&h.ctx).unwrap();
    assert_eq!(summary.flushed.synced, 1);
    assert!(h.remote.rows(Table::Transactions).is_empty());
    // The pull must not bring the row back.
    assert!(h.ledger().transactions().unwrap().is_empty());
}

#[test]
fn delete_rejects_malformed_id() {
    let h = harness();
    let err = sync::delete(&h.ctx, LedgerTable::Assets, "42").unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "id", .. }));
}

#[test]
fn pull_merges_remote_changes() {
    let h = harness();
    classify::add_category(&h.ctx, "groceries").unwrap();
    let keep = tx_draft("2025-03-01", "3", "Bread").validate(OWNER, now()).unwrap();
    let gone = tx_draft("2025-03-01", "4", "Milk").validate(OWNER, now()).unwrap();
    sync::upsert(&h.ctx, keep).unwrap();
    let gone_id = sync::upsert(&h.ctx, gone).unwrap().id;

    // Remote side: one row deleted, one row added by another device.
    h.remote
        .inner()
        .delete(LedgerTable::Transactions, OWNER, &gone_id)
        .unwrap();
    let other = tx_draft("2025-03-06", "60", "Shoes").validate(OWNER, now()).unwrap();
    let other_id = other.id.clone();
    h.remote.inner().upsert(&Record::from(other)).unwrap();

    let pulled = sync::pull(&h.ctx).unwrap();
    assert_eq!(pulled.pulled, 1);
    assert_eq!(pulled.removed, 1);

    let ids: Vec<String> = h
        .ledger()
        .transactions()
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&other_id));
    assert!(!ids.contains(&gone_id));
    assert_eq!(classify::category_names(&h.ctx).unwrap(), vec!["groceries"]);
}

#[test]
fn pull_leaves_rows_with_pending_writes_alone() {
    let h = harness();
    h.remote.set_offline(true);
    let tx = tx_draft("2025-03-07", "15", "Cinema").validate(OWNER, now()).unwrap();
    let id = sync::upsert(&h.ctx, tx).unwrap().id;
    h.remote.set_offline(false);

    let pulled = sync::pull(&h.ctx).unwrap();
    assert_eq!(pulled.removed, 0);
    assert!(h.ledger().get(Table::Transactions, &id).unwrap().is_some());
    assert_eq!(sync::status(&h.ctx).unwrap().len(), 1);
}

#[test]
fn pull_surfaces_remote_unavailable() {
    let h = harness();
    h.remote.set_offline(true);
    let err = sync::pull(&h.ctx).unwrap_err();
    assert!(matches!(err, LedgerError::RemoteUnavailable(_)));
}

#[test]
fn classification_seeding_is_idempotent_by_name() {
    let h = harness();
    assert!(classify::add_account(&h.ctx, "checking", "bank").unwrap().is_some());
    assert!(classify::add_account(&h.ctx, "Checking", "bank").unwrap().is_none());
    assert_eq!(classify::account_names(&h.ctx).unwrap(), vec!["checking"]);
    assert_eq!(h.remote.rows(Table::Accounts).len(), 1);
}

#[test]
fn concurrent_writers_for_one_owner_are_serialized() {
    let h = harness();
    std::thread::scope(|s| {
        for worker in 0..6 {
            let ctx = &h.ctx;
            s.spawn(move || {
                for n in 0..5 {
                    let tx = tx_draft("2025-03-08", &format!("{}.{}", worker, n), "Split")
                        .validate(OWNER, now())
                        .unwrap();
                    sync::upsert(ctx, tx).unwrap();
                }
            });
        }
    });
    assert_eq!(h.ledger().transactions().unwrap().len(), 30);
    assert_eq!(h.remote.rows(Table::Transactions).len(), 30);
}
