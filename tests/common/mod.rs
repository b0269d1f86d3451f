// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use ledgersync::auth::StaticOwner;
use ledgersync::config::SyncConfig;
use ledgersync::context::{FixedClock, LedgerContext};
use ledgersync::drafts::{AssetDraft, LiabilityDraft, TransactionDraft};
use ledgersync::error::RemoteError;
use ledgersync::models::{LedgerTable, Record, Table};
use ledgersync::remote::{RemoteStore, SqliteRemote};
use ledgersync::retry::RetryPolicy;
use ledgersync::store::{Ledger, SqliteStore};

pub const OWNER: &str = "8f14e45f-ceea-467f-a0e6-3ab2c0f9c1d2";

/// In-memory remote that can be switched off, made to fail or reject a
/// number of calls, or made to ignore bulk deletes for chosen tables.
pub struct FlakyRemote {
    inner: SqliteRemote,
    offline: AtomicBool,
    failures: AtomicUsize,
    rejections: AtomicUsize,
    stubborn: Mutex<Vec<LedgerTable>>,
}

impl FlakyRemote {
    pub fn new() -> Self {
        FlakyRemote {
            inner: SqliteRemote::open_in_memory().unwrap(),
            offline: AtomicBool::new(false),
            failures: AtomicUsize::new(0),
            rejections: AtomicUsize::new(0),
            stubborn: Mutex::new(Vec::new()),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_next(&self, calls: usize) {
        self.failures.store(calls, Ordering::SeqCst);
    }

    /// The next `calls` requests fail with a 422.
    pub fn reject_next(&self, calls: usize) {
        self.rejections.store(calls, Ordering::SeqCst);
    }

    pub fn ignore_deletes_for(&self, table: LedgerTable) {
        self.stubborn.lock().push(table);
    }

    pub fn allow_deletes(&self) {
        self.stubborn.lock().clear();
    }

    /// Direct access, bypassing failure injection.
    pub fn inner(&self) -> &SqliteRemote {
        &self.inner
    }

    pub fn rows(&self, table: Table) -> Vec<Record> {
        self.inner.select(table, OWNER).unwrap()
    }

    fn gate(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("connection refused".into()));
        }
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RemoteError::Unavailable("injected failure".into()));
        }
        if self
            .rejections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RemoteError::Rejected {
                status: 422,
                message: "violates check constraint".into(),
            });
        }
        Ok(())
    }
}

impl RemoteStore for FlakyRemote {
    fn upsert(&self, record: &Record) -> Result<(), RemoteError> {
        self.gate()?;
        self.inner.upsert(record)
    }

    fn select(&self, table: Table, owner: &str) -> Result<Vec<Record>, RemoteError> {
        self.gate()?;
        self.inner.select(table, owner)
    }

    fn fetch(&self, table: Table, owner: &str, id: &str) -> Result<Option<Record>, RemoteError> {
        self.gate()?;
        self.inner.fetch(table, owner, id)
    }

    fn count(&self, table: Table, owner: &str) -> Result<usize, RemoteError> {
        self.gate()?;
        self.inner.count(table, owner)
    }

    fn delete(&self, table: LedgerTable, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.gate()?;
        self.inner.delete(table, owner, id)
    }

    fn delete_all(&self, table: LedgerTable, owner: &str) -> Result<(), RemoteError> {
        self.gate()?;
        if self.stubborn.lock().contains(&table) {
            return Ok(());
        }
        self.inner.delete_all(table, owner)
    }
}

pub struct Harness {
    pub ctx: LedgerContext,
    pub remote: Arc<FlakyRemote>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn ledger(&self) -> Ledger<'_> {
        self.ctx.ledger(OWNER)
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
}

pub fn test_config() -> SyncConfig {
    SyncConfig {
        owner_id: Some(OWNER.to_string()),
        retry: RetryPolicy::immediate(3),
        clear_retries: 3,
        clear_delay: Duration::ZERO,
        ..SyncConfig::default()
    }
}

pub fn harness() -> Harness {
    harness_at(now())
}

pub fn harness_at(at: DateTime<Utc>) -> Harness {
    let remote = Arc::new(FlakyRemote::new());
    let clock = Arc::new(FixedClock::new(at));
    let ctx = LedgerContext::new(
        Arc::new(SqliteStore::open_in_memory().unwrap()),
        remote.clone(),
        Arc::new(StaticOwner::new(OWNER).unwrap()),
        test_config(),
    )
    .with_clock(clock.clone());
    Harness { ctx, remote, clock }
}

pub fn tx_draft(date: &str, amount: &str, description: &str) -> TransactionDraft {
    TransactionDraft {
        id: None,
        amount: amount.into(),
        kind: "expense".into(),
        description: description.into(),
        category: "groceries".into(),
        account: "checking".into(),
        date: date.into(),
    }
}

pub fn asset_draft(name: &str, r#type: &str, value: &str) -> AssetDraft {
    AssetDraft {
        name: name.into(),
        r#type: r#type.into(),
        current_value: value.into(),
        ..AssetDraft::default()
    }
}

pub fn loan_draft(name: &str, payment: &str, day: &str) -> LiabilityDraft {
    LiabilityDraft {
        name: name.into(),
        r#type: "loan".into(),
        principal: "250000".into(),
        current_amount: Some("200000".into()),
        interest_rate: Some("6.5".into()),
        monthly_payment: Some(payment.into()),
        payment_day: Some(day.into()),
        payment_account: Some("checking".into()),
        ..LiabilityDraft::default()
    }
}
