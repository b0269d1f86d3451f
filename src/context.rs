// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::SyncConfig;
use crate::error::LedgerError;
use crate::queue::MutationQueue;
use crate::remote::RemoteStore;
use crate::store::{Ledger, LocalStore};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Everything one session needs: both replicas, the signed-in owner, a
/// clock and the owner mutation queue. Components receive it by reference;
/// nothing in the crate holds ledger state in statics.
pub struct LedgerContext {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
    queue: MutationQueue,
    config: SyncConfig,
}

impl LedgerContext {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        config: SyncConfig,
    ) -> Self {
        LedgerContext {
            local,
            remote,
            auth,
            clock: Arc::new(SystemClock),
            queue: MutationQueue::new(),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn owner(&self) -> Result<String, LedgerError> {
        self.auth.current_owner()
    }

    pub fn ledger<'a>(&'a self, owner: &'a str) -> Ledger<'a> {
        Ledger::new(self.local.as_ref(), owner)
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    pub fn queue(&self) -> &MutationQueue {
        &self.queue
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
