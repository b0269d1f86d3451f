// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod assets;
pub mod categories;
pub mod clear;
pub mod config;
pub mod importer;
pub mod liabilities;
pub mod networth;
pub mod sync;
pub mod transactions;

use anyhow::{Result, anyhow};

use crate::sync::SyncState;

pub(crate) fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("--{} is required", name))
}

pub(crate) fn opt_arg(m: &clap::ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name).map(|s| s.trim().to_string())
}

/// Suffix for write confirmations.
pub(crate) fn sync_note(state: &SyncState) -> String {
    match state {
        SyncState::Synced => String::new(),
        SyncState::Pending { reason } => format!(" [sync pending: {}]", reason),
        SyncState::ConflictDiscarded => " [discarded: remote copy is newer]".to_string(),
    }
}
