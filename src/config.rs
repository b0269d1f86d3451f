// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::time::Duration;

use crate::ids;
use crate::retry::RetryPolicy;
use crate::utils::{get_setting, set_setting};

pub const KEY_OWNER: &str = "owner_id";
pub const KEY_REMOTE_URL: &str = "remote_url";
pub const KEY_API_KEY: &str = "remote_api_key";
pub const KEY_RETRY_ATTEMPTS: &str = "retry_attempts";
pub const KEY_RETRY_BASE_MS: &str = "retry_base_ms";
pub const KEY_RETRY_MAX_MS: &str = "retry_max_ms";
pub const KEY_CLEAR_RETRIES: &str = "clear_retries";
pub const KEY_CLEAR_DELAY_MS: &str = "clear_delay_ms";

/// Settings keys accepted by `config set`.
pub const KNOWN_KEYS: [&str; 8] = [
    KEY_OWNER,
    KEY_REMOTE_URL,
    KEY_API_KEY,
    KEY_RETRY_ATTEMPTS,
    KEY_RETRY_BASE_MS,
    KEY_RETRY_MAX_MS,
    KEY_CLEAR_RETRIES,
    KEY_CLEAR_DELAY_MS,
];

const ENV_OWNER: &str = "LEDGERSYNC_OWNER";
const ENV_REMOTE_URL: &str = "LEDGERSYNC_REMOTE_URL";
const ENV_API_KEY: &str = "LEDGERSYNC_API_KEY";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub owner_id: Option<String>,
    /// When unset the file-backed remote in the data dir is used.
    pub remote_url: Option<String>,
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
    /// Extra delete attempts per table after the first one during a bulk clear.
    pub clear_retries: u32,
    pub clear_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            owner_id: None,
            remote_url: None,
            api_key: None,
            retry: RetryPolicy::default(),
            clear_retries: 3,
            clear_delay: Duration::from_millis(250),
        }
    }
}

fn env_or(key: &str, stored: Option<String>) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or(stored)
}

fn parse_number<T: std::str::FromStr>(conn: &Connection, key: &str, default: T) -> Result<T> {
    match get_setting(conn, key)? {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("Invalid number '{}' for setting '{}'", raw, key)),
        None => Ok(default),
    }
}

impl SyncConfig {
    /// Stored settings, overridden by `LEDGERSYNC_*` environment variables.
    pub fn load(conn: &Connection) -> Result<Self> {
        let defaults = SyncConfig::default();
        let retry = RetryPolicy {
            max_attempts: parse_number(conn, KEY_RETRY_ATTEMPTS, defaults.retry.max_attempts)?,
            base_delay: Duration::from_millis(parse_number(
                conn,
                KEY_RETRY_BASE_MS,
                defaults.retry.base_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_number(
                conn,
                KEY_RETRY_MAX_MS,
                defaults.retry.max_delay.as_millis() as u64,
            )?),
        };
        Ok(SyncConfig {
            owner_id: env_or(ENV_OWNER, get_setting(conn, KEY_OWNER)?),
            remote_url: env_or(ENV_REMOTE_URL, get_setting(conn, KEY_REMOTE_URL)?),
            api_key: env_or(ENV_API_KEY, get_setting(conn, KEY_API_KEY)?),
            retry,
            clear_retries: parse_number(conn, KEY_CLEAR_RETRIES, defaults.clear_retries)?,
            clear_delay: Duration::from_millis(parse_number(
                conn,
                KEY_CLEAR_DELAY_MS,
                defaults.clear_delay.as_millis() as u64,
            )?),
        })
    }

    /// The configured owner, or a newly generated one persisted for next time.
    pub fn ensure_owner(&mut self, conn: &Connection) -> Result<String> {
        if let Some(owner) = &self.owner_id {
            return Ok(owner.clone());
        }
        let owner = ids::generate();
        set_setting(conn, KEY_OWNER, &owner).context("Persist generated owner id")?;
        self.owner_id = Some(owner.clone());
        Ok(owner)
    }
}
