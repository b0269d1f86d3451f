// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::arg;
use crate::config::{KEY_API_KEY, KEY_OWNER, KEY_REMOTE_URL, KNOWN_KEYS, SyncConfig};
use crate::ids;
use crate::utils::{pretty_table, set_setting};
use anyhow::{Result, bail};
use rusqlite::Connection;

/// Runs before a ledger context exists, so it works on the raw settings.
pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let cfg = SyncConfig::load(conn)?;
            let rows = vec![
                vec!["owner_id".into(), cfg.owner_id.unwrap_or_else(|| "(unset)".into())],
                vec![
                    "remote_url".into(),
                    cfg.remote_url.unwrap_or_else(|| "(local file remote)".into()),
                ],
                vec![
                    KEY_API_KEY.into(),
                    if cfg.api_key.is_some() { "(set)".into() } else { "(unset)".into() },
                ],
                vec!["retry_attempts".into(), cfg.retry.max_attempts.to_string()],
                vec!["retry_base_ms".into(), cfg.retry.base_delay.as_millis().to_string()],
                vec!["retry_max_ms".into(), cfg.retry.max_delay.as_millis().to_string()],
                vec!["clear_retries".into(), cfg.clear_retries.to_string()],
                vec!["clear_delay_ms".into(), cfg.clear_delay.as_millis().to_string()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = arg(sub, "value")?;
            if !KNOWN_KEYS.contains(&key) {
                bail!("Unknown setting '{}', expected one of: {}", key, KNOWN_KEYS.join(", "));
            }
            match key {
                KEY_OWNER if !ids::is_valid(value) => bail!("owner_id must be a UUID"),
                KEY_OWNER | KEY_REMOTE_URL | KEY_API_KEY => {}
                _ if value.parse::<u32>().is_err() => {
                    bail!("'{}' expects a non-negative integer, got '{}'", key, value)
                }
                _ => {}
            }
            set_setting(conn, key, value)?;
            println!("Set {}", key);
        }
        _ => {}
    }
    Ok(())
}
