// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::LedgerContext;
use crate::sync;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("run", _)) => {
            let summary = sync::sync(ctx)?;
            let f = &summary.flushed;
            println!(
                "Pushed {} pending write(s), {} discarded, {} still pending, {} rejected",
                f.synced, f.discarded, f.still_pending, f.rejected
            );
            match (&summary.pulled, &summary.pull_error) {
                (Some(p), _) => println!(
                    "Pulled {} row(s), removed {} deleted elsewhere",
                    p.pulled, p.removed
                ),
                (None, Some(err)) => println!("Pull skipped: {}", err),
                (None, None) => {}
            }
        }
        Some(("status", _)) => {
            let pending = sync::status(ctx)?;
            if pending.is_empty() {
                println!("Everything is synced");
                return Ok(());
            }
            let rows = pending
                .into_iter()
                .map(|op| {
                    vec![
                        if op.rejected {
                            format!("{:?} (rejected)", op.kind).to_lowercase()
                        } else {
                            format!("{:?}", op.kind).to_lowercase()
                        },
                        op.table.to_string(),
                        op.id,
                        op.attempts.to_string(),
                        op.last_error,
                        op.queued_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Op", "Table", "Id", "Attempts", "Last error", "Queued"], rows)
            );
        }
        _ => {}
    }
    Ok(())
}
