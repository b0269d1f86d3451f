// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, sync_note};
use crate::classify;
use crate::context::LedgerContext;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let typ = arg(sub, "type")?;
            match classify::add_account(ctx, name, typ)? {
                Some(report) => println!("Added account '{}' ({}){}", name, typ, sync_note(&report.sync)),
                None => println!("Account '{}' already exists", name),
            }
        }
        Some(("list", _)) => {
            let owner = ctx.owner()?;
            let mut accounts = ctx.ledger(&owner).accounts()?;
            accounts.sort_by(|a, b| a.name.cmp(&b.name));
            let data = accounts
                .into_iter()
                .map(|a| vec![a.name, a.r#type, a.created_at.format("%Y-%m-%d").to_string()])
                .collect();
            println!("{}", pretty_table(&["Name", "Type", "Created"], data));
        }
        _ => {}
    }
    Ok(())
}
