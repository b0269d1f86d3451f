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
            match classify::add_category(ctx, name)? {
                Some(report) => println!("Added category '{}'{}", name, sync_note(&report.sync)),
                None => println!("Category '{}' already exists", name),
            }
        }
        Some(("list", _)) => {
            let data = classify::category_names(ctx)?
                .into_iter()
                .map(|n| vec![n])
                .collect();
            println!("{}", pretty_table(&["Category"], data));
        }
        _ => {}
    }
    Ok(())
}
