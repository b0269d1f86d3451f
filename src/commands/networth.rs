// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::LedgerContext;
use crate::networth;
use crate::utils::pretty_table;
use anyhow::Result;
use serde_json::json;

pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    let history = networth::history(ctx)?;
    let change = history.summary();
    if m.get_flag("json") {
        let out = json!({ "points": history.points(), "change": change });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    let rows = history
        .iter()
        .map(|p| vec![p.month.clone(), p.value.to_string()])
        .collect();
    println!("{}", pretty_table(&["Month", "Net worth"], rows));
    println!("{}: {} ({})", change.label, change.value, change.percent);
    Ok(())
}
