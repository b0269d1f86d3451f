// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::clear;
use crate::context::LedgerContext;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

/// Exits non-zero through `PartialDeleteFailure` when a table stays dirty.
pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    let report = clear::clear_all(ctx)?;
    if !maybe_print_json(m.get_flag("json"), false, &report)? {
        let rows = report
            .tables
            .iter()
            .map(|(table, status)| vec![table.to_string(), status.to_string()])
            .collect();
        println!("{}", pretty_table(&["Table", "Status"], rows));
    }
    report.into_result()?;
    Ok(())
}
