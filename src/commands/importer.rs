// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::arg;
use crate::context::LedgerContext;
use crate::ingest;
use anyhow::Result;
use std::path::Path;

pub fn handle(ctx: &LedgerContext, sub: &clap::ArgMatches) -> Result<()> {
    let path = arg(sub, "path")?;
    let summary = ingest::import_csv(ctx, Path::new(path))?;
    println!(
        "Imported assets from {}: {} added, {} updated",
        path, summary.inserted, summary.updated
    );
    if summary.collapsed > 0 {
        println!("Removed {} duplicate row(s)", summary.collapsed);
    }
    if summary.pending > 0 {
        println!("{} row(s) waiting to sync", summary.pending);
    }
    Ok(())
}
