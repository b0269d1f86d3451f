// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, opt_arg, sync_note};
use crate::context::LedgerContext;
use crate::drafts::AssetDraft;
use crate::ingest::{self, IngestOutcome};
use crate::models::LedgerTable;
use crate::sync;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ingest", sub)) => {
            let draft = AssetDraft {
                id: opt_arg(sub, "id"),
                name: arg(sub, "name")?.to_string(),
                r#type: arg(sub, "type")?.to_string(),
                current_value: arg(sub, "value")?.to_string(),
                cost_basis: opt_arg(sub, "cost-basis"),
                quantity: opt_arg(sub, "quantity"),
            };
            let report = ingest::ingest_asset(ctx, &draft)?;
            let verb = match report.outcome {
                IngestOutcome::Inserted => "Added",
                IngestOutcome::DuplicateDetected => "Updated",
            };
            println!(
                "{} asset '{}' ({}){}",
                verb,
                draft.name.trim(),
                report.id,
                sync_note(&report.sync)
            );
            if report.collapsed > 0 {
                println!("Removed {} duplicate row(s)", report.collapsed);
            }
        }
        Some(("import", sub)) => super::importer::handle(ctx, sub)?,
        Some(("list", sub)) => {
            let owner = ctx.owner()?;
            let mut assets = ctx.ledger(&owner).assets()?;
            assets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.r#type.cmp(&b.r#type)));
            if !maybe_print_json(sub.get_flag("json"), false, &assets)? {
                let rows = assets
                    .into_iter()
                    .map(|a| {
                        vec![
                            a.name,
                            a.r#type,
                            a.current_value.to_string(),
                            a.cost_basis.to_string(),
                            a.quantity.to_string(),
                            a.id,
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Type", "Value", "Cost basis", "Qty", "Id"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let report = sync::delete(ctx, LedgerTable::Assets, arg(sub, "id")?)?;
            println!("Removed asset {}{}", report.id, sync_note(&report.sync));
        }
        _ => {}
    }
    Ok(())
}
