// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, opt_arg, sync_note};
use crate::context::LedgerContext;
use crate::drafts::LiabilityDraft;
use crate::models::LedgerTable;
use crate::sync;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let draft = LiabilityDraft {
                id: opt_arg(sub, "id"),
                name: arg(sub, "name")?.to_string(),
                r#type: arg(sub, "type")?.to_string(),
                principal: arg(sub, "principal")?.to_string(),
                current_amount: opt_arg(sub, "balance"),
                interest_rate: opt_arg(sub, "rate"),
                monthly_payment: opt_arg(sub, "payment"),
                payment_day: opt_arg(sub, "day"),
                payment_account: opt_arg(sub, "account"),
            };
            let liability = draft.validate(&ctx.owner()?, ctx.now())?;
            let name = liability.name.clone();
            let report = sync::upsert(ctx, liability)?;
            println!("Saved liability '{}' ({}){}", name, report.id, sync_note(&report.sync));
            if let Some(tx) = report.generated {
                println!("Recorded this cycle's repayment ({})", tx);
            }
        }
        Some(("list", _)) => {
            let owner = ctx.owner()?;
            let mut liabilities = ctx.ledger(&owner).liabilities()?;
            liabilities.sort_by(|a, b| a.name.cmp(&b.name));
            let rows = liabilities
                .into_iter()
                .map(|l| {
                    vec![
                        l.name,
                        l.r#type,
                        l.principal.to_string(),
                        l.current_amount.to_string(),
                        l.interest_rate.to_string(),
                        l.monthly_payment.map(|p| p.to_string()).unwrap_or_default(),
                        l.payment_day.map(|d| d.to_string()).unwrap_or_default(),
                        l.id,
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Name", "Type", "Principal", "Balance", "Rate", "Payment", "Day", "Id"],
                    rows
                )
            );
        }
        Some(("rm", sub)) => {
            let report = sync::delete(ctx, LedgerTable::Liabilities, arg(sub, "id")?)?;
            println!("Removed liability {}{}", report.id, sync_note(&report.sync));
        }
        _ => {}
    }
    Ok(())
}
