// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, opt_arg, sync_note};
use crate::context::LedgerContext;
use crate::drafts::TransactionDraft;
use crate::models::LedgerTable;
use crate::sync;
use crate::utils::{maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use serde::Serialize;

pub fn handle(ctx: &LedgerContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            let report = sync::delete(ctx, LedgerTable::Transactions, id)?;
            if report.found {
                println!("Removed transaction {}{}", report.id, sync_note(&report.sync));
            } else {
                println!("No local transaction {}{}", report.id, sync_note(&report.sync));
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(ctx: &LedgerContext, sub: &clap::ArgMatches) -> Result<()> {
    let draft = TransactionDraft {
        id: opt_arg(sub, "id"),
        amount: arg(sub, "amount")?.to_string(),
        kind: arg(sub, "kind")?.to_string(),
        description: arg(sub, "description")?.to_string(),
        category: opt_arg(sub, "category").unwrap_or_default(),
        account: opt_arg(sub, "account").unwrap_or_default(),
        date: arg(sub, "date")?.to_string(),
    };
    let tx = draft.validate(&ctx.owner()?, ctx.now())?;
    let (amount, kind, date, description) =
        (tx.amount, tx.kind, tx.date, tx.description.clone());
    let report = sync::upsert(ctx, tx)?;
    println!(
        "Recorded {} {} on {} '{}' ({}){}",
        kind.as_str(),
        amount,
        date,
        description,
        report.id,
        sync_note(&report.sync)
    );
    Ok(())
}

fn list(ctx: &LedgerContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ctx, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.kind.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.account.clone(),
                    if r.recurring { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Kind", "Description", "Amount", "Category", "Account", "Recurring"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub description: String,
    pub amount: String,
    pub category: String,
    pub account: String,
    pub recurring: bool,
}

/// Newest first, filtered by `--month` and cut at `--limit`.
pub fn query_rows(ctx: &LedgerContext, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let owner = ctx.owner()?;
    let mut txs = ctx.ledger(&owner).transactions()?;
    if let Some(month) = sub.get_one::<String>("month") {
        let month = parse_month(month)?;
        txs.retain(|t| t.date.format("%Y-%m").to_string() == month);
    }
    txs.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }
    Ok(txs
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.as_str().to_string(),
            description: t.description,
            amount: t.amount.to_string(),
            category: t.category,
            account: t.account,
            recurring: t.is_recurring,
        })
        .collect())
}
