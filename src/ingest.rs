// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Asset ingestion keyed on the natural key (owner, name, type).
//!
//! Ingesting an asset that already exists refreshes its values in place
//! instead of adding a row, so retries and repeated imports never
//! multiply holdings.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::context::LedgerContext;
use crate::drafts::AssetDraft;
use crate::error::LedgerError;
use crate::models::{Asset, LedgerTable};
use crate::sync::{self, SyncState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    Inserted,
    /// A row with the same natural key existed and was overwritten.
    DuplicateDetected,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub id: String,
    pub outcome: IngestOutcome,
    /// Surplus rows with the same natural key that were removed.
    pub collapsed: usize,
    pub sync: SyncState,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub collapsed: usize,
    pub pending: usize,
}

fn same_key(existing: &Asset, incoming: &Asset) -> bool {
    existing.name.trim() == incoming.name.trim() && existing.r#type == incoming.r#type
}

pub fn ingest_asset(ctx: &LedgerContext, draft: &AssetDraft) -> Result<IngestReport, LedgerError> {
    let owner = ctx.owner()?;
    let asset = draft.validate(&owner, ctx.now())?;
    let _turn = ctx.queue().enter(&owner);
    ingest_locked(ctx, &owner, asset)
}

fn ingest_locked(
    ctx: &LedgerContext,
    owner: &str,
    asset: Asset,
) -> Result<IngestReport, LedgerError> {
    let mut matches: Vec<Asset> = ctx
        .ledger(owner)
        .assets()?
        .into_iter()
        .filter(|existing| same_key(existing, &asset))
        .collect();

    if matches.is_empty() {
        let report = sync::upsert_locked(ctx, owner, asset.into())?;
        return Ok(IngestReport {
            id: report.id,
            outcome: IngestOutcome::Inserted,
            collapsed: 0,
            sync: report.sync,
        });
    }

    matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    let mut keep = matches.remove(0);
    info!(
        id = %keep.id,
        name = %keep.name,
        asset_type = %keep.r#type,
        extra = matches.len(),
        "duplicate detected, updating existing asset"
    );
    keep.current_value = asset.current_value;
    keep.cost_basis = asset.cost_basis;
    keep.quantity = asset.quantity;
    let report = sync::upsert_locked(ctx, owner, keep.into())?;

    for extra in &matches {
        sync::delete_locked(ctx, owner, LedgerTable::Assets, &extra.id)?;
    }

    Ok(IngestReport {
        id: report.id,
        outcome: IngestOutcome::DuplicateDetected,
        collapsed: matches.len(),
        sync: report.sync,
    })
}

fn field(rec: &StringRecord, idx: usize) -> Option<String> {
    rec.get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Imports `name,type,current_value,cost_basis,quantity` rows.
///
/// Every row is validated before the first one is ingested; a bad row
/// aborts the import with nothing written.
pub fn import_csv(ctx: &LedgerContext, path: &Path) -> Result<ImportSummary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let owner = ctx.owner()?;
    let now = ctx.now();
    let mut assets = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = result.with_context(|| format!("Read CSV line {}", line))?;
        let draft = AssetDraft {
            id: None,
            name: field(&rec, 0).unwrap_or_default(),
            r#type: field(&rec, 1).unwrap_or_default(),
            current_value: field(&rec, 2).unwrap_or_default(),
            cost_basis: field(&rec, 3),
            quantity: field(&rec, 4),
        };
        let asset = draft
            .validate(&owner, now)
            .with_context(|| format!("Invalid asset on line {}", line))?;
        assets.push(asset);
    }

    let _turn = ctx.queue().enter(&owner);
    let mut summary = ImportSummary::default();
    for asset in assets {
        let report = ingest_locked(ctx, &owner, asset)?;
        match report.outcome {
            IngestOutcome::Inserted => summary.inserted += 1,
            IngestOutcome::DuplicateDetected => summary.updated += 1,
        }
        summary.collapsed += report.collapsed;
        if report.sync.is_pending() {
            summary.pending += 1;
        }
    }
    info!(
        path = %path.display(),
        inserted = summary.inserted,
        updated = summary.updated,
        "asset import complete"
    );
    Ok(summary)
}
