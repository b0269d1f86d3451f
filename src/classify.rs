// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Categories and accounts. Created through the sync engine, read by
//! name, and never touched by ledger deletes.

use crate::context::LedgerContext;
use crate::drafts;
use crate::error::LedgerError;
use crate::sync::{self, WriteReport};

/// Adds a category unless one with the same name exists.
pub fn add_category(ctx: &LedgerContext, name: &str) -> Result<Option<WriteReport>, LedgerError> {
    let owner = ctx.owner()?;
    let category = drafts::category(&owner, name, ctx.now())?;
    let _turn = ctx.queue().enter(&owner);
    let exists = ctx
        .ledger(&owner)
        .categories()?
        .iter()
        .any(|c| c.name.eq_ignore_ascii_case(&category.name));
    if exists {
        return Ok(None);
    }
    sync::upsert_locked(ctx, &owner, category.into()).map(Some)
}

/// Adds an account unless one with the same name exists.
pub fn add_account(
    ctx: &LedgerContext,
    name: &str,
    r#type: &str,
) -> Result<Option<WriteReport>, LedgerError> {
    let owner = ctx.owner()?;
    let account = drafts::account(&owner, name, r#type, ctx.now())?;
    let _turn = ctx.queue().enter(&owner);
    let exists = ctx
        .ledger(&owner)
        .accounts()?
        .iter()
        .any(|a| a.name.eq_ignore_ascii_case(&account.name));
    if exists {
        return Ok(None);
    }
    sync::upsert_locked(ctx, &owner, account.into()).map(Some)
}

pub fn category_names(ctx: &LedgerContext) -> Result<Vec<String>, LedgerError> {
    let owner = ctx.owner()?;
    let mut names: Vec<String> = ctx
        .ledger(&owner)
        .categories()?
        .into_iter()
        .map(|c| c.name)
        .collect();
    names.sort();
    Ok(names)
}

pub fn account_names(ctx: &LedgerContext) -> Result<Vec<String>, LedgerError> {
    let owner = ctx.owner()?;
    let mut names: Vec<String> = ctx
        .ledger(&owner)
        .accounts()?
        .into_iter()
        .map(|a| a.name)
        .collect();
    names.sort();
    Ok(names)
}
