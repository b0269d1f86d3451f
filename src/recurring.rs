// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurring repayment generation for liabilities.
//!
//! A liability with a monthly payment and a payment day gets exactly one
//! repayment transaction per billing cycle. Cycles are anchored on the
//! payment day, clamped to the last day of short months.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::context::LedgerContext;
use crate::error::LedgerError;
use crate::ids;
use crate::models::{Liability, Record, Table, Transaction, TxKind};
use crate::store::Ledger;
use crate::sync;

pub const REPAYMENT_CATEGORY: &str = "repayment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingCycle {
    /// The cycle containing `today` for a payment due on `payment_day`.
    pub fn containing(today: NaiveDate, payment_day: u32) -> BillingCycle {
        let (mut year, mut month) = (today.year(), today.month());
        let mut start = anchor(year, month, payment_day);
        if start > today {
            (year, month) = previous_month(year, month);
            start = anchor(year, month, payment_day);
        }
        let (next_year, next_month) = next_month(year, month);
        let end = anchor(next_year, next_month, payment_day) - Duration::days(1);
        BillingCycle { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}

fn anchor(year: i32, month: u32, payment_day: u32) -> NaiveDate {
    let day = payment_day.clamp(1, last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Created {
        transaction_id: String,
        cycle: BillingCycle,
    },
    AlreadyRecorded {
        transaction_id: String,
        cycle: BillingCycle,
    },
    /// No monthly payment or no payment day.
    NotRecurring,
}

impl GenerationOutcome {
    pub fn created(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Created { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }
}

/// Re-runs the generator for a stored liability. Safe to call repeatedly.
pub fn ensure_current_cycle(
    ctx: &LedgerContext,
    liability_id: &str,
) -> Result<GenerationOutcome, LedgerError> {
    let owner = ctx.owner()?;
    let _turn = ctx.queue().enter(&owner);
    let liability = ctx
        .ledger(&owner)
        .get(Table::Liabilities, liability_id.trim())?
        .and_then(Record::into_liability)
        .ok_or_else(|| {
            LedgerError::validation("liability_id", format!("No liability '{}'", liability_id))
        })?;
    generate_locked(ctx, &owner, &liability)
}

fn matches_cycle(tx: &Transaction, liability: &Liability, cycle: &BillingCycle) -> bool {
    if !cycle.contains(tx.date) {
        return false;
    }
    match &tx.liability_id {
        Some(linked) => linked == &liability.id,
        None => tx.description == liability.name && tx.category == REPAYMENT_CATEGORY,
    }
}

fn find_existing(
    ledger: &Ledger<'_>,
    liability: &Liability,
    cycle: &BillingCycle,
) -> Result<Option<String>, LedgerError> {
    if let Some(id) = ledger.recurring_entry(&liability.id, cycle.start)? {
        if ledger.get(Table::Transactions, &id)?.is_some() {
            return Ok(Some(id));
        }
    }
    Ok(ledger
        .transactions()?
        .into_iter()
        .filter(|tx| matches_cycle(tx, liability, cycle))
        .min_by_key(|tx| tx.created_at)
        .map(|tx| tx.id))
}

/// Generator body for callers already holding the owner's queue turn.
pub(crate) fn generate_locked(
    ctx: &LedgerContext,
    owner: &str,
    liability: &Liability,
) -> Result<GenerationOutcome, LedgerError> {
    let Some((payment, payment_day)) = liability.schedule() else {
        return Ok(GenerationOutcome::NotRecurring);
    };
    let cycle = BillingCycle::containing(ctx.today(), payment_day);
    let ledger = ctx.ledger(owner);

    if let Some(transaction_id) = find_existing(&ledger, liability, &cycle)? {
        debug!(liability = %liability.id, cycle_start = %cycle.start, "repayment already recorded");
        ledger.set_recurring_entry(&liability.id, cycle.start, &transaction_id)?;
        return Ok(GenerationOutcome::AlreadyRecorded {
            transaction_id,
            cycle,
        });
    }

    let now = ctx.now();
    let tx = Transaction {
        id: ids::generate(),
        owner_id: owner.to_string(),
        amount: payment,
        kind: TxKind::Expense,
        description: liability.name.clone(),
        category: REPAYMENT_CATEGORY.to_string(),
        account: liability.payment_account.clone().unwrap_or_default(),
        date: cycle.start,
        created_at: now,
        updated_at: now,
        is_recurring: true,
        liability_id: Some(liability.id.clone()),
    };
    let report = sync::upsert_locked(ctx, owner, tx.into())?;
    ledger.set_recurring_entry(&liability.id, cycle.start, &report.id)?;
    info!(
        liability = %liability.id,
        transaction = %report.id,
        amount = %payment,
        date = %cycle.start,
        "recorded repayment"
    );
    Ok(GenerationOutcome::Created {
        transaction_id: report.id,
        cycle,
    })
}
