// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Raw user input and its validation into typed records.
//!
//! Drafts hold exactly what a form or CLI flag produced. `validate` either
//! yields a record ready for the sync engine or a `LedgerError::Validation`
//! naming the offending field; no store is touched on failure.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::ids;
use crate::models::{Account, Asset, Category, Liability, Transaction, TxKind};

fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, LedgerError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(field, format!("Invalid decimal '{}'", trimmed)))
}

fn parse_optional_amount(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<Decimal>, LedgerError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_amount(field, s).map(Some),
        None => Ok(None),
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::validation(
            field,
            format!("{} must not be negative", value),
        ));
    }
    Ok(value)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(
            "date",
            format!("Invalid date '{}', expected YYYY-MM-DD", trimmed),
        )
    })
}

fn required(field: &'static str, raw: &str) -> Result<String, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn draft_id(raw: Option<&str>) -> String {
    raw.map(ids::coerce).unwrap_or_else(ids::generate)
}

#[derive(Debug, Clone, Default)]
pub struct TransactionDraft {
    pub id: Option<String>,
    pub amount: String,
    pub kind: String,
    pub description: String,
    pub category: String,
    pub account: String,
    pub date: String,
}

impl TransactionDraft {
    pub fn validate(&self, owner: &str, now: DateTime<Utc>) -> Result<Transaction, LedgerError> {
        let amount = parse_amount("amount", &self.amount)?;
        let kind: TxKind = self.kind.parse()?;
        let date = parse_date(&self.date)?;
        Ok(Transaction {
            id: draft_id(self.id.as_deref()),
            owner_id: owner.to_string(),
            amount,
            kind,
            description: required("description", &self.description)?,
            category: self.category.trim().to_string(),
            account: self.account.trim().to_string(),
            date,
            created_at: now,
            updated_at: now,
            is_recurring: false,
            liability_id: None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetDraft {
    pub id: Option<String>,
    pub name: String,
    pub r#type: String,
    pub current_value: String,
    /// Defaults to the current value.
    pub cost_basis: Option<String>,
    /// Defaults to one unit.
    pub quantity: Option<String>,
}

impl AssetDraft {
    pub fn validate(&self, owner: &str, now: DateTime<Utc>) -> Result<Asset, LedgerError> {
        let current_value = parse_amount("current_value", &self.current_value)?;
        let cost_basis =
            parse_optional_amount("cost_basis", self.cost_basis.as_deref())?.unwrap_or(current_value);
        let quantity = parse_optional_amount("quantity", self.quantity.as_deref())?
            .unwrap_or(Decimal::ONE);
        Ok(Asset {
            id: draft_id(self.id.as_deref()),
            owner_id: owner.to_string(),
            name: required("name", &self.name)?,
            r#type: required("type", &self.r#type)?,
            current_value,
            cost_basis,
            quantity: non_negative("quantity", quantity)?,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiabilityDraft {
    pub id: Option<String>,
    pub name: String,
    pub r#type: String,
    pub principal: String,
    /// Outstanding balance; defaults to the principal.
    pub current_amount: Option<String>,
    pub interest_rate: Option<String>,
    pub monthly_payment: Option<String>,
    pub payment_day: Option<String>,
    pub payment_account: Option<String>,
}

impl LiabilityDraft {
    pub fn validate(&self, owner: &str, now: DateTime<Utc>) -> Result<Liability, LedgerError> {
        let principal = parse_amount("principal", &self.principal)?;
        let current_amount =
            parse_optional_amount("current_amount", self.current_amount.as_deref())?
                .unwrap_or(principal);
        let interest_rate = parse_optional_amount("interest_rate", self.interest_rate.as_deref())?
            .unwrap_or(Decimal::ZERO);
        let monthly_payment =
            parse_optional_amount("monthly_payment", self.monthly_payment.as_deref())?
                .map(|p| non_negative("monthly_payment", p))
                .transpose()?;
        let payment_day = match self.payment_day.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw) => Some(parse_payment_day(raw)?),
        };
        Ok(Liability {
            id: draft_id(self.id.as_deref()),
            owner_id: owner.to_string(),
            name: required("name", &self.name)?,
            r#type: required("type", &self.r#type)?,
            principal,
            current_amount,
            interest_rate: non_negative("interest_rate", interest_rate)?,
            monthly_payment,
            payment_day,
            payment_account: self
                .payment_account
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }
}

pub fn parse_payment_day(raw: &str) -> Result<u32, LedgerError> {
    let day: u32 = raw.trim().parse().map_err(|_| {
        LedgerError::validation("payment_day", format!("Invalid payment day '{}'", raw.trim()))
    })?;
    if !(1..=31).contains(&day) {
        return Err(LedgerError::validation(
            "payment_day",
            format!("Payment day {} is outside 1-31", day),
        ));
    }
    Ok(day)
}

pub fn category(owner: &str, name: &str, now: DateTime<Utc>) -> Result<Category, LedgerError> {
    Ok(Category {
        id: ids::generate(),
        owner_id: owner.to_string(),
        name: required("name", name)?,
        created_at: now,
        updated_at: now,
    })
}

pub fn account(
    owner: &str,
    name: &str,
    r#type: &str,
    now: DateTime<Utc>,
) -> Result<Account, LedgerError> {
    Ok(Account {
        id: ids::generate(),
        owner_id: owner.to_string(),
        name: required("name", name)?,
        r#type: required("type", r#type)?,
        created_at: now,
        updated_at: now,
    })
}
