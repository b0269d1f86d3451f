// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
    Transfer,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
            TxKind::Transfer => "transfer",
        }
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            "transfer" => Ok(TxKind::Transfer),
            other => Err(LedgerError::validation(
                "kind",
                format!("Invalid kind '{}', expected income, expense or transfer", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub owner_id: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub description: String,
    pub category: String,
    pub account: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub liability_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub current_value: Decimal,
    pub cost_basis: Decimal,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub principal: Decimal,
    pub current_amount: Decimal,
    pub interest_rate: Decimal,
    #[serde(default)]
    pub monthly_payment: Option<Decimal>,
    #[serde(default)]
    pub payment_day: Option<u32>,
    #[serde(default)]
    pub payment_account: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Liability {
    /// Monthly payment and payment day, when both are set and the payment is non-zero.
    pub fn schedule(&self) -> Option<(Decimal, u32)> {
        match (self.monthly_payment, self.payment_day) {
            (Some(payment), Some(day)) if !payment.is_zero() => Some((payment, day)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every table the ledger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Transactions,
    Assets,
    Liabilities,
    Categories,
    Accounts,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Categories,
        Table::Accounts,
        Table::Assets,
        Table::Liabilities,
        Table::Transactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Transactions => "transactions",
            Table::Assets => "assets",
            Table::Liabilities => "liabilities",
            Table::Categories => "categories",
            Table::Accounts => "accounts",
        }
    }

    pub fn as_ledger(&self) -> Option<LedgerTable> {
        match self {
            Table::Transactions => Some(LedgerTable::Transactions),
            Table::Assets => Some(LedgerTable::Assets),
            Table::Liabilities => Some(LedgerTable::Liabilities),
            Table::Categories | Table::Accounts => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LedgerError::validation("table", format!("Unknown table '{}'", s)))
    }
}

/// The ledger tables: the only tables that delete operations accept.
/// Categories and accounts have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerTable {
    Transactions,
    Assets,
    Liabilities,
}

impl LedgerTable {
    pub const ALL: [LedgerTable; 3] = [
        LedgerTable::Transactions,
        LedgerTable::Assets,
        LedgerTable::Liabilities,
    ];

    pub fn table(&self) -> Table {
        match self {
            LedgerTable::Transactions => Table::Transactions,
            LedgerTable::Assets => Table::Assets,
            LedgerTable::Liabilities => Table::Liabilities,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.table().as_str()
    }
}

impl From<LedgerTable> for Table {
    fn from(value: LedgerTable) -> Self {
        value.table()
    }
}

impl fmt::Display for LedgerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted row of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Transaction(Transaction),
    Asset(Asset),
    Liability(Liability),
    Category(Category),
    Account(Account),
}

macro_rules! each_record {
    ($rec:expr, $inner:ident => $body:expr) => {
        match $rec {
            Record::Transaction($inner) => $body,
            Record::Asset($inner) => $body,
            Record::Liability($inner) => $body,
            Record::Category($inner) => $body,
            Record::Account($inner) => $body,
        }
    };
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Transaction(_) => Table::Transactions,
            Record::Asset(_) => Table::Assets,
            Record::Liability(_) => Table::Liabilities,
            Record::Category(_) => Table::Categories,
            Record::Account(_) => Table::Accounts,
        }
    }

    pub fn id(&self) -> &str {
        each_record!(self, r => &r.id)
    }

    pub fn owner_id(&self) -> &str {
        each_record!(self, r => &r.owner_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        each_record!(self, r => r.created_at)
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        each_record!(self, r => r.updated_at)
    }

    pub(crate) fn set_id(&mut self, id: String) {
        each_record!(self, r => r.id = id)
    }

    pub(crate) fn set_owner(&mut self, owner: &str) {
        each_record!(self, r => r.owner_id = owner.to_string())
    }

    pub(crate) fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        each_record!(self, r => {
            r.created_at = created_at;
            r.updated_at = updated_at;
        })
    }

    /// Row shape shared by both stores: the entity's own fields, flat.
    pub fn to_value(&self) -> Result<serde_json::Value, LedgerError> {
        let value = each_record!(self, r => serde_json::to_value(r)?);
        Ok(value)
    }

    pub fn from_value(table: Table, value: serde_json::Value) -> Result<Self, LedgerError> {
        let record = match table {
            Table::Transactions => Record::Transaction(serde_json::from_value(value)?),
            Table::Assets => Record::Asset(serde_json::from_value(value)?),
            Table::Liabilities => Record::Liability(serde_json::from_value(value)?),
            Table::Categories => Record::Category(serde_json::from_value(value)?),
            Table::Accounts => Record::Account(serde_json::from_value(value)?),
        };
        Ok(record)
    }

    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            Record::Transaction(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_asset(self) -> Option<Asset> {
        match self {
            Record::Asset(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_liability(self) -> Option<Liability> {
        match self {
            Record::Liability(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_category(self) -> Option<Category> {
        match self {
            Record::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_account(self) -> Option<Account> {
        match self {
            Record::Account(a) => Some(a),
            _ => None,
        }
    }
}

impl From<Transaction> for Record {
    fn from(value: Transaction) -> Self {
        Record::Transaction(value)
    }
}

impl From<Asset> for Record {
    fn from(value: Asset) -> Self {
        Record::Asset(value)
    }
}

impl From<Liability> for Record {
    fn from(value: Liability) -> Self {
        Record::Liability(value)
    }
}

impl From<Category> for Record {
    fn from(value: Category) -> Self {
        Record::Category(value)
    }
}

impl From<Account> for Record {
    fn from(value: Account) -> Self {
        Record::Account(value)
    }
}
