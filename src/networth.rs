// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Trailing twelve-month net worth series.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::context::LedgerContext;
use crate::error::LedgerError;
use crate::models::{Asset, Liability};
use crate::recurring::last_day_of_month;

pub const MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    /// `YYYY-MM`
    pub month: String,
    pub value: Decimal,
    /// False when the month predates every asset and liability.
    pub has_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeLabel {
    CurrentTotal,
    YearlyChange,
}

impl fmt::Display for ChangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeLabel::CurrentTotal => "current total",
            ChangeLabel::YearlyChange => "yearly change",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePercent {
    Finite(Decimal),
    /// Growth from a zero starting value.
    Unbounded,
}

impl fmt::Display for ChangePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangePercent::Finite(pct) => write!(f, "{}%", pct.round_dp(2).normalize()),
            ChangePercent::Unbounded => f.write_str("∞"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetWorthChange {
    pub label: ChangeLabel,
    pub value: Decimal,
    pub percent: ChangePercent,
}

/// Twelve points, oldest first, ending at the current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetWorthHistory {
    points: Vec<MonthPoint>,
}

impl NetWorthHistory {
    pub fn points(&self) -> &[MonthPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MonthPoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Decimal {
        self.points.last().map_or(Decimal::ZERO, |p| p.value)
    }

    pub fn summary(&self) -> NetWorthChange {
        summarize(&self.points)
    }
}

impl<'a> IntoIterator for &'a NetWorthHistory {
    type Item = &'a MonthPoint;
    type IntoIter = std::slice::Iter<'a, MonthPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

fn month_offset(today: NaiveDate, back: usize) -> (i32, u32) {
    let index = today.year() * 12 + today.month0() as i32 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn total_at(assets: &[Asset], liabilities: &[Liability], cutoff: Option<NaiveDate>) -> Decimal {
    let included = |created: NaiveDate| cutoff.is_none_or(|end| created <= end);
    let held: Decimal = assets
        .iter()
        .filter(|a| included(a.created_at.date_naive()))
        .map(|a| a.current_value)
        .sum();
    let owed: Decimal = liabilities
        .iter()
        .filter(|l| included(l.created_at.date_naive()))
        .map(|l| l.current_amount)
        .sum();
    held - owed
}

/// Builds the series from record creation dates. Months that end before
/// the earliest record are explicit zeros; the current month counts
/// everything.
pub fn compute(assets: &[Asset], liabilities: &[Liability], today: NaiveDate) -> NetWorthHistory {
    let earliest = assets
        .iter()
        .map(|a| a.created_at.date_naive())
        .chain(liabilities.iter().map(|l| l.created_at.date_naive()))
        .min();

    let points = (0..MONTHS)
        .rev()
        .map(|back| {
            let (year, month) = month_offset(today, back);
            let month_end = NaiveDate::from_ymd_opt(year, month, last_day_of_month(year, month));
            let label = format!("{:04}-{:02}", year, month);
            let (value, has_data) = match earliest {
                None => (Decimal::ZERO, false),
                Some(_) if back == 0 => (total_at(assets, liabilities, None), true),
                Some(first) if month_end.is_some_and(|end| end >= first) => {
                    (total_at(assets, liabilities, month_end), true)
                }
                Some(_) => (Decimal::ZERO, false),
            };
            MonthPoint {
                month: label,
                value,
                has_data,
            }
        })
        .collect();
    NetWorthHistory { points }
}

pub fn history(ctx: &LedgerContext) -> Result<NetWorthHistory, LedgerError> {
    let owner = ctx.owner()?;
    let ledger = ctx.ledger(&owner);
    Ok(compute(&ledger.assets()?, &ledger.liabilities()?, ctx.today()))
}

/// Change from the earliest emitted month, zeros included, to the current
/// one. A series where only the current month has data is a current total.
pub fn summarize(points: &[MonthPoint]) -> NetWorthChange {
    if points.iter().filter(|p| p.has_data).count() <= 1 {
        let latest = points.last().map_or(Decimal::ZERO, |p| p.value);
        return summarize_values(&[latest]);
    }
    let values: Vec<Decimal> = points.iter().map(|p| p.value).collect();
    summarize_values(&values)
}

/// `values` are oldest first.
pub fn summarize_values(values: &[Decimal]) -> NetWorthChange {
    let latest = values.last().copied().unwrap_or(Decimal::ZERO);
    let first = match values {
        [first, _, ..] => *first,
        _ => {
            return NetWorthChange {
                label: ChangeLabel::CurrentTotal,
                value: latest,
                percent: ChangePercent::Finite(Decimal::ZERO),
            };
        }
    };
    let change = latest - first;
    let percent = if first.is_zero() {
        if latest.is_zero() {
            ChangePercent::Finite(Decimal::ZERO)
        } else {
            ChangePercent::Unbounded
        }
    } else {
        ChangePercent::Finite(change / first.abs() * Decimal::ONE_HUNDRED)
    };
    NetWorthChange {
        label: ChangeLabel::YearlyChange,
        value: change,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_offset_crosses_years() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        assert_eq!(month_offset(today, 0), (2025, 2));
        assert_eq!(month_offset(today, 1), (2025, 1));
        assert_eq!(month_offset(today, 2), (2024, 12));
        assert_eq!(month_offset(today, 11), (2024, 3));
    }

    #[test]
    fn percent_display() {
        assert_eq!(ChangePercent::Finite(Decimal::new(400, 0)).to_string(), "400%");
        assert_eq!(ChangePercent::Finite(Decimal::new(12346, 3)).to_string(), "12.35%");
        assert_eq!(ChangePercent::Unbounded.to_string(), "∞");
    }

    #[test]
    fn empty_series_is_current_total_zero() {
        let change = summarize_values(&[]);
        assert_eq!(change.label, ChangeLabel::CurrentTotal);
        assert_eq!(change.value, Decimal::ZERO);
    }
}
