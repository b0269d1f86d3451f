// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::{Duration, NaiveDate};
use common::{OWNER, harness, loan_draft, now, tx_draft};
use ledgersync::drafts::LiabilityDraft;
use ledgersync::models::{Table, Transaction, TxKind};
use ledgersync::recurring::{self, GenerationOutcome, REPAYMENT_CATEGORY};
use ledgersync::sync;
use rust_decimal::Decimal;

fn repayments(h: &common::Harness) -> Vec<Transaction> {
    h.ledger()
        .transactions()
        .unwrap()
        .into_iter()
        .filter(|t| t.category == REPAYMENT_CATEGORY)
        .collect()
}

#[test]
fn liability_saved_twice_in_one_cycle_yields_one_repayment() {
    let h = harness();
    let loan = loan_draft("Car loan", "5000", "15").validate(OWNER, now()).unwrap();
    let first = sync::upsert(&h.ctx, loan.clone()).unwrap();
    assert!(first.generated.is_some());

    let second = sync::upsert(&h.ctx, loan).unwrap();
    assert!(second.generated.is_none());

    let txs = repayments(&h);
    assert_eq!(txs.len(), 1);
    let tx = &txs[0];
    assert_eq!(tx.amount, Decimal::new(5000, 0));
    assert_eq!(tx.kind, TxKind::Expense);
    assert_eq!(tx.description, "Car loan");
    assert_eq!(tx.account, "checking");
    assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    assert!(tx.is_recurring);
    assert_eq!(tx.liability_id.as_deref(), Some(first.id.as_str()));
    assert_eq!(h.remote.rows(Table::Transactions).len(), 1);
}

#[test]
fn editing_the_liability_does_not_duplicate() {
    let h = harness();
    let mut loan = loan_draft("Mortgage", "1800", "1").validate(OWNER, now()).unwrap();
    sync::upsert(&h.ctx, loan.clone()).unwrap();
    loan.current_amount = Decimal::new(198200, 0);
    h.clock.advance(Duration::days(3));
    sync::upsert(&h.ctx, loan).unwrap();
    assert_eq!(repayments(&h).len(), 1);
}

#[test]
fn retrigger_is_idempotent() {
    let h = harness();
    let loan = loan_draft("Car loan", "5000", "15").validate(OWNER, now()).unwrap();
    let id = sync::upsert(&h.ctx, loan).unwrap().id;
    for _ in 0..3 {
        let outcome = recurring::ensure_current_cycle(&h.ctx, &id).unwrap();
        assert!(matches!(outcome, GenerationOutcome::AlreadyRecorded { .. }));
    }
    assert_eq!(repayments(&h).len(), 1);
}

#[test]
fn next_cycle_gets_its_own_repayment() {
    let h = harness();
    let loan = loan_draft("Car loan", "5000", "15").validate(OWNER, now()).unwrap();
    let id = sync::upsert(&h.ctx, loan).unwrap().id;

    h.clock.advance(Duration::days(30));
    let outcome = recurring::ensure_current_cycle(&h.ctx, &id).unwrap();
    match outcome {
        GenerationOutcome::Created { cycle, .. } => {
            assert_eq!(cycle.start, NaiveDate::from_ymd_opt(2025, 4, 15).unwrap());
            assert_eq!(cycle.end, NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        }
        other => panic!("expected a new repayment, got {:?}", other),
    }
    assert_eq!(repayments(&h).len(), 2);
}

#[test]
fn manual_repayment_in_cycle_counts_as_recorded() {
    let h = harness();
    let mut manual = tx_draft("2025-03-16", "5000", "Car loan");
    manual.category = REPAYMENT_CATEGORY.into();
    sync::upsert(&h.ctx, manual.validate(OWNER, now()).unwrap()).unwrap();

    let loan = loan_draft("Car loan", "5000", "15").validate(OWNER, now()).unwrap();
    let report = sync::upsert(&h.ctx, loan).unwrap();
    assert!(report.generated.is_none());
    assert_eq!(repayments(&h).len(), 1);
}

#[test]
fn repayment_from_previous_cycle_does_not_count() {
    let h = harness();
    let mut old = tx_draft("2025-03-14", "5000", "Car loan");
    old.category = REPAYMENT_CATEGORY.into();
    sync::upsert(&h.ctx, old.validate(OWNER, now()).unwrap()).unwrap();

    let loan = loan_draft("Car loan", "5000", "15").validate(OWNER, now()).unwrap();
    assert!(sync::upsert(&h.ctx, loan).unwrap().generated.is_some());
    assert_eq!(repayments(&h).len(), 2);
}

#[test]
fn liability_without_schedule_generates_nothing() {
    let h = harness();
    let card = LiabilityDraft {
        name: "Card".into(),
        r#type: "card".into(),
        principal: "900".into(),
        ..LiabilityDraft::default()
    }
    .validate(OWNER, now())
    .unwrap();
    let id = sync::upsert(&h.ctx, card).unwrap().id;
    assert_eq!(
        recurring::ensure_current_cycle(&h.ctx, &id).unwrap(),
        GenerationOutcome::NotRecurring
    );
    assert!(h.ledger().transactions().unwrap().is_empty());
}

#[test]
fn deleted_repayment_is_regenerated_on_next_trigger() {
    let h = harness();
    let loan = loan_draft("Car loan", "5000", "15").validate(OWNER, now()).unwrap();
    let report = sync::upsert(&h.ctx, loan).unwrap();
    let tx_id = report.generated.unwrap();
    sync::delete(&h.ctx, ledgersync::models::LedgerTable::Transactions, &tx_id).unwrap();

    let outcome = recurring::ensure_current_cycle(&h.ctx, &report.id).unwrap();
    assert!(outcome.created().is_some());
    assert_eq!(repayments(&h).len(), 1);
}
