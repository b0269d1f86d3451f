// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::Duration;
use common::{OWNER, harness, now, tx_draft};
use ledgersync::LedgerError;
use ledgersync::{cli, commands::transactions, sync};

fn setup() -> common::Harness {
    let h = harness();
    for (i, date) in ["2025-01-01", "2025-01-02", "2025-01-03", "2025-02-01"]
        .into_iter()
        .enumerate()
    {
        h.clock.advance(Duration::seconds(i as i64 + 1));
        let tx = tx_draft(date, "-10", "P").validate(OWNER, h.ctx.now()).unwrap();
        sync::upsert(&h.ctx, tx).unwrap();
    }
    h
}

fn list_rows(h: &common::Harness, args: &[&str]) -> Vec<transactions::TransactionRow> {
    let mut argv = vec!["ledgersync", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return transactions::query_rows(&h.ctx, list_m).unwrap();
        }
        panic!("no list subcommand");
    }
    panic!("no tx subcommand");
}

#[test]
fn list_limit_respected() {
    let h = setup();
    let rows = list_rows(&h, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-02-01");
    assert_eq!(rows[1].date, "2025-01-03");
}

#[test]
fn list_filters_by_month() {
    let h = setup();
    let rows = list_rows(&h, &["--month", "2025-01"]);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.date.starts_with("2025-01")));
}

#[test]
fn bad_amount_is_a_validation_error() {
    let err = tx_draft("2025-01-01", "ten", "P").validate(OWNER, now()).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "amount", .. }));
    let err = tx_draft("2025-13-01", "10", "P").validate(OWNER, now()).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "date", .. }));
    let mut draft = tx_draft("2025-01-01", "10", "P");
    draft.kind = "gift".into();
    assert!(matches!(
        draft.validate(OWNER, now()).unwrap_err(),
        LedgerError::Validation { field: "kind", .. }
    ));
}
