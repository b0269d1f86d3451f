// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn id_arg() -> Arg {
    opt("id", "Record id (UUID); a malformed id is replaced")
}

pub fn build_cli() -> Command {
    Command::new("ledgersync")
        .version(crate_version!())
        .about("Local-first personal ledger with remote reconciliation")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show").about("Print effective settings"))
                .subcommand(
                    Command::new("set")
                        .about("Store a setting")
                        .arg(req("key", "Setting name"))
                        .arg(req("value", "Setting value")),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Account name"))
                        .arg(req("type", "Account type, e.g. bank or card")),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(Command::new("add").arg(req("name", "Category name")))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(req("date", "YYYY-MM-DD"))
                        .arg(
                            req("amount", "Decimal amount")
                                .allow_hyphen_values(true),
                        )
                        .arg(req("kind", "income, expense or transfer"))
                        .arg(req("description", "What the money was for"))
                        .arg(opt("category", "Category name"))
                        .arg(opt("account", "Account name"))
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("month", "YYYY-MM"))
                        .arg(opt("limit", "Max rows").value_parser(value_parser!(usize)))
                        .arg(flag("json", "Pretty JSON output"))
                        .arg(flag("jsonl", "One JSON object per line")),
                )
                .subcommand(Command::new("rm").arg(req("id", "Transaction id"))),
        )
        .subcommand(
            Command::new("asset")
                .about("Track assets")
                .subcommand(
                    Command::new("ingest")
                        .about("Insert, or update the asset with the same name and type")
                        .arg(req("name", "Asset name"))
                        .arg(req("type", "Asset type, e.g. bank or stock"))
                        .arg(req("value", "Current value"))
                        .arg(opt("cost-basis", "Cost basis, defaults to the value"))
                        .arg(opt("quantity", "Units held, defaults to 1"))
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("import")
                        .about("Import name,type,current_value,cost_basis,quantity rows")
                        .arg(req("path", "CSV file")),
                )
                .subcommand(Command::new("list").arg(flag("json", "JSON output")))
                .subcommand(Command::new("rm").arg(req("id", "Asset id"))),
        )
        .subcommand(
            Command::new("liability")
                .about("Track liabilities and their monthly repayments")
                .subcommand(
                    Command::new("add")
                        .about("Add a liability, or update it when --id names an existing one")
                        .arg(req("name", "Liability name"))
                        .arg(req("type", "Liability type, e.g. loan or card"))
                        .arg(req("principal", "Original principal"))
                        .arg(opt("balance", "Outstanding amount, defaults to the principal"))
                        .arg(opt("rate", "Interest rate"))
                        .arg(opt("payment", "Monthly payment"))
                        .arg(opt("day", "Payment day of month (1-31)"))
                        .arg(opt("account", "Account the payment comes from"))
                        .arg(id_arg()),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(req("id", "Liability id"))),
        )
        .subcommand(
            Command::new("clear-all")
                .about("Delete all transactions, assets and liabilities")
                .arg(flag("json", "Print the per-table report as JSON")),
        )
        .subcommand(
            Command::new("sync")
                .about("Reconcile with the remote store")
                .subcommand(Command::new("run").about("Push pending writes, then pull"))
                .subcommand(Command::new("status").about("List pending operations")),
        )
        .subcommand(
            Command::new("networth")
                .about("Trailing twelve-month net worth")
                .arg(flag("json", "JSON output")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn negative_amounts_parse() {
        let m = build_cli().get_matches_from([
            "ledgersync", "tx", "add", "--date", "2025-01-02", "--amount", "-12.50", "--kind",
            "expense", "--description", "Coffee",
        ]);
        let (_, tx) = m.subcommand().unwrap();
        let (_, add) = tx.subcommand().unwrap();
        assert_eq!(add.get_one::<String>("amount").unwrap(), "-12.50");
    }
}
