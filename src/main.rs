// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use ledgersync::auth::StaticOwner;
use ledgersync::config::SyncConfig;
use ledgersync::context::LedgerContext;
use ledgersync::remote::{HttpRemote, RemoteStore, SqliteRemote};
use ledgersync::store::SqliteStore;
use ledgersync::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let mut cfg = SyncConfig::load(&conn)?;
            let owner = cfg.ensure_owner(&conn)?;
            println!("Database initialized at {}", db::db_path()?.display());
            println!("Owner {}", owner);
            return Ok(());
        }
        Some(("config", sub)) => return commands::config::handle(&conn, sub),
        Some(_) => {}
        None => {
            cli::build_cli().print_help()?;
            println!();
            return Ok(());
        }
    }

    let mut cfg = SyncConfig::load(&conn)?;
    let owner = cfg.ensure_owner(&conn)?;
    let remote: Arc<dyn RemoteStore> = match &cfg.remote_url {
        Some(url) => Arc::new(HttpRemote::new(url, cfg.api_key.clone())?),
        None => Arc::new(SqliteRemote::open(&db::remote_db_path()?)?),
    };
    debug!(owner = %owner, remote = cfg.remote_url.as_deref().unwrap_or("file"), "session");
    let local = Arc::new(SqliteStore::new(db::open_or_init()?)?);
    let ctx = LedgerContext::new(local, remote, Arc::new(StaticOwner::new(&owner)?), cfg);

    match matches.subcommand() {
        Some(("account", sub)) => commands::accounts::handle(&ctx, sub)?,
        Some(("category", sub)) => commands::categories::handle(&ctx, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ctx, sub)?,
        Some(("asset", sub)) => commands::assets::handle(&ctx, sub)?,
        Some(("liability", sub)) => commands::liabilities::handle(&ctx, sub)?,
        Some(("clear-all", sub)) => commands::clear::handle(&ctx, sub)?,
        Some(("sync", sub)) => commands::sync::handle(&ctx, sub)?,
        Some(("networth", sub)) => commands::networth::handle(&ctx, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
