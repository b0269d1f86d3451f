// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod classify;
pub mod clear;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod db;
pub mod drafts;
pub mod error;
pub mod ids;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod networth;
pub mod queue;
pub mod recurring;
pub mod remote;
pub mod retry;
pub mod store;
pub mod sync;
pub mod utils;

pub use context::LedgerContext;
pub use error::LedgerError;
