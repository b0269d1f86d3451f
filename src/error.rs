// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::clear::ClearReport;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input that cannot be turned into a valid record. Nothing was written.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("bulk delete incomplete: {}", .0.summary())]
    PartialDeleteFailure(Box<ClearReport>),
    #[error("no authenticated owner: {0}")]
    Auth(String),
    #[error("local store error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<RemoteError> for LedgerError {
    fn from(err: RemoteError) -> Self {
        LedgerError::RemoteUnavailable(err.to_string())
    }
}

/// Failures reported by a remote store implementation.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Unavailable(String),
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed row: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether trying the same request again can succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Unavailable(_) => true,
            RemoteError::Rejected { status, .. } => matches!(status, 408 | 429),
            RemoteError::Decode(_) => false,
        }
    }
}
