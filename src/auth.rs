// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::ids;

pub trait AuthProvider: Send + Sync {
    fn current_owner(&self) -> Result<String, LedgerError>;
}

/// Owner fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct StaticOwner {
    owner_id: String,
}

impl StaticOwner {
    pub fn new(owner_id: &str) -> Result<Self, LedgerError> {
        let owner_id = owner_id.trim();
        if !ids::is_valid(owner_id) {
            return Err(LedgerError::Auth(format!(
                "owner id '{}' is not a valid UUID",
                owner_id
            )));
        }
        Ok(StaticOwner {
            owner_id: owner_id.to_ascii_lowercase(),
        })
    }
}

impl AuthProvider for StaticOwner {
    fn current_owner(&self) -> Result<String, LedgerError> {
        Ok(self.owner_id.clone())
    }
}
