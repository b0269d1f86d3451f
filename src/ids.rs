// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Entity identifiers.
//!
//! Every row written by the ledger carries a hyphenated RFC 4122 UUID with
//! a version nibble in `1..=5` and a variant nibble in `8..=b`. Callers may
//! hand us anything; `coerce` is the gate that keeps malformed ids out of
//! both stores.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid pattern compiles")
});

/// New random (v4) identifier.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

pub fn is_valid(candidate: &str) -> bool {
    UUID_RE.is_match(candidate)
}

/// Returns `candidate` untouched when it is a valid id, otherwise a fresh one.
pub fn coerce(candidate: &str) -> String {
    if is_valid(candidate) {
        candidate.to_string()
    } else {
        generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_versions_one_through_five() {
        for version in ['1', '2', '3', '4', '5'] {
            let id = format!("0f8fad5b-d9cb-{}69f-a165-70867728950e", version);
            assert!(is_valid(&id), "{id}");
        }
        assert!(!is_valid("0f8fad5b-d9cb-669f-a165-70867728950e"));
        assert!(!is_valid("0f8fad5b-d9cb-069f-a165-70867728950e"));
    }

    #[test]
    fn rejects_bad_variant_and_shape() {
        assert!(!is_valid("0f8fad5b-d9cb-469f-c165-70867728950e"));
        assert!(!is_valid("0f8fad5bd9cb469fa16570867728950e"));
        assert!(!is_valid(""));
        assert!(!is_valid(" 0f8fad5b-d9cb-469f-a165-70867728950e"));
        assert!(is_valid("0F8FAD5B-D9CB-469F-A165-70867728950E"));
    }

    #[test]
    fn coerce_keeps_valid_ids() {
        let id = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        assert_eq!(coerce(id), id);
        let replaced = coerce("tx-1");
        assert_ne!(replaced, "tx-1");
        assert!(is_valid(&replaced));
    }
}
