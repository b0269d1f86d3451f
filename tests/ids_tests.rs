// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ledgersync::ids;
use proptest::prelude::*;

proptest! {
    #[test]
    fn coerce_always_yields_valid_id(candidate in ".*") {
        prop_assert!(ids::is_valid(&ids::coerce(&candidate)));
    }

    #[test]
    fn valid_ids_pass_through_coerce(
        a in "[0-9a-f]{8}",
        b in "[0-9a-f]{4}",
        version in "[1-5]",
        c in "[0-9a-f]{3}",
        variant in "[89ab]",
        d in "[0-9a-f]{3}",
        e in "[0-9a-f]{12}",
    ) {
        let id = format!("{a}-{b}-{version}{c}-{variant}{d}-{e}");
        prop_assert!(ids::is_valid(&id));
        prop_assert_eq!(ids::coerce(&id), id);
    }
}

#[test]
fn generated_ids_are_valid_and_distinct() {
    let generated: std::collections::HashSet<String> = (0..500).map(|_| ids::generate()).collect();
    assert_eq!(generated.len(), 500);
    assert!(generated.iter().all(|id| ids::is_valid(id)));
}
