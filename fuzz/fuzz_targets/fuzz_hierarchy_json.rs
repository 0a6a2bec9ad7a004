// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell
//! Feed arbitrary JSON through indexing and pruning of every entry

#![no_main]

use histprune::filter::first_parent_prune_by_file_list;
use histprune::hierarchy::HierarchyPrune;
use histprune::io::parse_log;
use histprune::types::count_entries;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(log) = parse_log(text) else {
        return;
    };

    let mut filtered = log.clone();
    first_parent_prune_by_file_list(&mut filtered, &["README.md".to_string()]);
    assert!(filtered.len() <= log.len());

    let Ok(mut prune) = HierarchyPrune::new(log) else {
        return;
    };
    let shas: Vec<String> = prune.items().map(|item| item.sha().to_string()).collect();
    for sha in shas {
        match prune.prune_sha(&sha) {
            Ok(_) => {}
            Err(err) => assert!(err.is_repeat(), "unexpected error: {err}"),
        }
        assert_eq!(count_entries(prune.log()), prune.remaining());
    }
    assert!(prune.log().is_empty());
});
