/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

// Not every test binary uses every helper.
#![allow(dead_code)]

use path_decomposed_tries::bits::BpVec;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The small hand-checked key set used across the trie tests.
pub fn small_keys() -> Vec<&'static [u8]> {
    vec![
        b"a", b"aa", b"aaa", b"abac", b"bbccd", b"bbcce", b"bbcd", b"bbce", b"ccx", b"cx", b"x",
    ]
}

/// A deterministic sorted, prefix-free set of byte strings over a small
/// alphabet, so that long shared prefixes actually occur.
pub fn corpus(size: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut keys: Vec<Vec<u8>> = (0..size * 2)
        .map(|_| {
            let len = rng.random_range(1..=12);
            (0..len)
                .map(|_| b"abcd"[rng.random_range(0..4)])
                .collect()
        })
        .collect();
    keys.sort();
    keys.dedup();
    // Drop every string that is a prefix of its successor; in sorted
    // order this leaves the set prefix-free.
    let mut prefix_free = Vec::with_capacity(keys.len());
    for i in 0..keys.len() {
        if i + 1 == keys.len() || !keys[i + 1].starts_with(&keys[i]) {
            prefix_free.push(keys[i].clone());
        }
    }
    prefix_free.truncate(size);
    prefix_free
}

/// Checks that a parenthesis vector is balanced and never under-opens.
pub fn check_bp_well_formed<B: AsRef<[usize]>>(bp: &BpVec<B>) {
    let mut excess = 0isize;
    for i in 0..bp.len() {
        excess += if bp.get(i) { 1 } else { -1 };
        assert!(excess >= 0, "under-open at position {i}");
    }
    assert_eq!(excess, 0, "unbalanced parentheses");
}
