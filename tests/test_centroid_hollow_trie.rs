/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod common;

use anyhow::Result;
use common::{check_bp_well_formed, corpus, small_keys};
use epserde::prelude::*;
use path_decomposed_tries::prelude::*;
use tempfile::NamedTempFile;

#[test]
fn test_index() -> Result<()> {
    for keys in [
        small_keys().iter().map(|k| k.to_vec()).collect::<Vec<_>>(),
        corpus(1000, 0),
        corpus(3000, 7),
    ] {
        let trie = CentroidHollowTrie::new(keys.iter())?;
        assert_eq!(trie.len(), keys.len());
        check_bp_well_formed(trie.bp());
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(
                trie.index(key),
                Some(i),
                "key {:?}",
                String::from_utf8_lossy(key)
            );
        }
    }
    Ok(())
}

#[test]
fn test_malformed_input() {
    assert_eq!(
        CentroidHollowTrie::new(["a", "a"]).unwrap_err(),
        Error::DuplicateString
    );
    assert_eq!(
        CentroidHollowTrie::new(["a", "ab"]).unwrap_err(),
        Error::NotPrefixFree
    );
    assert_eq!(
        CentroidHollowTrie::new(["b", "a"]).unwrap_err(),
        Error::NotSorted
    );
}

#[test]
fn test_empty_and_singleton() -> Result<()> {
    let trie = CentroidHollowTrie::new(Vec::<Vec<u8>>::new())?;
    assert!(trie.is_empty());
    assert_eq!(trie.index("anything"), None);

    // A singleton is a single DFUDS leaf: every key maps to rank 0.
    let trie = CentroidHollowTrie::new(["just-one"])?;
    assert_eq!(trie.len(), 1);
    assert_eq!(trie.index("just-one"), Some(0));
    assert_eq!(trie.index("other"), Some(0));
    Ok(())
}

#[test]
fn test_serialization() -> Result<()> {
    let keys = corpus(500, 1);
    let trie = CentroidHollowTrie::new(keys.iter())?;
    let tmp = NamedTempFile::new()?;
    trie.store(tmp.path())?;

    let full: CentroidHollowTrie = CentroidHollowTrie::load_full(tmp.path())?;
    let mapped = CentroidHollowTrie::<GammaVec, Vec<usize>>::mmap(tmp.path(), Flags::empty())?;
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(full.index(key), Some(i));
        assert_eq!(mapped.index(key), Some(i));
    }
    Ok(())
}
