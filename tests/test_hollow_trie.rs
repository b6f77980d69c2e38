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

fn test_index<S: IntSeq + From<Vec<u64>>>() -> Result<()> {
    for keys in [
        small_keys().iter().map(|k| k.to_vec()).collect::<Vec<_>>(),
        corpus(1000, 0),
    ] {
        let trie = HollowTrie::<S>::new(keys.iter())?;
        assert_eq!(trie.len(), keys.len());
        check_bp_well_formed(trie.bp());
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(trie.index(key), Some(i), "key {:?}", String::from_utf8_lossy(key));
        }
    }
    Ok(())
}

#[test]
fn test_index_gamma() -> Result<()> {
    test_index::<GammaVec>()
}

#[test]
fn test_index_elias_fano() -> Result<()> {
    test_index::<EliasFanoList>()
}

#[test]
fn test_index_fixed() -> Result<()> {
    test_index::<FixedVec>()
}

#[test]
fn test_malformed_input() {
    assert_eq!(
        HollowTrie::<GammaVec>::new(["a", "a"]).unwrap_err(),
        Error::DuplicateString
    );
    assert_eq!(
        HollowTrie::<GammaVec>::new(["a", "ab"]).unwrap_err(),
        Error::NotPrefixFree
    );
    assert_eq!(
        HollowTrie::<GammaVec>::new(["b", "a"]).unwrap_err(),
        Error::NotSorted
    );
}

#[test]
fn test_empty() -> Result<()> {
    let trie = HollowTrie::<GammaVec>::new(Vec::<Vec<u8>>::new())?;
    assert!(trie.is_empty());
    assert_eq!(trie.index("anything"), None);
    Ok(())
}

#[test]
fn test_serialization() -> Result<()> {
    let keys = corpus(500, 1);
    let trie = HollowTrie::<GammaVec>::new(keys.iter())?;
    let tmp = NamedTempFile::new()?;
    trie.store(tmp.path())?;

    let full = <HollowTrie<GammaVec>>::load_full(tmp.path())?;
    let mapped = <HollowTrie<GammaVec>>::mmap(tmp.path(), Flags::empty())?;
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(full.index(key), Some(i));
        assert_eq!(mapped.index(key), Some(i));
    }
    assert_eq!(mapped.len(), keys.len());
    Ok(())
}
