/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod common;

use anyhow::Result;
use common::corpus;
use epserde::prelude::*;
use path_decomposed_tries::prelude::*;
use tempfile::NamedTempFile;

/// Builds the terminated character stream of a set of strings, using
/// characters above 255 as the path-decomposed tries do.
fn char_stream(strings: &[Vec<u16>]) -> Vec<u16> {
    let mut chars = Vec::new();
    for s in strings {
        chars.extend_from_slice(s);
        chars.push(0);
    }
    chars
}

fn pool_strings() -> Vec<Vec<u16>> {
    let mut strings: Vec<Vec<u16>> = corpus(1000, 5)
        .into_iter()
        .map(|key| key.into_iter().map(u16::from).collect())
        .collect();
    // Sprinkle in branching-point-like characters and empty strings.
    for (i, s) in strings.iter_mut().enumerate() {
        if i % 3 == 0 {
            s.push(256 + (i % 200) as u16);
        }
        if i % 97 == 0 {
            s.clear();
        }
    }
    strings
}

#[test]
fn test_vbyte_pool_roundtrip() -> Result<()> {
    let strings = pool_strings();
    let pool = VByteStringPool::new(&char_stream(&strings));
    assert_eq!(pool.len(), strings.len());
    for (i, s) in strings.iter().enumerate() {
        assert_eq!(&pool.get_string(i), s, "i = {i}");
    }
    Ok(())
}

#[test]
fn test_compressed_pool_roundtrip() -> Result<()> {
    let strings = pool_strings();
    let pool = CompressedStringPool::new(&char_stream(&strings))?;
    assert_eq!(pool.len(), strings.len());
    for (i, s) in strings.iter().enumerate() {
        assert_eq!(&pool.get_string(i), s, "i = {i}");
    }
    Ok(())
}

#[test]
fn test_pool_serialization() -> Result<()> {
    let strings = pool_strings();
    let pool = CompressedStringPool::new(&char_stream(&strings))?;
    let tmp = NamedTempFile::new()?;
    pool.store(tmp.path())?;

    let full: CompressedStringPool = CompressedStringPool::load_full(tmp.path())?;
    let mapped = CompressedStringPool::<Vec<u16>, Vec<u8>, path_decomposed_tries::EF>::mmap(
        tmp.path(),
        Flags::empty(),
    )?;
    assert_eq!(full.len(), strings.len());
    assert_eq!(mapped.len(), strings.len());
    for (i, s) in strings.iter().enumerate() {
        assert_eq!(&full.get_string(i), s);
        assert_eq!(&mapped.get_string(i), s);
    }
    Ok(())
}
