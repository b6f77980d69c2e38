/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use path_decomposed_tries::repair::{approximate_repair, Code};

fn decode(codes: &[Code], dict: &[Vec<u16>]) -> Vec<u16> {
    codes
        .iter()
        .flat_map(|&code| dict[code as usize].iter().copied())
        .collect()
}

#[test]
fn test_ab_roundtrip() -> Result<()> {
    // "ab" repeated: the canonical pair-compression input.
    let input: Vec<u16> = std::iter::repeat([b'a' as u16, b'b' as u16])
        .take(1000)
        .flatten()
        .collect();
    let (codes, dict) = approximate_repair(&input, false)?;
    assert_eq!(dict[0], vec![0]);
    assert!(dict.len() >= 3, "no pair rule was formed");
    assert_eq!(decode(&codes, &dict), input);
    Ok(())
}

#[test]
fn test_every_code_expands_to_its_leaves() -> Result<()> {
    let input: Vec<u16> = (0..4000u32).map(|i| (i % 17 + 1) as u16).collect();
    let (codes, dict) = approximate_repair(&input, false)?;
    // Every dictionary word of length above one is the concatenation of
    // expansions of shorter words, so the leaves are single characters.
    for word in &dict {
        assert!(!word.is_empty());
    }
    assert_eq!(decode(&codes, &dict), input);
    Ok(())
}

#[test]
fn test_boundaries_preserved() -> Result<()> {
    let mut input = Vec::new();
    for i in 0..500u16 {
        input.extend_from_slice(&[i % 7 + 1, 3, 4, 5]);
        input.push(0);
    }
    let (codes, dict) = approximate_repair(&input, true)?;
    for word in dict.iter().skip(1) {
        assert!(word.len() == 1 || !word.contains(&0));
    }
    // Decoding per separated string reproduces the input.
    assert_eq!(decode(&codes, &dict), input);
    Ok(())
}
