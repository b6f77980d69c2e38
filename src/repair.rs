/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Approximate Re-Pair grammar compression.
//!
//! Instead of the classic priority-queue algorithm, this variant proceeds
//! in rounds: it counts the frequency of all adjacent code pairs, selects
//! the most frequent ones, materializes their expansions in the
//! dictionary, and rewrites the whole sequence with a greedy left-to-right
//! scan. Rounds repeat until no pair reaches the frequency threshold. The
//! result is not the optimal Re-Pair grammar, but it is close in practice
//! and construction is linear per round.

use dary_heap::QuaternaryHeap;
use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::Error;

/// The type of the codes emitted in the compressed sequence.
pub type Code = u16;

const MAX_RULES_PER_ROUND: usize = 1000;
const MAX_DICT_SIZE: usize = 1 << 16;
const MIN_RULE_FREQUENCY: usize = 16;
const HASH_PRIME: u64 = 2013686449;

/// An adjacent pair of codes, packed in 32 bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct Rule(u32);

/// The empty-cell marker of [`RulesTable`]. There cannot be 65536 rules,
/// so the pair `(0xFFFF, 0xFFFF)` never names a dictionary entry; counter
/// increments for that pair still land on sentinel cells, though, so its
/// frequency is overestimated by reused cells. The rule selection skips
/// the sentinel, which keeps the approximation harmless.
const NULL_RULE: Rule = Rule(u32::MAX);

impl Rule {
    #[inline(always)]
    fn new(left: Code, right: Code) -> Self {
        Rule(u32::from(left) << 16 | u32::from(right))
    }

    #[inline(always)]
    fn left(&self) -> Code {
        (self.0 >> 16) as Code
    }

    #[inline(always)]
    fn right(&self) -> Code {
        (self.0 & 0xFFFF) as Code
    }

    #[inline(always)]
    fn hash(&self) -> u64 {
        u64::from(self.0).wrapping_mul(HASH_PRIME)
    }
}

/// An open-addressing hash table from [`Rule`] to a small copyable value,
/// with linear probing on a power-of-two cell array.
struct RulesTable<V> {
    cells: Vec<(Rule, V)>,
    size: usize,
}

impl<V: Copy + Default> RulesTable<V> {
    fn new() -> Self {
        Self {
            cells: vec![(NULL_RULE, V::default()); 8],
            size: 0,
        }
    }

    fn cell_index(cells: &[(Rule, V)], key: Rule) -> usize {
        let mask = cells.len() - 1;
        let mut h = key.hash() as usize;
        loop {
            let cell = &cells[h & mask];
            if cell.0 == NULL_RULE || cell.0 == key {
                return h & mask;
            }
            h = h.wrapping_add(1);
        }
    }

    fn try_get(&self, key: Rule) -> Option<V> {
        let cell = &self.cells[Self::cell_index(&self.cells, key)];
        (cell.0 != NULL_RULE).then_some(cell.1)
    }

    /// Returns a mutable reference to the value of `key`, inserting the
    /// default if absent.
    fn entry(&mut self, key: Rule) -> &mut V {
        self.rehash();
        let index = Self::cell_index(&self.cells, key);
        if self.cells[index].0 == NULL_RULE {
            self.cells[index].0 = key;
            self.size += 1;
        }
        &mut self.cells[index].1
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut (Rule, V)> {
        self.cells.iter_mut()
    }

    fn rehash(&mut self) {
        if self.cells.len() <= self.size * 2 {
            let new_len = 2 * self.cells.len();
            let old_cells = std::mem::replace(&mut self.cells, vec![(NULL_RULE, V::default()); new_len]);
            for cell in old_cells {
                if cell.0 != NULL_RULE {
                    let index = Self::cell_index(&self.cells, cell.0);
                    self.cells[index] = cell;
                }
            }
        }
    }
}

/// Compresses `input` with approximate Re-Pair.
///
/// Returns the compressed code sequence `C` and the dictionary `D`: the
/// expansion of code `c` is `D[c]`, and `D[0]` is always the
/// single-character string `"\0"`. When `preserve_boundaries` is true no
/// rule spans the reserved separator character `0`, so every code of `C`
/// expands to characters of a single separated string.
///
/// Fails with [`Error::AlphabetTooLarge`] if the number of distinct input
/// characters exceeds the [`Code`] range.
pub fn approximate_repair(
    input: &[u16],
    preserve_boundaries: bool,
) -> Result<(Vec<Code>, Vec<Vec<u16>>), Error> {
    // Map the input onto dense codes, in first-seen order; the separator
    // is pinned to code 0.
    let mut alph_map: BTreeMap<u16, usize> = BTreeMap::new();
    alph_map.insert(0, 1);
    let mut codes = Vec::with_capacity(input.len());
    for &c in input {
        let next_code = alph_map.len() + 1;
        let code = *alph_map.entry(c).or_insert(next_code);
        if code - 1 > Code::MAX as usize {
            return Err(Error::AlphabetTooLarge);
        }
        codes.push((code - 1) as Code);
    }

    let mut dict: Vec<Vec<u16>> = vec![Vec::new(); alph_map.len()];
    for (&c, &code) in &alph_map {
        dict[code - 1] = vec![c];
    }

    let mut lengths: Vec<usize> = vec![1; dict.len()];
    let mut dict_size = dict.len();
    let mut counts: RulesTable<usize> = RulesTable::new();
    let mut cur_len = codes.len();
    let mut round = 0usize;

    loop {
        // Count adjacent pairs, ignoring the ones whose expansion would
        // not fit in the dictionary anyway.
        for (&left, &right) in codes[..cur_len].iter().tuple_windows() {
            if dict_size + lengths[left as usize] + lengths[right as usize] <= MAX_DICT_SIZE
                && (!preserve_boundaries || (left != 0 && right != 0))
            {
                *counts.entry(Rule::new(left, right)) += 1;
            }
        }

        // Select the most frequent pairs above the threshold, resetting
        // the counters for the next round.
        let mut new_rules: QuaternaryHeap<Reverse<(usize, Rule)>> =
            QuaternaryHeap::with_capacity(MAX_RULES_PER_ROUND + 1);
        for cell in counts.iter_mut() {
            if cell.0 == NULL_RULE {
                continue;
            }
            if cell.1 >= MIN_RULE_FREQUENCY {
                if new_rules.len() < MAX_RULES_PER_ROUND {
                    new_rules.push(Reverse((cell.1, cell.0)));
                } else if cell.1 > new_rules.peek().unwrap().0 .0 {
                    new_rules.pop();
                    new_rules.push(Reverse((cell.1, cell.0)));
                }
            }
            cell.1 = 0;
        }

        if new_rules.is_empty() {
            break;
        }

        // Materialize the selected rules that still fit, most frequent
        // first.
        let mut replacements: RulesTable<Code> = RulesTable::new();
        let mut added = 0usize;
        for Reverse((_, rule)) in new_rules.into_sorted_vec() {
            if dict_size + lengths[rule.left() as usize] + lengths[rule.right() as usize]
                > MAX_DICT_SIZE
            {
                continue;
            }
            let mut word = dict[rule.left() as usize].clone();
            word.extend_from_slice(&dict[rule.right() as usize]);
            *replacements.entry(rule) = dict.len() as Code;
            lengths.push(word.len());
            dict_size += word.len();
            dict.push(word);
            added += 1;
        }

        // Greedy left-to-right replacement, compacting in place.
        let mut to_i = 0;
        let mut from_i = 0;
        while from_i < cur_len {
            if from_i + 2 <= cur_len {
                if let Some(new_code) =
                    replacements.try_get(Rule::new(codes[from_i], codes[from_i + 1]))
                {
                    codes[to_i] = new_code;
                    to_i += 1;
                    from_i += 2;
                    continue;
                }
            }
            codes[to_i] = codes[from_i];
            to_i += 1;
            from_i += 1;
        }

        round += 1;
        log::debug!(
            "re-pair round {}: {} rules, {} dictionary chars, sequence {} -> {}",
            round,
            added,
            dict_size,
            cur_len,
            to_i
        );
        cur_len = to_i;
    }

    codes.truncate(cur_len);
    Ok((codes, dict))
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(codes: &[Code], dict: &[Vec<u16>]) -> Vec<u16> {
        codes
            .iter()
            .flat_map(|&c| dict[c as usize].iter().copied())
            .collect()
    }

    #[test]
    fn test_roundtrip() {
        let input: Vec<u16> = b"abababab"
            .iter()
            .cycle()
            .take(8 * 1000)
            .map(|&b| u16::from(b))
            .collect();
        let (codes, dict) = approximate_repair(&input, false).unwrap();
        assert_eq!(dict[0], vec![0]);
        assert!(dict.len() >= 3, "no pair rule was formed");
        assert!(codes.len() < input.len() / 2);
        assert_eq!(decode(&codes, &dict), input);
    }

    #[test]
    fn test_preserve_boundaries() {
        let mut input = Vec::new();
        for _ in 0..200 {
            input.extend_from_slice(&[1u16, 2, 3, 0]);
        }
        let (codes, dict) = approximate_repair(&input, true).unwrap();
        for word in &dict[1..] {
            assert!(
                word.len() == 1 || !word.contains(&0),
                "a rule spans the separator: {word:?}"
            );
        }
        assert_eq!(decode(&codes, &dict), input);
    }

    #[test]
    fn test_incompressible() {
        let input: Vec<u16> = (0..100u16).collect();
        let (codes, dict) = approximate_repair(&input, false).unwrap();
        assert_eq!(codes.len(), input.len());
        assert_eq!(decode(&codes, &dict), input);
    }

    #[test]
    fn test_empty() {
        let (codes, dict) = approximate_repair(&[], false).unwrap();
        assert!(codes.is_empty());
        assert_eq!(dict, vec![vec![0]]);
    }
}
