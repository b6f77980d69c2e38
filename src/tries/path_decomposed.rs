/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bits::{BpBuilder, BpVec};
use crate::pools::{PoolEnumerator, StringPool, VByteStringPool};
use crate::trees::{build_compacted_trie, TreeBuilder};
use crate::utils::prefetch_index;
use crate::Error;
use epserde::Epserde;

/// Label characters at or above this value mark a branching point: the
/// value `BRANCHING_POINT + d - 1` states that `d` off-path children
/// branch off here. Values below are literal path bytes.
const BRANCHING_POINT: u16 = 256;

/// A path-decomposed trie over the byte compacted trie of the keys: a
/// full string dictionary supporting negative lookups and reverse
/// lookups.
///
/// Each node of the DFUDS tree is a whole root-to-leaf path of the
/// compacted trie; the path label (edge bytes interleaved with
/// branching-point markers) lives in the string pool `P`, and the first
/// byte of each off-path edge in the branching-characters array. When
/// `LEX` is false the path continues through the largest child (*centroid*
/// decomposition, logarithmic height, ranks in no particular order); when
/// `LEX` is true it continues through the first child, and ranks are
/// lexicographic.
///
/// Keys are handled internally as NUL-terminated, so the indexed set need
/// not be prefix-free; it must still be strictly sorted.
#[derive(Epserde, Debug, Clone)]
pub struct PathDecomposedTrie<P = VByteStringPool, B = Vec<usize>, C = Vec<u8>, const LEX: bool = false>
{
    bp: BpVec<B>,
    branching_chars: C,
    labels: P,
}

/// Centroid path decomposition: ranks are arbitrary, reverse lookup
/// recovers the key.
pub type CentroidTrie<P = VByteStringPool> = PathDecomposedTrie<P, Vec<usize>, Vec<u8>, false>;

/// Lexicographic path decomposition: ranks are lexicographic ranks.
pub type LexTrie<P = VByteStringPool> = PathDecomposedTrie<P, Vec<usize>, Vec<u8>, true>;

#[derive(Default)]
struct Subtree {
    /// Label characters of the path being decomposed, in reverse of
    /// reading order.
    path_string: Vec<u16>,
    /// Branching bytes of the off-path children, in reverse order.
    path_branches: Vec<u8>,
    bp: BpBuilder,
    branching_chars: Vec<u8>,
    labels: Vec<u16>,
}

impl Subtree {
    fn size(&self) -> usize {
        (self.bp.len() + 1) / 2 + self.path_branches.len()
    }

    /// Closes the pending path and folds this subtree into `dst`.
    fn append_to(mut self, dst: &mut Subtree) {
        if !self.path_string.is_empty() {
            dst.labels.extend(self.path_string.iter().rev());
        } else {
            // An empty path still owns a slot in the pool, and zeros are
            // special-cased anyway.
            dst.labels.push(0);
        }
        debug_assert_eq!(dst.labels.last().copied(), Some(0));

        dst.bp.extend_ones(self.path_branches.len());
        dst.bp.push(false);
        dst.branching_chars
            .extend(self.path_branches.iter().rev());

        dst.bp.append(&mut self.bp);
        dst.branching_chars.extend_from_slice(&self.branching_chars);
        dst.labels.extend_from_slice(&self.labels);
    }
}

#[derive(Default)]
struct PathVisitor<const LEX: bool> {
    root: Option<Subtree>,
}

impl<const LEX: bool> TreeBuilder for PathVisitor<LEX> {
    type Repr = Subtree;

    fn node(
        &mut self,
        mut children: Vec<(u8, Subtree)>,
        buf: &[u8],
        offset: usize,
        skip: usize,
    ) -> Subtree {
        let mut ret = if children.is_empty() {
            Subtree::default()
        } else {
            debug_assert!(children.len() > 1);
            let selected = if LEX {
                0
            } else {
                let mut largest = 0;
                let mut largest_size = 0;
                for (i, (_, subtree)) in children.iter().enumerate() {
                    if i == 0 || subtree.size() > largest_size {
                        largest = i;
                        largest_size = subtree.size();
                    }
                }
                largest
            };

            let n_branches = children.len() - 1;
            let (branching_byte, mut ret) = children.remove(selected);
            ret.path_string.push(u16::from(branching_byte));
            ret.path_string
                .push(BRANCHING_POINT + n_branches as u16 - 1);

            // Append the off-path children; their branching bytes go to
            // the path in reverse order.
            for (byte, subtree) in children {
                ret.path_branches.push(byte);
                subtree.append_to(&mut ret);
            }
            ret
        };

        // The incoming edge, in reverse order.
        for i in (offset..offset + skip).rev() {
            ret.path_string.push(u16::from(buf[i]));
        }
        ret
    }

    fn root(&mut self, tree: Subtree) {
        let mut ret = Subtree::default();
        ret.bp.reserve(tree.bp.len() + tree.path_branches.len() + 2);
        ret.bp.push(true); // synthetic DFUDS root
        tree.append_to(&mut ret);
        debug_assert_eq!(ret.bp.len() % 2, 0);
        self.root = Some(ret);
    }
}

impl<P, const LEX: bool> PathDecomposedTrie<P, Vec<usize>, Vec<u8>, LEX>
where
    P: StringPool + TryFrom<Vec<u16>, Error = Error>,
{
    /// Builds the trie from a sorted sequence of byte strings.
    pub fn new<I>(strings: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut visitor = PathVisitor::<LEX>::default();
        build_compacted_trie(
            &mut visitor,
            strings.into_iter().map(|s| {
                let mut bytes = s.as_ref().to_vec();
                bytes.push(0);
                bytes
            }),
        )?;
        let subtree = visitor.root.unwrap_or_default();
        let bp = subtree.bp.build();
        let labels = P::try_from(subtree.labels)?;
        debug_assert_eq!(labels.len(), bp.len() / 2);
        Ok(Self {
            bp,
            branching_chars: subtree.branching_chars,
            labels,
        })
    }
}

impl<P, B, C, const LEX: bool> PathDecomposedTrie<P, B, C, LEX>
where
    P: StringPool,
    B: AsRef<[usize]>,
    C: AsRef<[u8]>,
{
    /// Returns the rank of `key`, or `None` if `key` is not in the
    /// indexed set.
    pub fn index(&self, key: impl AsRef<[u8]>) -> Option<usize> {
        let key = key.as_ref();
        // The key image is NUL-terminated.
        let len = key.len() + 1;
        let byte_at = |pos: usize| if pos < key.len() { key[pos] } else { 0 };
        if self.bp.is_empty() {
            return None;
        }

        let mut cur_pos = 0;
        let mut cur_node_pos = 1;
        let mut first_child_rank = 0;

        loop {
            let rank0 = cur_node_pos - first_child_rank - 1;
            if cur_pos == len {
                return Some(rank0);
            }

            prefetch_index(self.branching_chars.as_ref(), first_child_rank);
            let mut labels = self.labels.get_string_enumerator(rank0);

            let mut branching_begin = 0;
            let mut branching_count = 0;
            let mut last_branching_point = usize::MAX;
            loop {
                if cur_pos == len {
                    return None;
                }
                let label = labels.next_char();
                if label >= BRANCHING_POINT {
                    branching_begin += branching_count;
                    branching_count = usize::from(label - BRANCHING_POINT) + 1;
                    last_branching_point = cur_pos;
                } else {
                    let c = byte_at(cur_pos);
                    if label != u16::from(c) {
                        // Dead end, unless the mismatch is exactly on a
                        // branching point: then try the branches.
                        if last_branching_point != cur_pos {
                            return None;
                        }
                        break;
                    }
                    cur_pos += 1;
                    if label == 0 {
                        return (cur_pos == len).then_some(rank0);
                    }
                }
            }

            let mut found_child = false;
            for i in branching_begin..branching_begin + branching_count {
                let c = self.branching_chars.as_ref()[first_child_rank + i];
                if byte_at(cur_pos) == c {
                    cur_pos += 1;
                    found_child = true;

                    let child_open = cur_node_pos + i;
                    debug_assert!(child_open < self.bp.successor0(cur_node_pos));
                    cur_node_pos = self.bp.find_close(child_open) + 1;
                    debug_assert_eq!((cur_node_pos - child_open) % 2, 0);
                    first_child_rank += i + (cur_node_pos - child_open) / 2;
                    break;
                }
            }
            if !found_child {
                return None;
            }
        }
    }

    /// Returns the key of rank `index`.
    ///
    /// # Panics
    ///
    /// May panic if `index >= len()`.
    pub fn get(&self, index: usize) -> Vec<u8> {
        let mut ret = Vec::with_capacity(256); // reasonable tradeoff

        let mut rank0 = index;
        let mut cur_node_pos = if index == 0 {
            0
        } else {
            self.bp.select0(index - 1)
        };
        let mut next_opener = if cur_node_pos > 0 {
            self.bp.find_open(cur_node_pos)
        } else {
            0
        };

        // Climb to the root, prepending (reversed) the part of each
        // ancestor's path before the branching point we came from.
        while cur_node_pos > 0 {
            let opener_pos = next_opener;
            rank0 -= (cur_node_pos - opener_pos + 1) / 2;
            debug_assert_eq!(self.bp.select0(rank0), self.bp.successor0(opener_pos));

            let parent_pos = if rank0 > 0 {
                self.bp.predecessor0(opener_pos)
            } else {
                0
            };
            let child_idx = opener_pos - parent_pos - 1;
            cur_node_pos = parent_pos;

            prefetch_index(self.branching_chars.as_ref(), opener_pos - rank0 - 1);
            let mut labels = self.labels.get_string_enumerator(rank0);

            // While the prefetcher is working we can already locate the
            // next node.
            if cur_node_pos > 0 {
                next_opener = self.bp.find_open(cur_node_pos);
            }

            let branching_char = self.branching_chars.as_ref()[opener_pos - rank0 - 1];
            if branching_char != 0 {
                ret.push(branching_char);
            }

            let suffix_start = ret.len();
            let mut branching_begin = 0;
            loop {
                let c = labels.next_char();
                debug_assert!(c != 0);
                if c < BRANCHING_POINT {
                    ret.push(c as u8);
                } else {
                    let branching_chars = usize::from(c - BRANCHING_POINT) + 1;
                    if child_idx < branching_begin + branching_chars {
                        break;
                    }
                    branching_begin += branching_chars;
                }
            }
            ret[suffix_start..].reverse();
        }

        debug_assert_eq!(rank0, 0);
        ret.reverse();

        // Append the tail of the key: the path of the queried node itself,
        // skipping the branching-point markers.
        let mut labels = self.labels.get_string_enumerator(index);
        loop {
            let c = labels.next_char();
            if c == 0 {
                break;
            }
            if c < BRANCHING_POINT {
                ret.push(c as u8);
            }
        }
        ret
    }

    /// Returns the number of indexed strings.
    pub fn len(&self) -> usize {
        self.bp.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.bp.is_empty()
    }

    pub fn bp(&self) -> &BpVec<B> {
        &self.bp
    }

    pub fn branching_chars(&self) -> &C {
        &self.branching_chars
    }

    pub fn labels(&self) -> &P {
        &self.labels
    }
}
