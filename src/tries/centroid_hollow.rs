/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bits::{get_bit, BpBuilder, BpVec};
use crate::ints::{GammaVec, IntSeq};
use crate::trees::{build_patricia, BinaryTreeBuilder};
use crate::Error;
use epserde::Epserde;

/// A hollow trie laid out by centroid path decomposition.
///
/// Each DFUDS node collects a whole centroid path of the Patricia trie;
/// its entry in the skip sequence is `(skip << 1) | direction`, where
/// `direction` is the bit continuing the path. Centroid decomposition
/// bounds the number of visited nodes by the logarithm of the trie size,
/// at the price of consuming skips through a forward enumerator instead of
/// one random access per node.
///
/// Like [`HollowTrie`](crate::tries::HollowTrie), this is a monotone
/// minimal perfect hash function: [`index`](Self::index) is only
/// meaningful for strings of the indexed set.
#[derive(Epserde, Debug, Clone)]
pub struct CentroidHollowTrie<G = GammaVec, B = Vec<usize>> {
    bp: BpVec<B>,
    skips: G,
}

#[derive(Default)]
struct Subtree {
    /// Entries of the centroid path this subtree continues, deepest first.
    centroid_path_skips: Vec<u64>,
    bp: BpBuilder,
    skips: Vec<u64>,
}

impl Subtree {
    /// Virtual size driving the centroid choice: emitted bits plus the
    /// pending centroid entries plus the node itself.
    fn size(&self) -> usize {
        self.bp.len() + self.centroid_path_skips.len() + 1
    }

    /// Folds this subtree into `dst`. When `close_path` is set the pending
    /// centroid path is closed: its entries are emitted in reverse (so
    /// the skip stream reads top-down) as a DFUDS node of that degree.
    fn append_to(mut self, close_path: bool, dst: &mut Subtree) {
        if close_path {
            dst.skips.extend(self.centroid_path_skips.iter().rev());
            dst.bp.extend_ones(self.centroid_path_skips.len());
            dst.bp.push(false);
        }
        dst.bp.append(&mut self.bp);
        dst.skips.append(&mut self.skips);
    }
}

#[derive(Default)]
struct CentroidVisitor {
    root: Option<Subtree>,
}

impl BinaryTreeBuilder for CentroidVisitor {
    type Repr = Subtree;

    fn leaf(&mut self, _buf: &[u8], _offset: usize, _skip: usize) -> Subtree {
        Subtree::default()
    }

    fn node(
        &mut self,
        mut left: Subtree,
        mut right: Subtree,
        _buf: &[u8],
        _offset: usize,
        skip: usize,
    ) -> Subtree {
        let mut ret = Subtree::default();
        let centroid_direction = if left.size() >= right.size() {
            ret.centroid_path_skips = std::mem::take(&mut left.centroid_path_skips);
            false
        } else {
            ret.centroid_path_skips = std::mem::take(&mut right.centroid_path_skips);
            true
        };
        ret.centroid_path_skips
            .push((skip as u64) << 1 | u64::from(centroid_direction));

        let closing = left.centroid_path_skips.len() + right.centroid_path_skips.len();
        ret.bp.reserve(left.bp.len() + right.bp.len() + closing + 1);
        left.append_to(centroid_direction, &mut ret);
        right.append_to(!centroid_direction, &mut ret);
        ret
    }

    fn root(&mut self, tree: Subtree) {
        let mut ret = Subtree::default();
        ret.bp
            .reserve(tree.bp.len() + tree.centroid_path_skips.len() + 2);
        ret.bp.push(true); // synthetic DFUDS root
        tree.append_to(true, &mut ret);
        debug_assert_eq!(ret.bp.len() % 2, 0);
        self.root = Some(ret);
    }
}

impl CentroidHollowTrie {
    /// Builds the trie from a sorted, prefix-free sequence of byte
    /// strings.
    pub fn new<I>(strings: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut visitor = CentroidVisitor::default();
        build_patricia(&mut visitor, strings)?;
        let subtree = visitor.root.unwrap_or_default();
        Ok(Self {
            bp: subtree.bp.build(),
            skips: GammaVec::from(subtree.skips),
        })
    }
}

impl<G: IntSeq, B: AsRef<[usize]>> CentroidHollowTrie<G, B> {
    /// Returns the rank of `key`, or `None` if the traversal falls off the
    /// key. Only meaningful for strings of the indexed set.
    pub fn index(&self, key: impl AsRef<[u8]>) -> Option<usize> {
        let key = key.as_ref();
        let bit_len = key.len() * 8;
        if self.bp.is_empty() {
            return None;
        }

        let mut cur_pos = 0;
        let mut cur_node_pos = 1;
        let mut right_ancestors = 0;
        let mut first_child_rank = 0;

        loop {
            let node_end = self.bp.successor0(cur_node_pos);
            let node_deg = node_end - cur_node_pos;

            // How many times the key has agreed with the centroid
            // direction at this node, per direction.
            let mut taken_directions = [0usize; 2];
            let mut descended = false;

            let mut skips = self.skips.enumerator_from(first_child_rank);
            for _ in 0..node_deg {
                let skip_bit = skips.next().unwrap();
                cur_pos += (skip_bit >> 1) as usize;
                let direction = skip_bit & 1 != 0;

                if cur_pos >= bit_len {
                    return None;
                }
                let bit = get_bit(key, cur_pos);
                cur_pos += 1;

                if bit != direction {
                    // Leave the centroid path for the subtrie hanging off
                    // this step.
                    let child = if !bit {
                        right_ancestors += 1;
                        taken_directions[1]
                    } else {
                        node_deg - taken_directions[0] - 1
                    };
                    debug_assert!(child < node_deg);
                    let child_open = node_end - child - 1;
                    cur_node_pos = self.bp.find_close(child_open) + 1;
                    debug_assert_eq!((cur_node_pos - child_open) % 2, 0);
                    first_child_rank += (node_deg - child - 1) + (cur_node_pos - child_open) / 2;
                    descended = true;
                    break;
                }
                taken_directions[usize::from(direction)] += 1;
            }

            if !descended {
                // The key agreed with the whole centroid path: its rank is
                // the zeros up to here, corrected by the leaves hanging
                // left of the path and the right turns taken above.
                let rank0 = cur_node_pos - first_child_rank - 1;
                return Some(if node_deg != 0 {
                    debug_assert!(taken_directions[0] != 0);
                    let first_right_subtrie = node_end - taken_directions[1] - 1;
                    let left_leaves =
                        (self.bp.find_close(first_right_subtrie) - first_right_subtrie) / 2;
                    rank0 + left_leaves - right_ancestors
                } else {
                    rank0 - right_ancestors
                });
            }
        }
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

    pub fn skips(&self) -> &G {
        &self.skips
    }
}
