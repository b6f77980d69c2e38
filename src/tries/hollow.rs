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

/// A hollow trie: the topology of a binary Patricia trie in DFUDS order
/// plus one skip per internal node, and nothing else.
///
/// The choice of the skip representation `S` is a compile-time knob:
/// γ codes ([`GammaVec`], the default), Elias-Fano gaps
/// ([`EliasFanoList`](crate::ints::EliasFanoList)) or fixed width
/// ([`FixedVec`](crate::ints::FixedVec)).
///
/// A hollow trie is a *monotone minimal perfect hash function*, not a full
/// dictionary: [`index`](Self::index) maps every string of the indexed set
/// to its rank, but a string outside the set may map to `None` or to the
/// rank of some stored string. Callers needing exactness must verify the
/// result against the original key.
#[derive(Epserde, Debug, Clone)]
pub struct HollowTrie<S = GammaVec, B = Vec<usize>> {
    bp: BpVec<B>,
    skips: S,
}

#[derive(Default)]
struct Subtree {
    bp: BpBuilder,
    skips: Vec<u64>,
}

#[derive(Default)]
struct HollowVisitor {
    root: Option<Subtree>,
}

impl BinaryTreeBuilder for HollowVisitor {
    type Repr = Subtree;

    fn leaf(&mut self, _buf: &[u8], _offset: usize, _skip: usize) -> Subtree {
        let mut ret = Subtree::default();
        ret.bp.push(false);
        ret
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
        ret.bp.reserve(left.bp.len() + right.bp.len() + 1);
        ret.bp.push(true);
        ret.skips.push(skip as u64);
        ret.bp.append(&mut left.bp);
        ret.skips.append(&mut left.skips);
        ret.bp.append(&mut right.bp);
        ret.skips.append(&mut right.skips);
        debug_assert_eq!(ret.bp.len(), 2 * ret.skips.len() + 1);
        ret
    }

    fn root(&mut self, mut tree: Subtree) {
        let mut bp = BpBuilder::with_capacity(tree.bp.len() + 1);
        bp.push(true); // synthetic DFUDS root
        bp.append(&mut tree.bp);
        debug_assert_eq!(bp.len() % 2, 0);
        self.root = Some(Subtree {
            bp,
            skips: tree.skips,
        });
    }
}

impl<S: IntSeq + From<Vec<u64>>> HollowTrie<S> {
    /// Builds the trie from a sorted, prefix-free sequence of byte
    /// strings.
    pub fn new<I>(strings: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut visitor = HollowVisitor::default();
        build_patricia(&mut visitor, strings)?;
        let subtree = visitor.root.unwrap_or_default();
        Ok(Self {
            bp: subtree.bp.build(),
            skips: S::from(subtree.skips),
        })
    }
}

impl<S: IntSeq, B: AsRef<[usize]>> HollowTrie<S, B> {
    /// Returns the rank of `key`, or `None` if the traversal falls off the
    /// key.
    ///
    /// For keys outside the indexed set the result is meaningless (it may
    /// be the rank of any stored string): see the type documentation.
    pub fn index(&self, key: impl AsRef<[u8]>) -> Option<usize> {
        let key = key.as_ref();
        let bit_len = key.len() * 8;
        if self.bp.is_empty() {
            return None;
        }
        let mut cur_pos = 0;
        let mut cur_node = 1;
        let mut rank = 0;
        loop {
            if !self.bp.get(cur_node) {
                return Some(rank);
            }
            cur_pos += self.skips.get(cur_node - rank - 1) as usize;
            if cur_pos >= bit_len {
                return None;
            }
            let bit = get_bit(key, cur_pos);
            cur_pos += 1;
            if bit {
                let next_node = self.bp.find_close(cur_node) + 1;
                rank += (next_node - cur_node) / 2;
                cur_node = next_node;
            } else {
                cur_node += 1;
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

    pub fn skips(&self) -> &S {
        &self.skips
    }
}
