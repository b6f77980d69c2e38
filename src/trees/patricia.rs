/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bits::{find_mismatching_bit, get_bit};
use crate::Error;

/// Visitor assembling a representation of a binary Patricia trie.
///
/// The builder guarantees that `buf` contains the full bytes of some
/// string traversing the node, that `offset` is the length in bits of the
/// path from the root to the node, and that `skip` is the number of label
/// bits on the node's incoming edge. The decision bit is not part of
/// `skip`: it is implied by the left/right position of the subtree.
pub trait BinaryTreeBuilder {
    type Repr;

    fn leaf(&mut self, buf: &[u8], offset: usize, skip: usize) -> Self::Repr;

    fn node(
        &mut self,
        left: Self::Repr,
        right: Self::Repr,
        buf: &[u8],
        offset: usize,
        skip: usize,
    ) -> Self::Repr;

    fn root(&mut self, tree: Self::Repr);
}

struct Frame<R> {
    path_len: usize,
    skip: usize,
    left: Option<R>,
}

/// Builds a binary Patricia trie from a sorted, prefix-free sequence of
/// byte strings, streaming subtrees to `visitor`.
///
/// Keys are compared at the bit level, most significant bit first. On
/// empty input the visitor is never called.
pub fn build_patricia<V, I>(visitor: &mut V, strings: I) -> Result<(), Error>
where
    V: BinaryTreeBuilder,
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut iter = strings.into_iter();
    let Some(first) = iter.next() else {
        return Ok(());
    };
    let mut last: Vec<u8> = first.as_ref().to_vec();
    let mut stack: Vec<Frame<V::Repr>> = vec![Frame {
        path_len: 0,
        skip: last.len() * 8,
        left: None,
    }];

    for cur in iter {
        let cur = cur.as_ref();
        let cur_bit_len = cur.len() * 8;
        let last_bit_len = last.len() * 8;

        let Some(mismatch) = find_mismatching_bit(cur, 0, cur_bit_len, &last, 0, last_bit_len)
        else {
            return Err(if cur_bit_len == last_bit_len {
                Error::DuplicateString
            } else {
                Error::NotPrefixFree
            });
        };
        if !get_bit(cur, mismatch) {
            return Err(Error::NotSorted);
        }

        // Find the node whose edge straddles the mismatch.
        let mut cur_node_idx = 0;
        while mismatch > stack[cur_node_idx].path_len + stack[cur_node_idx].skip {
            cur_node_idx += 1;
            debug_assert!(cur_node_idx < stack.len());
        }
        debug_assert!(mismatch >= stack[cur_node_idx].path_len);
        debug_assert!(mismatch < stack[cur_node_idx].path_len + stack[cur_node_idx].skip);

        // Close all open nodes up to the branching point.
        let left_subtree = if cur_node_idx == stack.len() - 1 {
            visitor.leaf(&last, mismatch + 1, last_bit_len - mismatch - 1)
        } else {
            let top = stack.last().unwrap();
            let mut right_subtree = visitor.leaf(&last, top.path_len, last_bit_len - top.path_len);
            for node_idx in (cur_node_idx + 1..stack.len() - 1).rev() {
                let frame = &mut stack[node_idx];
                right_subtree = visitor.node(
                    frame.left.take().unwrap(),
                    right_subtree,
                    &last,
                    frame.path_len,
                    frame.skip,
                );
            }
            let cur_node = &mut stack[cur_node_idx];
            visitor.node(
                cur_node.left.take().unwrap(),
                right_subtree,
                &last,
                mismatch + 1,
                cur_node.path_len + cur_node.skip - mismatch - 1,
            )
        };

        // Cut the stack at the branching node and push the split node,
        // then a new leaf holding the suffix of the current string.
        let cur_path_len = stack[cur_node_idx].path_len;
        stack.truncate(cur_node_idx);
        stack.push(Frame {
            path_len: cur_path_len,
            skip: mismatch - cur_path_len,
            left: Some(left_subtree),
        });
        stack.push(Frame {
            path_len: mismatch + 1,
            skip: cur_bit_len - mismatch - 1,
            left: None,
        });

        last.clear();
        last.extend_from_slice(cur);
    }

    // Close the remaining path.
    let top = stack.pop().unwrap();
    let mut subtree = visitor.leaf(&last, top.path_len, top.skip);
    while let Some(mut frame) = stack.pop() {
        subtree = visitor.node(
            frame.left.take().unwrap(),
            subtree,
            &last,
            frame.path_len,
            frame.skip,
        );
    }
    visitor.root(subtree);
    Ok(())
}
