/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::Error;

/// Visitor assembling a representation of a byte-alphabet compacted trie.
///
/// A leaf is a node with no children. `skip` is measured in bytes and does
/// not include the branching byte leading to each child, which is reported
/// in the `children` pairs instead.
pub trait TreeBuilder {
    type Repr;

    fn node(
        &mut self,
        children: Vec<(u8, Self::Repr)>,
        buf: &[u8],
        offset: usize,
        skip: usize,
    ) -> Self::Repr;

    fn root(&mut self, tree: Self::Repr);
}

struct Frame<R> {
    path_len: usize,
    skip: usize,
    children: Vec<(u8, R)>,
}

/// Builds a byte compacted trie from a sorted, prefix-free sequence of
/// byte strings, streaming subtrees to `visitor`.
///
/// On empty input the visitor is never called.
pub fn build_compacted_trie<V, I>(visitor: &mut V, strings: I) -> Result<(), Error>
where
    V: TreeBuilder,
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
        skip: last.len(),
        children: Vec::new(),
    }];

    for cur in iter {
        let cur = cur.as_ref();
        let min_len = last.len().min(cur.len());
        let Some(mismatch) = (0..min_len).find(|&i| last[i] != cur[i]) else {
            return Err(if last.len() == cur.len() {
                Error::DuplicateString
            } else {
                Error::NotPrefixFree
            });
        };
        if cur[mismatch] < last[mismatch] {
            return Err(Error::NotSorted);
        }

        // Find the node whose edge contains the mismatch.
        let mut cur_node_idx = 0;
        while mismatch > stack[cur_node_idx].path_len + stack[cur_node_idx].skip {
            cur_node_idx += 1;
            debug_assert!(cur_node_idx < stack.len());
        }
        debug_assert!(mismatch >= stack[cur_node_idx].path_len);

        // Close all open nodes below the branching point.
        while stack.len() > cur_node_idx + 1 {
            let child = stack.pop().unwrap();
            let subtrie = visitor.node(child.children, &last, child.path_len, child.skip);
            let branching_char = last[child.path_len - 1];
            stack
                .last_mut()
                .unwrap()
                .children
                .push((branching_char, subtrie));
        }

        // If the mismatch falls inside the edge, split the node: the
        // prefix of the edge stays here, the rest moves to a new single
        // child together with the old children.
        let cur_node = stack.last_mut().unwrap();
        if mismatch < cur_node.path_len + cur_node.skip {
            let children = std::mem::take(&mut cur_node.children);
            let subtrie = visitor.node(
                children,
                &last,
                mismatch + 1,
                cur_node.path_len + cur_node.skip - mismatch - 1,
            );
            let branching_char = last[mismatch];
            cur_node.children.push((branching_char, subtrie));
            cur_node.skip = mismatch - cur_node.path_len;
        }
        debug_assert_eq!(cur_node.path_len + cur_node.skip, mismatch);

        // Open a new leaf with the suffix of the current string.
        stack.push(Frame {
            path_len: mismatch + 1,
            skip: cur.len() - mismatch - 1,
            children: Vec::new(),
        });

        last.clear();
        last.extend_from_slice(cur);
    }

    // Close the remaining path.
    while stack.len() > 1 {
        let child = stack.pop().unwrap();
        let subtrie = visitor.node(child.children, &last, child.path_len, child.skip);
        let branching_char = last[child.path_len - 1];
        stack
            .last_mut()
            .unwrap()
            .children
            .push((branching_char, subtrie));
    }
    let frame = stack.pop().unwrap();
    let root = visitor.node(frame.children, &last, frame.path_len, frame.skip);
    visitor.root(root);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        root: Option<String>,
    }

    impl TreeBuilder for Recorder {
        type Repr = String;

        fn node(
            &mut self,
            children: Vec<(u8, String)>,
            buf: &[u8],
            offset: usize,
            skip: usize,
        ) -> String {
            let label: String = buf[offset..offset + skip]
                .iter()
                .map(|&b| b as char)
                .collect();
            let mut ret = format!("({label:?}");
            for (byte, child) in children {
                ret.push_str(&format!(" {}:{}", byte as char, child));
            }
            ret.push(')');
            ret
        }

        fn root(&mut self, tree: String) {
            self.root = Some(tree);
        }
    }

    #[test]
    fn test_shape() {
        let mut visitor = Recorder::default();
        build_compacted_trie(&mut visitor, ["trial", "triangle", "trie", "trip"]).unwrap();
        // Shared path "tri", then 'a' → "l"/"ngle" split, 'e', 'p'.
        assert_eq!(
            visitor.root.as_deref(),
            Some(r#"("tri" a:("" l:("") n:("gle")) e:("") p:(""))"#)
        );
    }

    #[test]
    fn test_malformed() {
        let mut visitor = Recorder::default();
        assert_eq!(
            build_compacted_trie(&mut visitor, ["a", "a"]),
            Err(Error::DuplicateString)
        );
        assert_eq!(
            build_compacted_trie(&mut visitor, ["a", "ab"]),
            Err(Error::NotPrefixFree)
        );
        assert_eq!(
            build_compacted_trie(&mut visitor, ["b", "a"]),
            Err(Error::NotSorted)
        );
    }
}
