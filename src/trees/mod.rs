/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Streaming builders turning a sorted, prefix-free sequence of byte
//! strings into trie shapes, reported to a visitor one subtree at a time.
//!
//! The builders never materialize the trie: they keep only the right spine
//! of the part built so far, and fold completed subtrees into visitor
//! calls. The visitor's representation handles are moved into each fold,
//! so ownership of the partial representations is linear.

mod patricia;
pub use patricia::*;

mod compacted;
pub use compacted::*;
