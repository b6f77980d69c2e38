/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The succinct trie representations.
//!
//! All of them store the trie topology as a DFUDS balanced-parenthesis
//! vector and differ in what they attach to it: per-node bit skips for the
//! hollow tries, per-edge branching bytes and pooled path labels for the
//! path-decomposed tries.

mod hollow;
pub use hollow::*;

mod centroid_hollow;
pub use centroid_hollow::*;

mod path_decomposed;
pub use path_decomposed::*;
