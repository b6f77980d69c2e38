/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod bits;
pub mod ints;
pub mod pools;
pub mod repair;
pub mod trees;
pub mod tries;
pub mod utils;

/// The default version of Elias-Fano we use for monotone sequences.
pub type EF = sux::dict::EliasFano<
    sux::rank_sel::SelectAdaptConst<sux::bits::BitVec<Box<[usize]>>, Box<[usize]>, 12, 4>,
    sux::bits::BitFieldVec<usize, Box<[usize]>>,
>;

/// Errors reported while building a dictionary.
///
/// All of these are detected during construction; queries on a built
/// dictionary cannot fail.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Two consecutive input strings are identical.
    #[error("duplicate string in input")]
    DuplicateString,
    /// An input string is strictly smaller than its predecessor.
    #[error("input strings are not sorted")]
    NotSorted,
    /// An input string is a prefix of another input string.
    #[error("input strings are not prefix-free")]
    NotPrefixFree,
    /// The input alphabet has more distinct values than the code type can
    /// represent.
    #[error("input alphabet does not fit the code type")]
    AlphabetTooLarge,
}

/// Prelude module to import everything from this crate.
pub mod prelude {
    pub use crate::bits::*;
    pub use crate::ints::*;
    pub use crate::pools::*;
    pub use crate::repair::*;
    pub use crate::trees::*;
    pub use crate::tries::*;
    pub use crate::utils::*;
    pub use crate::Error;
    pub use crate::EF;
}
