/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! An immutable balanced-parenthesis vector with the navigational
//! operations needed by DFUDS tree encodings.
//!
//! Bits are packed LSB-first into `usize` words; a `1` is an open
//! parenthesis, a `0` a close. Matching searches proceed one byte at a
//! time using compile-time excess tables, so their cost is proportional to
//! the distance to the match divided by eight. [`select0`](BpVec::select0)
//! is supported by cumulative zero counts sampled every
//! [`BLOCK_BITS`](BpVec::BLOCK_BITS) bits.

use epserde::Epserde;

const BITS: usize = usize::BITS as usize;
const BYTES_PER_WORD: usize = BITS / 8;

/// Per-byte parenthesis excess tables, built at compile time.
///
/// `FWD.0[b]` is the total excess (opens minus closes) of the byte `b`
/// scanned LSB-first; `FWD.1[b]` is the minimum excess over its non-empty
/// prefixes. `BWD` is the analogue for an MSB-first scan with the roles of
/// opens and closes exchanged, as needed when searching backward for an
/// open parenthesis.
const FWD: ([i8; 256], [i8; 256]) = excess_tables(false);
const BWD: ([i8; 256], [i8; 256]) = excess_tables(true);

const fn excess_tables(backward: bool) -> ([i8; 256], [i8; 256]) {
    let mut excess = [0i8; 256];
    let mut min_excess = [0i8; 256];
    let mut b = 0;
    while b < 256 {
        let mut e = 0i8;
        let mut min = i8::MAX;
        let mut i = 0;
        while i < 8 {
            let bit = if backward { 7 - i } else { i };
            let delta = if (b >> bit) & 1 != 0 { 1 } else { -1 };
            e += if backward { -delta } else { delta };
            if e < min {
                min = e;
            }
            i += 1;
        }
        excess[b] = e;
        min_excess[b] = min;
        b += 1;
    }
    (excess, min_excess)
}

/// Position of the `rank`-th (zero-based) set bit of `word`.
#[inline(always)]
fn select_in_word(mut word: usize, rank: usize) -> usize {
    for _ in 0..rank {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

#[inline(always)]
fn low_mask(bits: usize) -> usize {
    if bits == BITS {
        usize::MAX
    } else {
        (1 << bits) - 1
    }
}

/// An appendable bit-vector builder used to assemble the per-subtree
/// parenthesis fragments bottom-up.
///
/// Bits past the logical length of the last word are kept at zero, so two
/// builders can be merged with word-level shifts.
#[derive(Debug, Clone, Default)]
pub struct BpBuilder {
    words: Vec<usize>,
    len: usize,
}

impl BpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(BITS)),
            len: 0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reserve(&mut self, additional_bits: usize) {
        self.words
            .reserve((self.len + additional_bits).div_ceil(BITS) - self.words.len());
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let pos = self.len % BITS;
        if pos == 0 {
            self.words.push(0);
        }
        if bit {
            *self.words.last_mut().unwrap() |= 1 << pos;
        }
        self.len += 1;
    }

    /// Appends `n` ones.
    pub fn extend_ones(&mut self, n: usize) {
        let mut remaining = n;
        let pos = self.len % BITS;
        if pos != 0 && remaining > 0 {
            let take = (BITS - pos).min(remaining);
            *self.words.last_mut().unwrap() |= low_mask(take) << pos;
            self.len += take;
            remaining -= take;
        }
        while remaining >= BITS {
            self.words.push(usize::MAX);
            self.len += BITS;
            remaining -= BITS;
        }
        if remaining > 0 {
            self.words.push(low_mask(remaining));
            self.len += remaining;
        }
    }

    /// Appends the contents of `other`, leaving it empty.
    pub fn append(&mut self, other: &mut Self) {
        let shift = self.len % BITS;
        if shift == 0 {
            self.words.extend_from_slice(&other.words);
        } else {
            let mut carry = self.words.pop().unwrap();
            for &w in &other.words {
                self.words.push(carry | (w << shift));
                carry = w >> (BITS - shift);
            }
            self.words.push(carry);
        }
        self.len += other.len;
        self.words.truncate(self.len.div_ceil(BITS));
        other.words.clear();
        other.len = 0;
    }

    /// Freezes the builder into an immutable [`BpVec`], computing the
    /// zero-count samples.
    pub fn build(self) -> BpVec {
        let mut block_zeros = Vec::with_capacity(self.words.len() / BpVec::WORDS_PER_BLOCK + 2);
        let mut zeros = 0;
        block_zeros.push(0);
        for (i, &w) in self.words.iter().enumerate() {
            let bits_in_word = BITS.min(self.len - i * BITS);
            zeros += (!w & low_mask(bits_in_word)).count_ones() as usize;
            if (i + 1) % BpVec::WORDS_PER_BLOCK == 0 {
                block_zeros.push(zeros);
            }
        }
        if self.words.len() % BpVec::WORDS_PER_BLOCK != 0 {
            block_zeros.push(zeros);
        }
        BpVec {
            words: self.words,
            block_zeros,
            len: self.len,
        }
    }
}

/// An immutable balanced-parenthesis vector.
///
/// The backing storage is any `AsRef<[usize]>`, so an ε-copy deserialized
/// instance navigates a memory-mapped region in place.
#[derive(Epserde, Debug, Clone)]
pub struct BpVec<B = Vec<usize>> {
    words: B,
    /// Cumulative number of zeros before each block of
    /// [`WORDS_PER_BLOCK`](Self::WORDS_PER_BLOCK) words, with a final
    /// entry holding the total.
    block_zeros: B,
    len: usize,
}

impl BpVec {
    const WORDS_PER_BLOCK: usize = 8;
    /// Number of bits covered by one zero-count sample.
    pub const BLOCK_BITS: usize = Self::WORDS_PER_BLOCK * BITS;
}

impl<B: AsRef<[usize]>> BpVec<B> {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit at position `pos`.
    #[inline(always)]
    pub fn get(&self, pos: usize) -> bool {
        debug_assert!(pos < self.len);
        self.words.as_ref()[pos / BITS] >> (pos % BITS) & 1 != 0
    }

    #[inline(always)]
    fn byte(&self, byte_idx: usize) -> usize {
        self.words.as_ref()[byte_idx / BYTES_PER_WORD] >> (byte_idx % BYTES_PER_WORD * 8) & 0xFF
    }

    /// Returns the position of the close parenthesis matching the open
    /// parenthesis at `open_pos`.
    pub fn find_close(&self, open_pos: usize) -> usize {
        debug_assert!(self.get(open_pos));
        let mut pos = open_pos + 1;
        let mut excess = 1isize;
        while pos % 8 != 0 {
            if self.get(pos) {
                excess += 1;
            } else {
                excess -= 1;
                if excess == 0 {
                    return pos;
                }
            }
            pos += 1;
        }
        let mut byte_idx = pos / 8;
        loop {
            let b = self.byte(byte_idx);
            if excess + FWD.1[b] as isize <= 0 {
                for i in 0..8 {
                    if b >> i & 1 != 0 {
                        excess += 1;
                    } else {
                        excess -= 1;
                        if excess == 0 {
                            return byte_idx * 8 + i;
                        }
                    }
                }
                unreachable!();
            }
            excess += FWD.0[b] as isize;
            byte_idx += 1;
        }
    }

    /// Returns the position of the open parenthesis matching the close
    /// parenthesis at `close_pos`.
    pub fn find_open(&self, close_pos: usize) -> usize {
        debug_assert!(!self.get(close_pos));
        let mut pos = close_pos;
        let mut excess = 1isize;
        while pos % 8 != 0 {
            pos -= 1;
            if self.get(pos) {
                excess -= 1;
                if excess == 0 {
                    return pos;
                }
            } else {
                excess += 1;
            }
        }
        let mut byte_idx = pos / 8;
        loop {
            byte_idx -= 1;
            let b = self.byte(byte_idx);
            if excess + BWD.1[b] as isize <= 0 {
                for i in (0..8).rev() {
                    if b >> i & 1 != 0 {
                        excess -= 1;
                        if excess == 0 {
                            return byte_idx * 8 + i;
                        }
                    } else {
                        excess += 1;
                    }
                }
                unreachable!();
            }
            excess += BWD.0[b] as isize;
        }
    }

    /// Returns the number of zeros strictly before position `pos`.
    pub fn rank0(&self, pos: usize) -> usize {
        debug_assert!(pos <= self.len);
        let words = self.words.as_ref();
        let block = pos / BpVec::BLOCK_BITS;
        let mut zeros = self.block_zeros.as_ref()[block];
        for i in block * BpVec::WORDS_PER_BLOCK..pos / BITS {
            zeros += words[i].count_zeros() as usize;
        }
        if pos % BITS != 0 {
            zeros += (!words[pos / BITS] & low_mask(pos % BITS)).count_ones() as usize;
        }
        zeros
    }

    /// Returns the position of the zero of given zero-based `rank`.
    pub fn select0(&self, rank: usize) -> usize {
        let block_zeros = self.block_zeros.as_ref();
        debug_assert!(rank < *block_zeros.last().unwrap());
        let block = block_zeros.partition_point(|&z| z <= rank) - 1;
        let words = self.words.as_ref();
        let mut zeros = block_zeros[block];
        let mut word_idx = block * BpVec::WORDS_PER_BLOCK;
        loop {
            let bits_in_word = BITS.min(self.len - word_idx * BITS);
            let inverted = !words[word_idx] & low_mask(bits_in_word);
            let word_zeros = inverted.count_ones() as usize;
            if zeros + word_zeros > rank {
                return word_idx * BITS + select_in_word(inverted, rank - zeros);
            }
            zeros += word_zeros;
            word_idx += 1;
        }
    }

    /// Returns the position of the first zero at position `pos` or after.
    pub fn successor0(&self, pos: usize) -> usize {
        let words = self.words.as_ref();
        let mut word_idx = pos / BITS;
        let mut inverted = !words[word_idx] & (usize::MAX << (pos % BITS));
        loop {
            if inverted != 0 {
                return word_idx * BITS + inverted.trailing_zeros() as usize;
            }
            word_idx += 1;
            inverted = !words[word_idx];
        }
    }

    /// Returns the position of the last zero at position `pos` or before.
    pub fn predecessor0(&self, pos: usize) -> usize {
        let words = self.words.as_ref();
        let mut word_idx = pos / BITS;
        let mut inverted = !words[word_idx] & low_mask(pos % BITS + 1);
        loop {
            if inverted != 0 {
                return word_idx * BITS + BITS - 1 - inverted.leading_zeros() as usize;
            }
            word_idx -= 1;
            inverted = !words[word_idx];
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn from_str(s: &str) -> BpVec {
        let mut builder = BpBuilder::new();
        for c in s.chars() {
            builder.push(c == '1');
        }
        builder.build()
    }

    fn naive_find_close(bits: &[bool], open: usize) -> usize {
        let mut excess = 1isize;
        for (i, &b) in bits.iter().enumerate().skip(open + 1) {
            excess += if b { 1 } else { -1 };
            if excess == 0 {
                return i;
            }
        }
        panic!("unmatched open");
    }

    #[test]
    fn test_builder_append() {
        let mut a = BpBuilder::new();
        for i in 0..100 {
            a.push(i % 3 == 0);
        }
        let mut b = BpBuilder::new();
        b.extend_ones(70);
        b.push(false);
        a.append(&mut b);
        assert_eq!(a.len(), 171);
        assert!(b.is_empty());
        let bp = a.build();
        for i in 0..100 {
            assert_eq!(bp.get(i), i % 3 == 0);
        }
        for i in 100..170 {
            assert!(bp.get(i));
        }
        assert!(!bp.get(170));
    }

    #[test]
    fn test_small() {
        let bp = from_str("11100100");
        assert_eq!(bp.find_close(0), 7);
        assert_eq!(bp.find_close(1), 4);
        assert_eq!(bp.find_close(2), 3);
        assert_eq!(bp.find_close(5), 6);
        assert_eq!(bp.find_open(3), 2);
        assert_eq!(bp.find_open(4), 1);
        assert_eq!(bp.find_open(6), 5);
        assert_eq!(bp.find_open(7), 0);
        assert_eq!(bp.successor0(1), 3);
        assert_eq!(bp.successor0(3), 3);
        assert_eq!(bp.predecessor0(5), 4);
        assert_eq!(bp.select0(0), 3);
        assert_eq!(bp.select0(2), 6);
        assert_eq!(bp.rank0(4), 1);
        assert_eq!(bp.rank0(8), 4);
    }

    #[test]
    fn test_against_naive() {
        let mut rng = SmallRng::seed_from_u64(0);
        // Random balanced sequences: a run of opens per node, then a close.
        let mut bits = vec![true];
        let mut pending = 1usize;
        while pending > 0 {
            let deg = if bits.len() > 4000 {
                0
            } else {
                rng.random_range(0..4usize)
            };
            for _ in 0..deg {
                bits.push(true);
            }
            bits.push(false);
            pending += deg;
            pending -= 1;
        }
        let mut builder = BpBuilder::new();
        for &b in &bits {
            builder.push(b);
        }
        let bp = builder.build();
        assert_eq!(bp.len(), bits.len());

        let mut zeros = Vec::new();
        for (i, &b) in bits.iter().enumerate() {
            if b {
                let close = naive_find_close(&bits, i);
                assert_eq!(bp.find_close(i), close, "open at {i}");
                assert_eq!(bp.find_open(close), i, "close at {close}");
            } else {
                zeros.push(i);
            }
        }
        for (rank, &pos) in zeros.iter().enumerate() {
            assert_eq!(bp.select0(rank), pos);
            assert_eq!(bp.rank0(pos), rank);
            assert_eq!(bp.successor0(pos), pos);
        }
        for pos in 0..bits.len() {
            let succ = zeros.iter().copied().find(|&z| z >= pos);
            if let Some(succ) = succ {
                assert_eq!(bp.successor0(pos), succ);
            }
            let pred = zeros.iter().copied().rev().find(|&z| z <= pos);
            if let Some(pred) = pred {
                assert_eq!(bp.predecessor0(pos), pred);
            }
        }
    }
}
