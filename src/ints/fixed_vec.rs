/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::IntSeq;
use epserde::Epserde;
use sux::bits::BitFieldVec;
use sux::traits::bit_field_slice::{BitFieldSlice, BitFieldSliceCore};

/// A sequence of integers stored with the fixed width of the largest
/// value.
///
/// The least compact of the skip representations, but the fastest: random
/// access is a couple of shifts.
#[derive(Epserde, Debug, Clone)]
pub struct FixedVec<V = BitFieldVec<usize, Vec<usize>>> {
    values: V,
}

impl FixedVec {
    pub fn new(values: &[u64]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0) as usize;
        let width = (usize::BITS - max.leading_zeros()).max(1) as usize;
        let mut bfv = BitFieldVec::with_capacity(width, values.len());
        bfv.extend(values.iter().map(|&v| v as usize));
        Self { values: bfv }
    }
}

impl From<Vec<u64>> for FixedVec {
    fn from(values: Vec<u64>) -> Self {
        Self::new(&values)
    }
}

impl<V: BitFieldSlice<usize>> IntSeq for FixedVec<V> {
    type Enumerator<'a>
        = FixedVecEnumerator<'a, V>
    where
        Self: 'a;

    #[inline(always)]
    fn get(&self, index: usize) -> u64 {
        self.values.get(index) as u64
    }

    fn enumerator_from(&self, index: usize) -> Self::Enumerator<'_> {
        FixedVecEnumerator {
            values: &self.values,
            index,
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Forward enumerator performing one random access per value.
pub struct FixedVecEnumerator<'a, V> {
    values: &'a V,
    index: usize,
}

impl<V: BitFieldSlice<usize>> Iterator for FixedVecEnumerator<'_, V> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        let value = self.values.get(self.index);
        self.index += 1;
        Some(value as u64)
    }
}
