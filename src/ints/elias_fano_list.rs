/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::IntSeq;
use crate::EF;
use epserde::Epserde;
use sux::prelude::*;

/// A sequence of integers stored as gaps of an Elias-Fano monotone
/// sequence of prefix sums.
///
/// The value at `index` is recovered as the difference of two adjacent
/// prefix sums, so both random access and forward enumeration cost two
/// selects per value.
#[derive(Epserde, Debug, Clone)]
pub struct EliasFanoList<E = EF> {
    prefix_sums: E,
}

impl EliasFanoList {
    pub fn new(values: &[u64]) -> Self {
        let upper = values.iter().sum::<u64>() as usize;
        let mut efb = EliasFanoBuilder::new(values.len() + 1, upper);
        let mut sum = 0usize;
        efb.push(0);
        for &value in values {
            sum += value as usize;
            efb.push(sum);
        }
        let ef = efb.build();
        let prefix_sums: EF = unsafe { ef.map_high_bits(SelectAdaptConst::<_, _, 12, 4>::new) };
        Self { prefix_sums }
    }
}

impl From<Vec<u64>> for EliasFanoList {
    fn from(values: Vec<u64>) -> Self {
        Self::new(&values)
    }
}

impl<E: IndexedSeq<Input = usize, Output = usize>> IntSeq for EliasFanoList<E> {
    type Enumerator<'a>
        = EliasFanoListEnumerator<'a, E>
    where
        Self: 'a;

    fn get(&self, index: usize) -> u64 {
        (self.prefix_sums.get(index + 1) - self.prefix_sums.get(index)) as u64
    }

    fn enumerator_from(&self, index: usize) -> Self::Enumerator<'_> {
        EliasFanoListEnumerator {
            prefix_sums: &self.prefix_sums,
            last: self.prefix_sums.get(index),
            index,
        }
    }

    fn len(&self) -> usize {
        self.prefix_sums.len() - 1
    }
}

/// Forward enumerator over the gaps of the prefix-sum sequence.
pub struct EliasFanoListEnumerator<'a, E> {
    prefix_sums: &'a E,
    last: usize,
    index: usize,
}

impl<E: IndexedSeq<Input = usize, Output = usize>> Iterator for EliasFanoListEnumerator<'_, E> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        self.index += 1;
        let next = self.prefix_sums.get(self.index);
        let value = next - self.last;
        self.last = next;
        Some(value as u64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_and_enumerate() {
        let values: Vec<u64> = (0..500u64).map(|i| (i * 37) % 1000).collect();
        let seq = EliasFanoList::new(&values);
        assert_eq!(seq.len(), values.len());
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(seq.get(i), v, "i = {i}");
        }
        for start in [0, 1, 250, 499] {
            let decoded: Vec<u64> = seq
                .enumerator_from(start)
                .take(values.len() - start)
                .collect();
            assert_eq!(decoded, values[start..], "start = {start}");
        }
    }

    #[test]
    fn test_empty() {
        let seq = EliasFanoList::new(&[]);
        assert!(seq.is_empty());
    }
}
