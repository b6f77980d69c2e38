/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::IntSeq;
use dsi_bitstream::prelude::*;
use epserde::Epserde;

/// How many codes one position sample covers.
const SAMPLE_RATE: usize = 64;

/// A sequence of integers stored as Elias γ codes with sampled bit
/// positions for random access.
///
/// Random access seeks the closest sample and decodes at most
/// `SAMPLE_RATE − 1` codes; forward enumeration decodes sequentially.
#[derive(Epserde, Debug, Clone)]
pub struct GammaVec<B = Vec<u64>> {
    /// The little-endian γ bit stream, closed by a guard word so that
    /// readers never run off the end in the middle of a code.
    bits: B,
    /// Bit position of every `SAMPLE_RATE`-th code.
    samples: B,
    len: usize,
}

impl GammaVec {
    pub fn new(values: &[u64]) -> Self {
        let mut writer = BufBitWriter::<LE, _>::new(MemWordWriterVec::new(Vec::<u64>::new()));
        let mut samples = Vec::with_capacity(values.len() / SAMPLE_RATE + 1);
        samples.push(0);
        let mut pos = 0u64;
        for (i, &value) in values.iter().enumerate() {
            if i % SAMPLE_RATE == 0 && i != 0 {
                samples.push(pos);
            }
            pos += writer.write_gamma(value).unwrap() as u64;
        }
        let mut bits = writer.into_inner().unwrap().into_inner();
        bits.push(0);
        Self {
            bits,
            samples,
            len: values.len(),
        }
    }
}

impl From<Vec<u64>> for GammaVec {
    fn from(values: Vec<u64>) -> Self {
        Self::new(&values)
    }
}

impl<B: AsRef<[u64]>> GammaVec<B> {
    fn reader_at(&self, index: usize) -> BufBitReader<LE, MemWordReader<u32, &[u32]>> {
        debug_assert!(index <= self.len);
        let samples = self.samples.as_ref();
        // An enumerator may be requested one past the last value; decode
        // forward from the last sample in that case.
        let sample_idx = (index / SAMPLE_RATE).min(samples.len() - 1);
        let data: &[u32] = unsafe { self.bits.as_ref().align_to().1 };
        let mut reader = BufBitReader::<LE, _>::new(MemWordReader::new(data));
        reader.set_bit_pos(samples[sample_idx]).unwrap();
        for _ in 0..index - sample_idx * SAMPLE_RATE {
            reader.read_gamma().unwrap();
        }
        reader
    }
}

impl<B: AsRef<[u64]>> IntSeq for GammaVec<B> {
    type Enumerator<'a>
        = GammaVecEnumerator<'a>
    where
        Self: 'a;

    fn get(&self, index: usize) -> u64 {
        debug_assert!(index < self.len);
        self.reader_at(index).read_gamma().unwrap()
    }

    fn enumerator_from(&self, index: usize) -> Self::Enumerator<'_> {
        GammaVecEnumerator {
            reader: self.reader_at(index),
        }
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Forward enumerator over the γ stream. Unbounded: the caller must not
/// advance it past the end of the sequence.
pub struct GammaVecEnumerator<'a> {
    reader: BufBitReader<LE, MemWordReader<u32, &'a [u32]>>,
}

impl Iterator for GammaVecEnumerator<'_> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        Some(self.reader.read_gamma().unwrap())
    }
}
