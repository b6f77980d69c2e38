/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{PoolEnumerator, StringPool};
use crate::ints::vbyte::{append_vbyte, decode_vbyte};
use crate::repair::{approximate_repair, Code};
use crate::utils::prefetch_index;
use crate::{Error, EF};
use epserde::Epserde;
use sux::prelude::*;

/// A string pool compressed with approximate Re-Pair.
///
/// The character stream is compressed preserving string boundaries, codes
/// are renumbered by descending frequency so that frequent codes get short
/// vbytes, and the dictionary expansions are flattened into a single
/// character array indexed by word positions.
#[derive(Epserde, Debug, Clone)]
pub struct CompressedStringPool<D = Vec<u16>, B = Vec<u8>, E = EF> {
    /// Concatenated word expansions, in frequency order.
    dictionary: D,
    /// Start of each word in `dictionary`, plus a final end marker.
    word_positions: D,
    /// VByte-encoded renumbered codes of all strings.
    byte_streams: B,
    /// Start of each string in `byte_streams`.
    positions: E,
}

impl CompressedStringPool {
    /// Builds the pool from a stream of characters in which `0` marks the
    /// end of each string. The stream must end with a `0`.
    pub fn new(chars: &[u16]) -> Result<Self, Error> {
        let (codes, dict) = approximate_repair(chars, true)?;

        let mut counts = vec![0usize; dict.len()];
        for &code in &codes {
            counts[code as usize] += 1;
        }

        // Renumber all codes but the separator by descending frequency.
        let mut sorted_codes: Vec<Code> = (1..dict.len()).map(|c| c as Code).collect();
        sorted_codes.sort_by(|&a, &b| counts[b as usize].cmp(&counts[a as usize]));

        let mut code_map = vec![Code::MAX; dict.len()];
        let mut dictionary = Vec::new();
        let mut word_positions: Vec<u16> = vec![0];
        for (new_code, &code) in sorted_codes.iter().enumerate() {
            code_map[code as usize] = new_code as Code;
            dictionary.extend_from_slice(&dict[code as usize]);
            word_positions.push(dictionary.len() as u16);
        }

        let mut byte_streams = Vec::new();
        let mut positions = vec![0usize];
        for &code in &codes {
            if code != 0 {
                let mapped = code_map[code as usize];
                debug_assert!(mapped != Code::MAX);
                append_vbyte(&mut byte_streams, u64::from(mapped));
            } else {
                positions.push(byte_streams.len());
            }
        }

        let mut efb = EliasFanoBuilder::new(positions.len(), byte_streams.len());
        for &position in &positions {
            efb.push(position);
        }
        let ef = efb.build();
        let positions: EF = unsafe { ef.map_high_bits(SelectAdaptConst::<_, _, 12, 4>::new) };

        Ok(Self {
            dictionary,
            word_positions,
            byte_streams,
            positions,
        })
    }
}

impl TryFrom<Vec<u16>> for CompressedStringPool {
    type Error = Error;

    fn try_from(chars: Vec<u16>) -> Result<Self, Error> {
        Self::new(&chars)
    }
}

impl<D: AsRef<[u16]>, B: AsRef<[u8]>, E: IndexedSeq<Input = usize, Output = usize>> StringPool
    for CompressedStringPool<D, B, E>
{
    type Enumerator<'a>
        = CompressedStringEnumerator<'a>
    where
        Self: 'a;

    fn get_string_enumerator(&self, index: usize) -> Self::Enumerator<'_> {
        let stream_begin = self.positions.get(index);
        let stream_end = self.positions.get(index + 1);
        let bytes = self.byte_streams.as_ref();
        prefetch_index(bytes, stream_begin);
        CompressedStringEnumerator {
            dictionary: self.dictionary.as_ref(),
            word_positions: self.word_positions.as_ref(),
            bytes,
            stream_begin,
            stream_end,
            word_begin: 0,
            word_end: 0,
        }
    }

    fn len(&self) -> usize {
        self.positions.len() - 1
    }
}

pub struct CompressedStringEnumerator<'a> {
    dictionary: &'a [u16],
    word_positions: &'a [u16],
    bytes: &'a [u8],
    stream_begin: usize,
    stream_end: usize,
    word_begin: usize,
    word_end: usize,
}

impl PoolEnumerator for CompressedStringEnumerator<'_> {
    #[inline]
    fn next_char(&mut self) -> u16 {
        if self.word_begin == self.word_end {
            if self.stream_begin == self.stream_end {
                return 0;
            }
            let (code, read) = decode_vbyte(self.bytes, self.stream_begin);
            self.stream_begin += read;
            self.word_begin = self.word_positions[code as usize] as usize;
            self.word_end = self.word_positions[code as usize + 1] as usize;
        }
        let c = self.dictionary[self.word_begin];
        self.word_begin += 1;
        c
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_roundtrip() {
        // Repetitive strings so that Re-Pair actually forms rules.
        let strings: Vec<Vec<u16>> = (0..200)
            .map(|i| {
                let mut s: Vec<u16> = b"abracadabra".iter().map(|&b| u16::from(b)).collect();
                s.push(300 + (i % 7) as u16);
                s
            })
            .collect();
        let mut chars = Vec::new();
        for s in &strings {
            chars.extend_from_slice(s);
            chars.push(0);
        }
        let pool = CompressedStringPool::new(&chars).unwrap();
        assert_eq!(pool.len(), strings.len());
        for (i, s) in strings.iter().enumerate() {
            assert_eq!(&pool.get_string(i), s, "i = {i}");
        }
        assert!(pool.byte_streams.len() < chars.len());
    }

    #[test]
    fn test_empty_strings() {
        let chars = vec![0u16, 0, 0];
        let pool = CompressedStringPool::new(&chars).unwrap();
        assert_eq!(pool.len(), 3);
        for i in 0..3 {
            assert!(pool.get_string(i).is_empty());
        }
    }
}
