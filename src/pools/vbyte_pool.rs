/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{PoolEnumerator, StringPool};
use crate::ints::vbyte::{append_vbyte, decode_vbyte, vbyte_len};
use crate::utils::prefetch_index;
use crate::{Error, EF};
use epserde::Epserde;
use sux::prelude::*;

/// A string pool storing each character as a vbyte, with the start offset
/// of each string in an Elias-Fano monotone sequence.
#[derive(Epserde, Debug, Clone)]
pub struct VByteStringPool<B = Vec<u8>, E = EF> {
    byte_streams: B,
    positions: E,
}

impl VByteStringPool {
    /// Builds the pool from a stream of characters in which `0` marks the
    /// end of each string. The stream must end with a `0`.
    pub fn new(chars: &[u16]) -> Self {
        let mut strings = 0usize;
        let mut stream_len = 0usize;
        for &c in chars {
            if c == 0 {
                strings += 1;
            } else {
                stream_len += vbyte_len(u64::from(c));
            }
        }
        debug_assert!(chars.is_empty() || *chars.last().unwrap() == 0);

        let mut byte_streams = Vec::with_capacity(stream_len);
        let mut efb = EliasFanoBuilder::new(strings + 1, stream_len);
        efb.push(0);
        for &c in chars {
            if c != 0 {
                append_vbyte(&mut byte_streams, u64::from(c));
            } else {
                efb.push(byte_streams.len());
            }
        }

        let ef = efb.build();
        let positions: EF = unsafe { ef.map_high_bits(SelectAdaptConst::<_, _, 12, 4>::new) };
        Self {
            byte_streams,
            positions,
        }
    }
}

impl TryFrom<Vec<u16>> for VByteStringPool {
    type Error = Error;

    fn try_from(chars: Vec<u16>) -> Result<Self, Error> {
        Ok(Self::new(&chars))
    }
}

impl<B: AsRef<[u8]>, E: IndexedSeq<Input = usize, Output = usize>> StringPool
    for VByteStringPool<B, E>
{
    type Enumerator<'a>
        = VByteStringEnumerator<'a>
    where
        Self: 'a;

    fn get_string_enumerator(&self, index: usize) -> Self::Enumerator<'_> {
        let begin = self.positions.get(index);
        let end = self.positions.get(index + 1);
        let bytes = self.byte_streams.as_ref();
        prefetch_index(bytes, begin);
        VByteStringEnumerator { bytes, begin, end }
    }

    fn len(&self) -> usize {
        self.positions.len() - 1
    }
}

pub struct VByteStringEnumerator<'a> {
    bytes: &'a [u8],
    begin: usize,
    end: usize,
}

impl PoolEnumerator for VByteStringEnumerator<'_> {
    #[inline]
    fn next_char(&mut self) -> u16 {
        if self.begin == self.end {
            return 0;
        }
        let (value, read) = decode_vbyte(self.bytes, self.begin);
        self.begin += read;
        value as u16
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let strings: Vec<Vec<u16>> = vec![
            vec![b'f' as u16, b'o' as u16, b'o' as u16],
            vec![],
            vec![1, 127, 128, 300, 511],
            vec![u16::MAX],
        ];
        let mut chars = Vec::new();
        for s in &strings {
            chars.extend_from_slice(s);
            chars.push(0);
        }
        let pool = VByteStringPool::new(&chars);
        assert_eq!(pool.len(), strings.len());
        for (i, s) in strings.iter().enumerate() {
            assert_eq!(&pool.get_string(i), s, "i = {i}");
            // Past the end the enumerator keeps returning zero.
            let mut enumerator = pool.get_string_enumerator(i);
            for _ in 0..s.len() {
                enumerator.next_char();
            }
            assert_eq!(enumerator.next_char(), 0);
            assert_eq!(enumerator.next_char(), 0);
        }
    }

    #[test]
    fn test_empty() {
        let pool = VByteStringPool::new(&[]);
        assert!(pool.is_empty());
    }
}
