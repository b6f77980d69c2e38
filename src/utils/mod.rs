/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Collection of common functions we use throughout the codebase.

use std::io::BufRead;
use std::path::Path;

/// Issues an advisory prefetch of the cache line holding `slice[index]`.
///
/// A hint only: on targets without prefetch support this is a no-op, and
/// the address is never dereferenced, so `index` may even fall outside the
/// slice.
#[inline(always)]
pub fn prefetch_index<T>(slice: &[T], index: usize) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
        _mm_prefetch(slice.as_ptr().wrapping_add(index) as *const i8, _MM_HINT_T0);
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        let _ = (slice, index);
    }
}

/// Reads a newline-separated file into a vector of byte strings.
///
/// Lines are arbitrary byte strings, not UTF-8.
pub fn read_lines(path: impl AsRef<Path>) -> std::io::Result<Vec<Vec<u8>>> {
    let file = std::fs::File::open(path)?;
    let mut lines = Vec::new();
    for line in std::io::BufReader::new(file).split(b'\n') {
        lines.push(line?);
    }
    Ok(lines)
}
