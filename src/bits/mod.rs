/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Bit-level utilities: extraction from byte buffers and the
//! balanced-parenthesis vector underlying all the tries.

mod bit_strings;
pub use bit_strings::*;

mod bp_vec;
pub use bp_vec::*;
