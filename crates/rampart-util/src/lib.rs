// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Byte-level helpers shared by the Rampart guards.
//!
//! Everything here operates on plain byte slices so that the callers (canary,
//! poison and checksum guards) keep all raw pointer handling on their side.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

use core::fmt;

/// Fills a byte slice with a repeating pattern byte.
///
/// Used to poison dead slots and to scrub freed payload blocks.
///
/// # Example
///
/// ```
/// use rampart_util::fill_bytes_with_pattern;
///
/// let mut buffer = [0u8; 8];
/// fill_bytes_with_pattern(&mut buffer, 0xAA);
/// assert!(buffer.iter().all(|&b| b == 0xAA));
/// ```
#[inline]
pub fn fill_bytes_with_pattern(slice: &mut [u8], pattern: u8) {
    for byte in slice.iter_mut() {
        *byte = pattern;
    }
}

/// Returns `true` if every byte of the slice equals `pattern`.
///
/// An empty slice is never considered filled: there is nothing to recognize.
///
/// # Example
///
/// ```
/// use rampart_util::is_slice_filled_with;
///
/// assert!(is_slice_filled_with(&[0xAA, 0xAA], 0xAA));
/// assert!(!is_slice_filled_with(&[0xAA, 0x00], 0xAA));
/// assert!(!is_slice_filled_with(&[], 0xAA));
/// ```
#[inline]
pub fn is_slice_filled_with(slice: &[u8], pattern: u8) -> bool {
    !slice.is_empty() && slice.iter().all(|&b| b == pattern)
}

/// Rounds `offset` up to the next multiple of `align`.
///
/// `align` must be a non-zero power of two. Returns `None` on overflow or on
/// an invalid alignment.
///
/// # Example
///
/// ```
/// use rampart_util::align_up;
///
/// assert_eq!(align_up(0, 8), Some(0));
/// assert_eq!(align_up(9, 8), Some(16));
/// assert_eq!(align_up(16, 16), Some(16));
/// assert_eq!(align_up(1, 3), None);
/// assert_eq!(align_up(usize::MAX, 8), None);
/// ```
#[inline]
pub const fn align_up(offset: usize, align: usize) -> Option<usize> {
    if align == 0 || !align.is_power_of_two() {
        return None;
    }

    match offset.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Writes `bytes` as space-separated lower-case hex pairs.
///
/// # Example
///
/// ```
/// use rampart_util::write_hex_bytes;
///
/// let mut out = String::new();
/// write_hex_bytes(&mut out, &[0xde, 0xad, 0x01]).unwrap();
/// assert_eq!(out, "de ad 01");
/// ```
pub fn write_hex_bytes<W: fmt::Write + ?Sized>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write!(out, "{:02x}", byte)?;
    }

    Ok(())
}
