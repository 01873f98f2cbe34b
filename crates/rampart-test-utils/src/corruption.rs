// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Single-byte corruption helpers for guard tests.

/// Flips every bit of the byte at `base + offset`.
///
/// Applying it twice restores the original value.
///
/// # Safety
///
/// `base + offset` must be valid for reads and writes of one byte, and any
/// value of that byte must be a valid bit pattern for the object it belongs to.
pub unsafe fn flip_byte(base: *mut u8, offset: usize) {
    unsafe {
        let byte = base.add(offset);
        byte.write_volatile(!byte.read_volatile());
    }
}

/// Flips the byte at `offset` within the object representation of `target`.
///
/// # Safety
///
/// `offset` must be less than `size_of::<T>()` and must not land in padding,
/// and every bit pattern of the touched field must be valid.
pub unsafe fn flip_byte_in_place<T>(target: &mut T, offset: usize) {
    debug_assert!(offset < core::mem::size_of::<T>());

    unsafe { flip_byte(target as *mut T as *mut u8, offset) }
}
