// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Poison fill for logically dead slots.

use core::mem::MaybeUninit;

use rampart_util::{fill_bytes_with_pattern, is_slice_filled_with};

use crate::element::{PlainElement, bytes_of};

/// Byte replicated over every dead slot.
pub const POISON_BYTE: u8 = 0xAA;

/// A value of `T` whose bytes are all [`POISON_BYTE`].
///
/// # Example
///
/// ```rust
/// use rampart_stack::poison_value;
///
/// assert_eq!(poison_value::<u32>(), 0xAAAA_AAAA);
/// ```
pub fn poison_value<T: PlainElement>() -> T {
    let mut value = MaybeUninit::<T>::uninit();

    // SAFETY (PRECONDITIONS ARE MET): every byte is written before assume_init, and
    // PlainElement accepts any bit pattern.
    unsafe {
        core::ptr::write_bytes(value.as_mut_ptr() as *mut u8, POISON_BYTE, size_of::<T>());
        value.assume_init()
    }
}

/// Returns `true` if every byte of `value` is the poison pattern.
pub(crate) fn is_poisoned<T: PlainElement>(value: &T) -> bool {
    is_slice_filled_with(bytes_of(value), POISON_BYTE)
}

/// Poisons slots `from..to`.
///
/// # Safety
///
/// `data` must point to an allocation holding at least `to` slots of `T`.
pub(crate) unsafe fn poison_slots<T: PlainElement>(data: *mut T, from: usize, to: usize) {
    if from >= to {
        return;
    }

    // SAFETY (PRECONDITIONS ARE MET): caller guarantees slots from..to are inside the block.
    let bytes = unsafe {
        core::slice::from_raw_parts_mut(data.add(from) as *mut u8, (to - from) * size_of::<T>())
    };

    fill_bytes_with_pattern(bytes, POISON_BYTE);
}
