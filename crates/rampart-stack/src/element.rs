// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

/// Marker for element types the stack may store.
///
/// The guards treat slots as raw bytes: they hash them, fill them with poison
/// and read them back for diagnostics. That is only sound for types whose
/// object representation is fully initialized and for which every bit
/// pattern is a valid value.
///
/// # Safety
///
/// Implementors must guarantee that `Self`:
/// - has a non-zero size,
/// - contains no padding bytes,
/// - is valid for every possible bit pattern (no references, `bool`, `char`,
///   enums or niches).
///
/// # Example
///
/// ```rust
/// use rampart_stack::PlainElement;
///
/// #[derive(Clone, Copy)]
/// #[repr(C)]
/// struct Sample {
///     id: i32,
///     tag: u32,
///     weight: f64,
/// }
///
/// // SAFETY: repr(C), 4 + 4 + 8 bytes with no padding, all fields accept any bits.
/// unsafe impl PlainElement for Sample {}
/// ```
pub unsafe trait PlainElement: Copy + 'static {}

macro_rules! impl_plain_element {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numeric type, no padding, every bit pattern is valid.
            unsafe impl PlainElement for $ty {}
        )*
    };
}

impl_plain_element!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

// SAFETY: arrays have no padding between elements and inherit validity from `T`.
// `[T; 0]` breaks the non-zero size rule; `BlockLayout::plan` refuses to plan
// a block for it, so such a stack never allocates.
unsafe impl<T: PlainElement, const N: usize> PlainElement for [T; N] {}

/// Views a plain element as its bytes.
#[inline]
pub(crate) fn bytes_of<T: PlainElement>(value: &T) -> &[u8] {
    // SAFETY (PRECONDITIONS ARE MET): PlainElement guarantees no padding, so all
    // size_of::<T>() bytes behind the reference are initialized.
    unsafe { core::slice::from_raw_parts(value as *const T as *const u8, size_of::<T>()) }
}
