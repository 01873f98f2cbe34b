// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Placement of canaries and payload inside one allocation.
//!
//! All offset and alignment arithmetic of the payload block lives here.
//!
//! ```text
//! origin
//! |  pad  | canary_left | slot 0 | slot 1 | ... | slot cap-1 | pad | canary_right |
//!                       ^ data (aligned for T and for the canary)
//! ```

use core::alloc::Layout;

use rampart_util::align_up;

/// Width of a payload canary in bytes.
pub const CANARY_SIZE: usize = size_of::<u64>();

/// Alignment the payload canaries are placed at.
pub const CANARY_ALIGN: usize = align_of::<u64>();

/// Byte offsets of a payload block, relative to its origin.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BlockLayout {
    /// Offset of the left canary, `None` without canaries.
    pub canary_left: Option<usize>,
    /// Offset of slot 0.
    pub data: usize,
    /// Offset of the right canary, `None` without canaries.
    pub canary_right: Option<usize>,
    /// Total allocation size.
    pub size: usize,
    /// Allocation alignment.
    pub align: usize,
}

impl BlockLayout {
    /// Plans a block for `capacity` elements of `elem_size` bytes aligned at
    /// `elem_align`.
    ///
    /// With canaries, the left canary ends exactly where slot 0 starts and
    /// slot 0 keeps its natural alignment; the right canary sits at the next
    /// canary-aligned offset past the last slot. Returns `None` when the
    /// arithmetic overflows, `elem_size` is zero or `elem_align` is not a
    /// power of two.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rampart_stack::BlockLayout;
    ///
    /// let layout = BlockLayout::plan(1, 1, 3, true).expect("Failed to plan(..)");
    ///
    /// assert_eq!(layout.canary_left, Some(0));
    /// assert_eq!(layout.data, 8);
    /// assert_eq!(layout.canary_right, Some(16));
    /// assert_eq!(layout.size, 24);
    /// ```
    pub const fn plan(
        elem_size: usize,
        elem_align: usize,
        capacity: usize,
        canaries: bool,
    ) -> Option<Self> {
        if elem_size == 0 || elem_align == 0 || !elem_align.is_power_of_two() {
            return None;
        }

        let Some(payload) = elem_size.checked_mul(capacity) else {
            return None;
        };

        if !canaries {
            return Some(Self {
                canary_left: None,
                data: 0,
                canary_right: None,
                size: payload,
                align: elem_align,
            });
        }

        let align = if elem_align > CANARY_ALIGN {
            elem_align
        } else {
            CANARY_ALIGN
        };

        let Some(data) = align_up(CANARY_SIZE, align) else {
            return None;
        };
        let Some(payload_end) = data.checked_add(payload) else {
            return None;
        };
        let Some(canary_right) = align_up(payload_end, CANARY_ALIGN) else {
            return None;
        };
        let Some(size) = canary_right.checked_add(CANARY_SIZE) else {
            return None;
        };

        Some(Self {
            canary_left: Some(data - CANARY_SIZE),
            data,
            canary_right: Some(canary_right),
            size,
            align,
        })
    }

    /// Plans a block for `capacity` elements of `T`.
    pub const fn for_type<T>(capacity: usize, canaries: bool) -> Option<Self> {
        Self::plan(size_of::<T>(), align_of::<T>(), capacity, canaries)
    }

    /// Allocator layout for this block.
    pub fn to_alloc_layout(&self) -> Option<Layout> {
        Layout::from_size_align(self.size, self.align).ok()
    }
}
