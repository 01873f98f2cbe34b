// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Grow/shrink policy and payload reallocation.
//!
//! Growth doubles at full occupancy (`0 → 1 → 2 → 4 → 8 ...`). Shrinking
//! halves once occupancy drops to a quarter, leaving a hysteresis band so a
//! push/pop pair at the boundary never reallocates twice.

use alloc::alloc::{alloc_zeroed, dealloc};

use rampart_util::fill_bytes_with_pattern;

use crate::canary;
use crate::element::PlainElement;
use crate::error::StackError;
use crate::layout::BlockLayout;
use crate::poison::{POISON_BYTE, poison_slots};
use crate::stack::GuardedStack;
use crate::verify::header_flags;

#[cfg(any(test, feature = "test-utils"))]
use crate::stack::StackBehaviour;

/// Factor capacity grows and shrinks by.
pub const GROWTH_MULTIPLIER: usize = 2;

/// Whether a push at `size` needs more room.
#[inline(always)]
pub(crate) const fn needs_grow(size: usize, capacity: usize) -> bool {
    size >= capacity
}

/// Capacity after growing from `capacity`, `None` on overflow.
#[inline(always)]
pub(crate) const fn grown_capacity(capacity: usize) -> Option<usize> {
    if capacity == 0 {
        return Some(1);
    }

    capacity.checked_mul(GROWTH_MULTIPLIER)
}

/// Whether a stack left with `size` live slots should shrink.
#[inline(always)]
pub(crate) const fn needs_shrink(size: usize, capacity: usize) -> bool {
    size > 0 && size.saturating_mul(GROWTH_MULTIPLIER * GROWTH_MULTIPLIER) <= capacity
}

/// Capacity after shrinking from `capacity`.
#[inline(always)]
pub(crate) const fn shrunk_capacity(capacity: usize) -> usize {
    capacity / GROWTH_MULTIPLIER
}

impl<T: PlainElement> GuardedStack<T> {
    /// Moves the payload into a fresh block of `new_capacity` slots, keeping
    /// the first `keep` elements.
    ///
    /// # Strategy
    ///
    /// 1. Verify (a damaged stack is never reallocated)
    /// 2. Allocate a zeroed block and install its canaries
    /// 3. Copy exactly `keep` live slots
    /// 4. Scrub and free the old block through its origin
    /// 5. Poison `keep..new_capacity` and refresh checksums
    ///
    /// Nothing is modified before step 2 succeeds, so a failed allocation
    /// leaves the stack untouched.
    #[cold]
    #[inline(never)]
    pub(crate) fn reallocate(&mut self, new_capacity: usize, keep: usize) -> Result<(), StackError> {
        self.ensure_valid()?;

        let old_capacity = self.capacity as usize;
        debug_assert!(keep <= old_capacity && keep <= new_capacity);

        let layout = BlockLayout::for_type::<T>(new_capacity, self.config.canary)
            .ok_or(StackError::AllocationFailed)?;
        let alloc_layout = layout.to_alloc_layout().ok_or(StackError::AllocationFailed)?;

        #[cfg(any(test, feature = "test-utils"))]
        if self.behaviour == StackBehaviour::FailAtAlloc {
            return Err(StackError::AllocationFailed);
        }

        // SAFETY (PRECONDITIONS ARE MET): new_capacity >= 1, so the layout has non-zero size.
        let origin = unsafe { alloc_zeroed(alloc_layout) };
        if origin.is_null() {
            tracing::error!(
                name = self.provenance.name,
                old_capacity,
                new_capacity,
                "payload allocation failed"
            );
            return Err(StackError::AllocationFailed);
        }

        // SAFETY (PRECONDITIONS ARE MET): origin is a fresh block of layout.size bytes,
        // data offset is inside it and aligned for T.
        let data = unsafe {
            canary::install(origin, &layout);
            origin.add(layout.data) as *mut T
        };

        if keep > 0 {
            // SAFETY (PRECONDITIONS ARE MET): old block holds old_capacity >= keep slots,
            // new block holds new_capacity >= keep slots, distinct allocations.
            unsafe { core::ptr::copy_nonoverlapping(self.data, data, keep) };
        }

        self.release_block();

        self.data = data;
        self.origin = origin;
        self.capacity = new_capacity as isize;

        if self.config.poison {
            // SAFETY (PRECONDITIONS ARE MET): data holds new_capacity slots.
            unsafe { poison_slots(self.data, keep, new_capacity) };
        }

        self.refresh_checksums();

        tracing::debug!(
            name = self.provenance.name,
            old_capacity,
            new_capacity,
            kept = keep,
            "payload reallocated"
        );

        Ok(())
    }

    /// Scrubs and frees the current block, if any.
    ///
    /// Only touches `origin`; the caller resets the remaining fields. The
    /// allocator layout is derived from `capacity`, so a block is only freed
    /// while the header checks are clean. A damaged header leaks the block
    /// instead of scrubbing or freeing it with a wrong layout.
    pub(crate) fn release_block(&mut self) {
        if self.origin.is_null() {
            return;
        }

        let damage = header_flags(self);
        if !damage.is_empty() {
            tracing::error!(
                stack = ?core::ptr::from_ref(self),
                mask = damage.bits(),
                "payload block leaked: header damaged"
            );
            self.origin = core::ptr::null_mut();
            return;
        }

        let layout = usize::try_from(self.capacity)
            .ok()
            .and_then(|capacity| BlockLayout::for_type::<T>(capacity, self.config.canary))
            .and_then(|layout| layout.to_alloc_layout());

        let Some(layout) = layout else {
            tracing::error!(
                name = self.provenance.name,
                capacity = self.capacity,
                "payload block leaked: layout cannot be derived from capacity"
            );
            self.origin = core::ptr::null_mut();
            return;
        };

        let scrub = if self.config.poison { POISON_BYTE } else { 0 };

        // SAFETY (PRECONDITIONS ARE MET): origin was returned by alloc_zeroed with this
        // exact layout (same capacity, same canary flag) and is not used afterwards.
        unsafe {
            fill_bytes_with_pattern(
                core::slice::from_raw_parts_mut(self.origin, layout.size()),
                scrub,
            );
            dealloc(self.origin, layout);
        }

        self.origin = core::ptr::null_mut();
    }
}
