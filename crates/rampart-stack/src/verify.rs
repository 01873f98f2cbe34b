// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Integrity verifier.
//!
//! Checks run in two tiers. Header checks only read the stack struct itself.
//! Payload checks dereference `origin`/`data` and therefore only run once the
//! header is known to be sound.

use crate::canary;
use crate::checksum::{payload_checksum, struct_checksum};
use crate::element::PlainElement;
use crate::layout::BlockLayout;
use crate::stack::GuardedStack;

bitflags::bitflags! {
    /// Violated invariants, one bit each. Empty means healthy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VerifyFlags: u32 {
        /// No stack was supplied.
        const NULL_HANDLE = 1 << 0;
        /// `data` is null while size or capacity is not, or the other way around.
        const DATA_PTR_INVALID = 1 << 1;
        /// `size` is negative or exceeds `capacity`.
        const SIZE_INVALID = 1 << 2;
        /// `capacity` is negative.
        const CAPACITY_INVALID = 1 << 3;
        /// Left header canary overwritten.
        const STRUCT_CANARY_LEFT = 1 << 4;
        /// Right header canary overwritten.
        const STRUCT_CANARY_RIGHT = 1 << 5;
        /// Left payload canary overwritten.
        const DATA_CANARY_LEFT = 1 << 6;
        /// Right payload canary overwritten.
        const DATA_CANARY_RIGHT = 1 << 7;
        /// Header checksum mismatch.
        const STRUCT_CHECKSUM = 1 << 8;
        /// Payload checksum mismatch.
        const DATA_CHECKSUM = 1 << 9;
    }
}

impl VerifyFlags {
    /// Bits that mean the header itself cannot be trusted.
    pub const HEADER_DAMAGE: Self = Self::NULL_HANDLE
        .union(Self::DATA_PTR_INVALID)
        .union(Self::SIZE_INVALID)
        .union(Self::CAPACITY_INVALID)
        .union(Self::STRUCT_CANARY_LEFT)
        .union(Self::STRUCT_CANARY_RIGHT)
        .union(Self::STRUCT_CHECKSUM);

    /// Human-readable messages for every set bit, in bit order.
    pub fn messages(&self) -> impl Iterator<Item = &'static str> + '_ {
        VIOLATIONS
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, message)| *message)
    }
}

/// Message for every verification bit, in bit order.
pub static VIOLATIONS: [(VerifyFlags, &str); 10] = [
    (VerifyFlags::NULL_HANDLE, "stack handle is null"),
    (
        VerifyFlags::DATA_PTR_INVALID,
        "data pointer is null with non-zero size or capacity, or set on an empty stack",
    ),
    (VerifyFlags::SIZE_INVALID, "size is negative or exceeds capacity"),
    (VerifyFlags::CAPACITY_INVALID, "capacity is negative"),
    (VerifyFlags::STRUCT_CANARY_LEFT, "left struct canary damaged"),
    (VerifyFlags::STRUCT_CANARY_RIGHT, "right struct canary damaged"),
    (VerifyFlags::DATA_CANARY_LEFT, "left data canary damaged"),
    (VerifyFlags::DATA_CANARY_RIGHT, "right data canary damaged"),
    (VerifyFlags::STRUCT_CHECKSUM, "struct checksum mismatch"),
    (VerifyFlags::DATA_CHECKSUM, "data checksum mismatch"),
];

/// Checks that only read the header.
pub(crate) fn header_flags<T: PlainElement>(stack: &GuardedStack<T>) -> VerifyFlags {
    let mut flags = VerifyFlags::empty();
    let data_is_null = stack.data.is_null();
    let is_unallocated = stack.size == 0 && stack.capacity == 0;

    if data_is_null != is_unallocated {
        flags |= VerifyFlags::DATA_PTR_INVALID;
    }
    if stack.size < 0 || stack.size > stack.capacity {
        flags |= VerifyFlags::SIZE_INVALID;
    }
    if stack.capacity < 0 {
        flags |= VerifyFlags::CAPACITY_INVALID;
    }

    if stack.config.canary {
        flags |= canary::struct_canary_damage(stack.left_canary, stack.right_canary);
    }

    if stack.config.checksum && !data_is_null && struct_checksum(stack) != stack.struct_hash {
        flags |= VerifyFlags::STRUCT_CHECKSUM;
    }

    flags
}

/// Checks that dereference the payload block.
///
/// Must only be called when `header_flags()` came back empty.
fn payload_flags<T: PlainElement>(stack: &GuardedStack<T>) -> VerifyFlags {
    let mut flags = VerifyFlags::empty();
    let capacity = stack.capacity as usize;

    if stack.config.canary {
        let Some(layout) = BlockLayout::for_type::<T>(capacity, true) else {
            return VerifyFlags::CAPACITY_INVALID;
        };

        // SAFETY (PRECONDITIONS ARE MET): header is sound, so origin is the live block
        // planned for this capacity.
        if let Some(canaries) = unsafe { canary::read(stack.origin, &layout) } {
            flags |= canaries.damage();
        }
    }

    // SAFETY (PRECONDITIONS ARE MET): header is sound, so data holds capacity slots.
    if stack.config.checksum && unsafe { payload_checksum(stack.data, capacity) } != stack.data_hash {
        flags |= VerifyFlags::DATA_CHECKSUM;
    }

    flags
}

/// Full integrity check of a possibly missing stack.
pub(crate) fn verify_stack<T: PlainElement>(stack: Option<&GuardedStack<T>>) -> VerifyFlags {
    let Some(stack) = stack else {
        return VerifyFlags::NULL_HANDLE;
    };

    let flags = header_flags(stack);

    if !flags.is_empty() || stack.data.is_null() {
        return flags;
    }

    payload_flags(stack)
}
