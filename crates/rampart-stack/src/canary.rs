// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Sentinels bracketing the stack header and the payload block.

use crate::layout::BlockLayout;
use crate::verify::VerifyFlags;

/// Expected value of every left canary.
pub const LEFT_CANARY: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Expected value of every right canary.
pub const RIGHT_CANARY: u64 = 0xBAAD_F00D_FEED_FACE;

/// Values read back from a payload block.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct DataCanaries {
    pub(crate) left: u64,
    pub(crate) right: u64,
}

impl DataCanaries {
    pub(crate) fn damage(&self) -> VerifyFlags {
        let mut flags = VerifyFlags::empty();

        if self.left != LEFT_CANARY {
            flags |= VerifyFlags::DATA_CANARY_LEFT;
        }
        if self.right != RIGHT_CANARY {
            flags |= VerifyFlags::DATA_CANARY_RIGHT;
        }

        flags
    }
}

/// Compares the header canaries against their constants.
pub(crate) fn struct_canary_damage(left: u64, right: u64) -> VerifyFlags {
    let mut flags = VerifyFlags::empty();

    if left != LEFT_CANARY {
        flags |= VerifyFlags::STRUCT_CANARY_LEFT;
    }
    if right != RIGHT_CANARY {
        flags |= VerifyFlags::STRUCT_CANARY_RIGHT;
    }

    flags
}

/// Writes both payload canaries.
///
/// Does nothing for a layout planned without canaries.
///
/// # Safety
///
/// `origin` must point to a live allocation of at least `layout.size` bytes.
pub(crate) unsafe fn install(origin: *mut u8, layout: &BlockLayout) {
    if let (Some(left), Some(right)) = (layout.canary_left, layout.canary_right) {
        unsafe {
            origin.add(left).cast::<u64>().write_unaligned(LEFT_CANARY);
            origin.add(right).cast::<u64>().write_unaligned(RIGHT_CANARY);
        }
    }
}

/// Reads both payload canaries, `None` for a layout without canaries.
///
/// # Safety
///
/// `origin` must point to a live allocation of at least `layout.size` bytes.
pub(crate) unsafe fn read(origin: *const u8, layout: &BlockLayout) -> Option<DataCanaries> {
    match (layout.canary_left, layout.canary_right) {
        (Some(left), Some(right)) => unsafe {
            Some(DataCanaries {
                left: origin.add(left).cast::<u64>().read_unaligned(),
                right: origin.add(right).cast::<u64>().read_unaligned(),
            })
        },
        _ => None,
    }
}
