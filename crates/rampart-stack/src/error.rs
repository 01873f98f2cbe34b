// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for rampart-stack.

use thiserror::Error;

use crate::verify::VerifyFlags;

/// Errors returned by stack operations.
///
/// Every error is raised before any state is touched: an operation either
/// completes fully or leaves the stack exactly as it found it.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum StackError {
    /// No stack was supplied to a handle-level operation.
    #[error("null stack handle")]
    NullHandle,

    /// The integrity check failed; carries every violated invariant.
    #[error("stack verification failed (mask {:#06x})", .0.bits())]
    VerificationFailed(VerifyFlags),

    /// No output slot was supplied to `pop_into()`.
    #[error("null output slot for popped value")]
    NullOutputSlot,

    /// The payload block could not be (re)allocated.
    #[error("payload reallocation failed")]
    AllocationFailed,

    /// Pop on an empty stack.
    #[error("pop on empty stack")]
    EmptyPop,
}

impl StackError {
    /// Numeric code of the error, stable across releases.
    pub const fn code(&self) -> u8 {
        match self {
            Self::NullHandle => 1,
            Self::VerificationFailed(_) => 2,
            Self::NullOutputSlot => 3,
            Self::AllocationFailed => 4,
            Self::EmptyPop => 5,
        }
    }

    /// Violation mask when this is a `VerificationFailed` error.
    pub const fn flags(&self) -> Option<VerifyFlags> {
        match self {
            Self::VerificationFailed(flags) => Some(*flags),
            _ => None,
        }
    }
}
