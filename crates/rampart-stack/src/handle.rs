// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Nullable-handle API.
//!
//! The same operations as the [`GuardedStack`] methods, taking
//! `Option<&mut GuardedStack<T>>` so that pointer-based callers can forward
//! a possibly-null stack pointer unchanged. A missing handle is always
//! reported, never dereferenced.
//!
//! # Example
//!
//! ```rust
//! use rampart_stack::{GuardConfig, GuardedStack, StackError, VerifyFlags, handle, provenance};
//!
//! let mut stack = GuardedStack::<i32>::new(GuardConfig::default());
//!
//! handle::push(Some(&mut stack), 7).expect("Failed to push(..)");
//! assert_eq!(handle::pop(Some(&mut stack)), Ok(7));
//!
//! assert_eq!(handle::verify::<i32>(None), VerifyFlags::NULL_HANDLE);
//! assert_eq!(
//!     handle::construct::<i32>(None, GuardConfig::default(), provenance!("missing")),
//!     Err(StackError::NullHandle)
//! );
//! ```

use core::panic::Location;

use crate::config::GuardConfig;
use crate::element::PlainElement;
use crate::error::StackError;
use crate::provenance::Provenance;
use crate::report;
use crate::stack::GuardedStack;
use crate::verify::{VerifyFlags, verify_stack};

fn null_handle(operation: &'static str) {
    tracing::error!(operation, "null stack handle");
}

/// Re-initializes the stack behind `stack`.
pub fn construct<T: PlainElement>(
    stack: Option<&mut GuardedStack<T>>,
    config: GuardConfig,
    provenance: Provenance,
) -> Result<(), StackError> {
    let Some(stack) = stack else {
        null_handle("construct");
        return Err(StackError::NullHandle);
    };

    stack.construct(config, provenance);
    Ok(())
}

/// Destroys the stack behind `stack`. Idempotent.
pub fn destruct<T: PlainElement>(stack: Option<&mut GuardedStack<T>>) -> Result<(), StackError> {
    let Some(stack) = stack else {
        null_handle("destruct");
        return Err(StackError::NullHandle);
    };

    stack.destruct();
    Ok(())
}

/// Pushes `value` onto the stack behind `stack`.
#[track_caller]
pub fn push<T: PlainElement>(stack: Option<&mut GuardedStack<T>>, value: T) -> Result<(), StackError> {
    let Some(stack) = stack else {
        null_handle("push");
        return Err(StackError::VerificationFailed(VerifyFlags::NULL_HANDLE));
    };

    stack.push(value)
}

/// Pops the top element of the stack behind `stack`.
#[track_caller]
pub fn pop<T: PlainElement>(stack: Option<&mut GuardedStack<T>>) -> Result<T, StackError> {
    let Some(stack) = stack else {
        null_handle("pop");
        return Err(StackError::VerificationFailed(VerifyFlags::NULL_HANDLE));
    };

    stack.pop()
}

/// Pops the top element of the stack behind `stack` into `slot`.
#[track_caller]
pub fn pop_into<T: PlainElement>(
    stack: Option<&mut GuardedStack<T>>,
    slot: Option<&mut T>,
) -> Result<(), StackError> {
    let Some(stack) = stack else {
        null_handle("pop_into");
        return Err(StackError::VerificationFailed(VerifyFlags::NULL_HANDLE));
    };

    stack.pop_into(slot)
}

/// Verifies the stack behind `stack`; `NULL_HANDLE` alone when missing.
pub fn verify<T: PlainElement>(stack: Option<&GuardedStack<T>>) -> VerifyFlags {
    verify_stack(stack)
}

/// Dumps the stack behind `stack`, or a report stating the handle is null.
#[track_caller]
pub fn dump<T: PlainElement>(stack: Option<&GuardedStack<T>>, flags: VerifyFlags) {
    report::dump(stack, flags, Location::caller());
}
