// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Self-verifying LIFO stack for hunting heap corruption.
//!
//! `GuardedStack<T>` is a growable stack whose every mutation is preceded by
//! an integrity check and followed by a refresh of its guards. It is meant to
//! sit next to low-level, non-memory-safe code and fail as close as possible
//! to the point where something scribbled over memory it does not own.
//!
//! # Protections
//!
//! Each protection is a runtime flag in [`GuardConfig`]:
//!
//! - **Canaries**: fixed sentinels bracket the stack header and the payload
//!   block. Out-of-bounds writes next to either region damage them.
//! - **Checksums**: MurmurHash3 digests over the header and the whole payload
//!   capacity catch in-bounds corruption that canaries cannot see.
//! - **Poison fill**: dead slots are overwritten with `0xAA` so stale reads
//!   stand out, and the diagnostic dump can tell poison from garbage.
//! - **Diagnostic dump**: a full decoded report is written to stderr when a
//!   check fails, optionally followed by aborting or exiting the process.
//!
//! # Example
//!
//! ```rust
//! use rampart_stack::{GuardConfig, GuardedStack, StackError};
//!
//! fn example() -> Result<(), StackError> {
//!     let mut stack = GuardedStack::<u32>::new(GuardConfig::default());
//!
//!     stack.push(1)?;
//!     stack.push(2)?;
//!     stack.push(3)?;
//!
//!     assert_eq!(stack.pop()?, 3);
//!     assert_eq!(stack.pop()?, 2);
//!     assert_eq!(stack.pop()?, 1);
//!     assert_eq!(stack.pop(), Err(StackError::EmptyPop));
//!
//!     assert!(stack.verify().is_empty());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Nullable handles
//!
//! The [`handle`] module exposes the same operations over
//! `Option<&mut GuardedStack<T>>` for callers that bridge from pointer-based
//! code, where a missing stack is reported as [`StackError::NullHandle`] or
//! [`VerifyFlags::NULL_HANDLE`].
//!
//! # Threading
//!
//! The stack is strictly single-threaded. It holds raw pointers and is
//! neither `Send` nor `Sync`; concurrent users must bring their own locking.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

extern crate alloc;

mod canary;
mod checksum;
mod config;
mod element;
mod error;
mod growth;
mod layout;
mod poison;
mod provenance;
mod report;
mod stack;
mod verify;

pub mod handle;

#[cfg(test)]
mod tests;

pub use canary::{LEFT_CANARY, RIGHT_CANARY};
pub use checksum::{CHECKSUM_SEED, murmur3_32};
pub use config::{DumpAction, GuardConfig};
pub use element::PlainElement;
pub use error::StackError;
pub use growth::GROWTH_MULTIPLIER;
pub use layout::{BlockLayout, CANARY_ALIGN, CANARY_SIZE};
pub use poison::{POISON_BYTE, poison_value};
pub use provenance::Provenance;
pub use stack::{ElementFormatter, GuardedStack};
pub use verify::{VIOLATIONS, VerifyFlags};

#[cfg(any(test, feature = "test-utils"))]
pub use stack::StackBehaviour;
