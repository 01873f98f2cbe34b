// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use alloc::string::String;
use core::fmt;
use core::panic::Location;

use crate::canary::{LEFT_CANARY, RIGHT_CANARY};
use crate::checksum::{payload_checksum, struct_checksum};
use crate::config::GuardConfig;
use crate::element::PlainElement;
use crate::error::StackError;
use crate::growth::{grown_capacity, needs_grow, needs_shrink, shrunk_capacity};
use crate::layout::BlockLayout;
use crate::poison::poison_slots;
use crate::provenance::Provenance;
use crate::report;
use crate::verify::{VerifyFlags, verify_stack};

/// Renders one element into a diagnostic dump.
pub type ElementFormatter<T> = fn(&T, &mut dyn fmt::Write) -> fmt::Result;

/// Test-only failure injection for [`GuardedStack`].
///
/// Allows testing allocation-failure paths without exhausting memory. The
/// behaviour is sticky: it stays active until changed back to `None`.
///
/// # Example
///
/// ```rust,ignore
/// use rampart_stack::{GuardConfig, GuardedStack, StackBehaviour, StackError};
///
/// let mut stack = GuardedStack::<u8>::new(GuardConfig::default());
/// stack.change_behaviour(StackBehaviour::FailAtAlloc);
///
/// // The first push needs a block.
/// assert_eq!(stack.push(1), Err(StackError::AllocationFailed));
///
/// stack.change_behaviour(StackBehaviour::None);
/// assert!(stack.push(1).is_ok());
/// ```
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackBehaviour {
    /// Normal behaviour, no injected failures.
    #[default]
    None,
    /// Every payload (re)allocation fails with `AllocationFailed`.
    FailAtAlloc,
}

/// Self-verifying LIFO stack of plain elements.
///
/// # Memory layout
///
/// The header is `#[repr(C)]` and bracketed by two canaries. Every field
/// except the failure-injection behaviour is covered by the struct checksum. The payload lives in one heap block starting at `origin`, with
/// slot 0 at `data` (see [`BlockLayout`]).
///
/// # Guarantees
///
/// - Every mutation verifies first and is all-or-nothing.
/// - Dead slots hold the poison pattern when poisoning is enabled.
/// - A destroyed stack fails verification instead of touching freed memory.
#[repr(C)]
pub struct GuardedStack<T: PlainElement> {
    pub(crate) left_canary: u64,
    pub(crate) data: *mut T,
    pub(crate) origin: *mut u8,
    pub(crate) size: isize,
    pub(crate) capacity: isize,
    pub(crate) data_hash: u32,
    pub(crate) struct_hash: u32,
    pub(crate) config: GuardConfig,
    pub(crate) provenance: Provenance,
    pub(crate) formatter: Option<ElementFormatter<T>>,
    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) behaviour: StackBehaviour,
    pub(crate) right_canary: u64,
}

impl<T: PlainElement> GuardedStack<T> {
    /// Creates an empty stack, recording the caller as its provenance.
    ///
    /// No memory is allocated until the first push.
    #[track_caller]
    pub fn new(config: GuardConfig) -> Self {
        Self::with_provenance(config, Provenance::caller("stack"))
    }

    /// Creates an empty stack with explicit provenance.
    ///
    /// See [`provenance!`](crate::provenance!) and
    /// [`guarded_stack!`](crate::guarded_stack!).
    pub fn with_provenance(config: GuardConfig, provenance: Provenance) -> Self {
        let mut stack = Self {
            left_canary: 0,
            data: core::ptr::null_mut(),
            origin: core::ptr::null_mut(),
            size: 0,
            capacity: 0,
            data_hash: 0,
            struct_hash: 0,
            config,
            provenance,
            formatter: None,
            #[cfg(any(test, feature = "test-utils"))]
            behaviour: StackBehaviour::default(),
            right_canary: 0,
        };

        stack.reset_empty();
        stack
    }

    /// Re-initializes the stack in place.
    ///
    /// Any live payload block is scrubbed and freed first. Works on fresh and
    /// destroyed stacks alike; the formatter is kept.
    pub fn construct(&mut self, config: GuardConfig, provenance: Provenance) {
        self.release_block();

        self.config = config;
        self.provenance = provenance;
        self.reset_empty();
    }

    /// Frees the payload and leaves the header in the destroyed state.
    ///
    /// The destroyed state (null pointers, size and capacity of `-1`) fails
    /// verification, so any later use is caught. Calling it again performs no
    /// allocator operation.
    pub fn destruct(&mut self) {
        let had_block = !self.origin.is_null();
        self.release_block();

        self.data = core::ptr::null_mut();
        self.origin = core::ptr::null_mut();
        self.size = -1;
        self.capacity = -1;
        self.data_hash = 0;
        self.struct_hash = 0;
        if self.config.checksum {
            self.struct_hash = struct_checksum(self);
        }

        if had_block {
            tracing::debug!(name = self.provenance.name, "stack destroyed");
        }
    }

    fn reset_empty(&mut self) {
        let (left, right) = if self.config.canary {
            (LEFT_CANARY, RIGHT_CANARY)
        } else {
            (0, 0)
        };

        self.left_canary = left;
        self.right_canary = right;
        self.data = core::ptr::null_mut();
        self.origin = core::ptr::null_mut();
        self.size = 0;
        self.capacity = 0;
        self.data_hash = 0;
        self.struct_hash = 0;
        self.refresh_checksums();

        tracing::debug!(
            name = self.provenance.name,
            file = self.provenance.file,
            line = self.provenance.line,
            "stack constructed"
        );
    }

    /// Pushes `value` on top, growing the payload when full.
    ///
    /// # Errors
    ///
    /// - [`StackError::VerificationFailed`] if the stack is damaged.
    /// - [`StackError::AllocationFailed`] if growing fails; the stack is left
    ///   untouched.
    #[track_caller]
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        self.ensure_valid()?;

        let size = self.size as usize;
        let capacity = self.capacity as usize;

        if needs_grow(size, capacity) {
            let new_capacity = grown_capacity(capacity).ok_or(StackError::AllocationFailed)?;
            self.reallocate(new_capacity, size)?;
        }

        // SAFETY (PRECONDITIONS ARE MET): size < capacity after growth, data holds capacity slots.
        unsafe { self.data.add(size).write(value) };
        self.size += 1;
        self.refresh_checksums();

        Ok(())
    }

    /// Removes and returns the top element.
    ///
    /// # Errors
    ///
    /// - [`StackError::VerificationFailed`] if the stack is damaged.
    /// - [`StackError::EmptyPop`] on an empty stack (dumped when
    ///   `dump_on_invalid_pop` is set).
    /// - [`StackError::AllocationFailed`] if shrinking fails; the element
    ///   stays on the stack.
    #[track_caller]
    pub fn pop(&mut self) -> Result<T, StackError> {
        self.ensure_valid()?;
        self.take_top()
    }

    /// Pops the top element into `slot`.
    ///
    /// Same as [`pop()`](Self::pop), plus [`StackError::NullOutputSlot`] when
    /// `slot` is `None`. The stack is verified before the slot is checked.
    #[track_caller]
    pub fn pop_into(&mut self, slot: Option<&mut T>) -> Result<(), StackError> {
        self.ensure_valid()?;

        let Some(slot) = slot else {
            tracing::error!(name = self.provenance.name, "pop without output slot");
            return Err(StackError::NullOutputSlot);
        };

        *slot = self.take_top()?;
        Ok(())
    }

    #[track_caller]
    fn take_top(&mut self) -> Result<T, StackError> {
        if self.size == 0 {
            tracing::warn!(name = self.provenance.name, "pop on empty stack");
            if self.config.dump_on_invalid_pop {
                self.dump(VerifyFlags::empty());
            }
            return Err(StackError::EmptyPop);
        }

        let new_size = self.size as usize - 1;
        let capacity = self.capacity as usize;

        // SAFETY (PRECONDITIONS ARE MET): new_size < size <= capacity.
        let value = unsafe { self.data.add(new_size).read() };

        if needs_shrink(new_size, capacity) {
            // Poisons new_size..new_capacity, the popped slot included.
            self.reallocate(shrunk_capacity(capacity), new_size)?;
        } else if self.config.poison {
            // SAFETY (PRECONDITIONS ARE MET): new_size + 1 <= capacity.
            unsafe { poison_slots(self.data, new_size, new_size + 1) };
        }

        self.size = new_size as isize;
        self.refresh_checksums();

        Ok(value)
    }

    /// Returns a copy of the top element without removing it.
    ///
    /// # Errors
    ///
    /// [`StackError::VerificationFailed`] if the stack is damaged.
    #[track_caller]
    pub fn peek(&self) -> Result<Option<T>, StackError> {
        self.ensure_valid()?;

        if self.size == 0 {
            return Ok(None);
        }

        // SAFETY (PRECONDITIONS ARE MET): verified, so size - 1 < capacity.
        Ok(Some(unsafe { self.data.add(self.size as usize - 1).read() }))
    }

    /// Runs every enabled check. Empty means healthy.
    pub fn verify(&self) -> VerifyFlags {
        verify_stack(Some(self))
    }

    /// Writes a diagnostic report to stderr, then runs the configured
    /// [`DumpAction`](crate::DumpAction).
    ///
    /// `flags` is reported as the reason for the dump; pass
    /// [`VerifyFlags::empty()`] for an on-demand dump.
    #[track_caller]
    pub fn dump(&self, flags: VerifyFlags) {
        report::dump(Some(self), flags, Location::caller());
    }

    /// Renders the diagnostic report into `out`.
    #[track_caller]
    pub fn dump_to(&self, out: &mut dyn fmt::Write, flags: VerifyFlags) -> fmt::Result {
        report::render(out, Some(self), flags, Location::caller())
    }

    /// Renders the diagnostic report into a string.
    #[track_caller]
    pub fn render_report(&self, flags: VerifyFlags) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = report::render(&mut out, Some(self), flags, Location::caller());
        out
    }

    /// Number of live elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        usize::try_from(self.size).unwrap_or(0)
    }

    /// Returns `true` when no element is live.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated slots.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or(0)
    }

    /// Protections this stack was constructed with.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Where this stack was constructed.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Sets the callback used to render slots in diagnostic dumps.
    ///
    /// The header checksum is only refreshed when it matched before, so
    /// existing header damage stays detectable.
    pub fn set_formatter(&mut self, formatter: Option<ElementFormatter<T>>) {
        let intact = !self.config.checksum || struct_checksum(self) == self.struct_hash;

        self.formatter = formatter;

        if self.config.checksum && intact {
            self.struct_hash = struct_checksum(self);
        }
    }

    /// Layout of the current payload block, `None` while unallocated.
    pub fn block_layout(&self) -> Option<BlockLayout> {
        if self.data.is_null() {
            return None;
        }

        let capacity = usize::try_from(self.capacity).ok()?;
        BlockLayout::for_type::<T>(capacity, self.config.canary)
    }

    /// Changes the failure-injection behaviour.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn change_behaviour(&mut self, behaviour: StackBehaviour) {
        self.behaviour = behaviour;
    }

    /// Raw start of the payload allocation, for corruption tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn origin_ptr_mut(&mut self) -> *mut u8 {
        self.origin
    }

    /// Verifies, logs and dumps on failure.
    #[track_caller]
    pub(crate) fn ensure_valid(&self) -> Result<(), StackError> {
        let flags = self.verify();

        if flags.is_empty() {
            return Ok(());
        }

        // The name lives behind header pointers that may be damaged.
        tracing::error!(
            stack = ?core::ptr::from_ref(self),
            mask = flags.bits(),
            "stack verification failed"
        );

        if self.config.dump_on_failure {
            self.dump(flags);
        }

        Err(StackError::VerificationFailed(flags))
    }

    /// Recomputes the payload digest, then the header digest over it.
    pub(crate) fn refresh_checksums(&mut self) {
        if !self.config.checksum {
            return;
        }

        let capacity = usize::try_from(self.capacity).unwrap_or(0);

        // SAFETY (PRECONDITIONS ARE MET): a non-null data always holds capacity slots
        // when this runs, every slot either written, poisoned or zeroed.
        self.data_hash = unsafe { payload_checksum(self.data, capacity) };
        self.struct_hash = struct_checksum(self);
    }
}

impl<T: PlainElement> Drop for GuardedStack<T> {
    fn drop(&mut self) {
        self.destruct();
    }
}

impl<T: PlainElement> fmt::Debug for GuardedStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedStack")
            .field("name", &self.provenance.name)
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("data", &self.data)
            .field("origin", &self.origin)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
