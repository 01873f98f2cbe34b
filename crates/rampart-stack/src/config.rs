// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Runtime selection of the active protections.

/// What happens after a diagnostic dump has been written.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum DumpAction {
    /// Return to the caller, which then sees the error.
    #[default]
    Continue = 0,
    /// Abort the process (SIGABRT on unix).
    Abort = 1,
    /// Exit the process with the verification mask as status.
    Exit = 2,
}

/// Protections attached to a stack at construction.
///
/// Every guard branches on these flags, so a disabled protection costs
/// neither memory nor time. The flags are folded into the header checksum:
/// flipping one after construction is reported as header corruption.
///
/// # Example
///
/// ```rust
/// use rampart_stack::{DumpAction, GuardConfig};
///
/// let config = GuardConfig::default()
///     .with_poison(false)
///     .with_dump_action(DumpAction::Abort);
///
/// assert!(config.canary);
/// assert!(!config.poison);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GuardConfig {
    /// Write a diagnostic dump when verification fails.
    pub dump_on_failure: bool,
    /// Fill dead slots with the poison pattern.
    pub poison: bool,
    /// Terminal action once a dump has been written.
    pub dump_action: DumpAction,
    /// Write a diagnostic dump on pop from an empty stack.
    pub dump_on_invalid_pop: bool,
    /// Bracket the header and the payload with canaries.
    pub canary: bool,
    /// Keep header and payload checksums.
    pub checksum: bool,
}

impl GuardConfig {
    /// Every protection on, dumps return to the caller.
    pub const fn paranoid() -> Self {
        Self {
            dump_on_failure: true,
            poison: true,
            dump_action: DumpAction::Continue,
            dump_on_invalid_pop: true,
            canary: true,
            checksum: true,
        }
    }

    /// Every protection off. Only the structural invariants are checked.
    pub const fn unguarded() -> Self {
        Self {
            dump_on_failure: false,
            poison: false,
            dump_action: DumpAction::Continue,
            dump_on_invalid_pop: false,
            canary: false,
            checksum: false,
        }
    }

    /// Toggles dumping on verification failure.
    pub const fn with_dump_on_failure(mut self, enabled: bool) -> Self {
        self.dump_on_failure = enabled;
        self
    }

    /// Toggles poison fill.
    pub const fn with_poison(mut self, enabled: bool) -> Self {
        self.poison = enabled;
        self
    }

    /// Sets the terminal action after a dump.
    pub const fn with_dump_action(mut self, action: DumpAction) -> Self {
        self.dump_action = action;
        self
    }

    /// Toggles dumping on pop from an empty stack.
    pub const fn with_dump_on_invalid_pop(mut self, enabled: bool) -> Self {
        self.dump_on_invalid_pop = enabled;
        self
    }

    /// Toggles header and payload canaries.
    pub const fn with_canary(mut self, enabled: bool) -> Self {
        self.canary = enabled;
        self
    }

    /// Toggles header and payload checksums.
    pub const fn with_checksum(mut self, enabled: bool) -> Self {
        self.checksum = enabled;
        self
    }

    /// Packs the flags for hashing.
    pub(crate) const fn bits(&self) -> u32 {
        (self.dump_on_failure as u32)
            | (self.poison as u32) << 1
            | (self.dump_on_invalid_pop as u32) << 2
            | (self.canary as u32) << 3
            | (self.checksum as u32) << 4
            | (self.dump_action as u32) << 5
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::paranoid()
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

impl core::fmt::Display for GuardConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "canary={} checksum={} poison={} dump_on_failure={} dump_on_invalid_pop={} action={:?}",
            on_off(self.canary),
            on_off(self.checksum),
            on_off(self.poison),
            on_off(self.dump_on_failure),
            on_off(self.dump_on_invalid_pop),
            self.dump_action,
        )
    }
}
