// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Construction-site metadata shown in diagnostic dumps.

use core::fmt;
use core::panic::Location;

/// Name and source location a stack was constructed at.
///
/// Purely informational: it never influences behaviour. The header checksum
/// covers its string addresses and line, so a dump only prints it from a
/// sound header.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Provenance {
    /// Variable or logical name of the stack.
    pub name: &'static str,
    /// Source file of the construction site.
    pub file: &'static str,
    /// Source line of the construction site.
    pub line: u32,
    /// Enclosing module path, or `"?"` when unknown.
    pub function: &'static str,
}

impl Provenance {
    /// Builds a provenance from its parts.
    pub const fn new(
        name: &'static str,
        file: &'static str,
        line: u32,
        function: &'static str,
    ) -> Self {
        Self {
            name,
            file,
            line,
            function,
        }
    }

    /// Provenance of the calling location.
    #[track_caller]
    pub fn caller(name: &'static str) -> Self {
        let location = Location::caller();
        Self::new(name, location.file(), location.line(), "?")
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" constructed at {}:{} in {}",
            self.name, self.file, self.line, self.function
        )
    }
}

/// Captures a [`Provenance`] at the invocation site.
///
/// # Example
///
/// ```rust
/// use rampart_stack::provenance;
///
/// let provenance = provenance!("numbers");
///
/// assert_eq!(provenance.name, "numbers");
/// assert_eq!(provenance.file, file!());
/// ```
#[macro_export]
macro_rules! provenance {
    ($name:expr) => {
        $crate::Provenance::new($name, file!(), line!(), module_path!())
    };
}

/// Creates a [`GuardedStack`](crate::GuardedStack) named after its binding.
///
/// # Example
///
/// ```rust
/// use rampart_stack::{GuardConfig, guarded_stack};
///
/// let paranoid = guarded_stack!(numbers: u32);
/// let quiet = guarded_stack!(samples: f64, GuardConfig::unguarded());
///
/// assert_eq!(paranoid.provenance().name, "numbers");
/// assert!(!quiet.config().canary);
/// ```
#[macro_export]
macro_rules! guarded_stack {
    ($name:ident : $ty:ty) => {
        $crate::guarded_stack!($name: $ty, $crate::GuardConfig::default())
    };
    ($name:ident : $ty:ty, $config:expr) => {
        $crate::GuardedStack::<$ty>::with_provenance(
            $config,
            $crate::provenance!(stringify!($name)),
        )
    };
}
