// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;

use crate::{GuardConfig, GuardedStack, PlainElement};

/// Padding-free record used by the demo driver as well.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub(crate) struct Sample {
    pub(crate) i: i32,
    pub(crate) c: u32,
    pub(crate) d: f64,
}

// SAFETY: repr(C), 4 + 4 + 8 bytes with no padding, every field accepts any bits.
unsafe impl PlainElement for Sample {}

pub(crate) fn format_sample(value: &Sample, out: &mut dyn fmt::Write) -> fmt::Result {
    write!(out, "{{i = {}, d = {}, c = {}}}", value.i, value.d, value.c)
}

/// Paranoid config that keeps dumps out of the test output.
pub(crate) fn quiet_paranoid() -> GuardConfig {
    GuardConfig::paranoid()
        .with_dump_on_failure(false)
        .with_dump_on_invalid_pop(false)
}

pub(crate) fn stack_with<T: PlainElement>(config: GuardConfig, values: &[T]) -> GuardedStack<T> {
    let mut stack = GuardedStack::new(config);

    for value in values {
        stack.push(*value).expect("Failed to push(..)");
    }

    stack
}
