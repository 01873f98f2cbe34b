// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for Rampart crates.
//!
//! ## License
//!
//! GPL-3.0-only

mod corruption;
mod subprocess;

pub use corruption::{flip_byte, flip_byte_in_place};
pub use subprocess::{
    MISSING_TEST_CODE, SubprocessOutcome, run_test_as_subprocess, run_test_as_subprocess_outcome,
};
