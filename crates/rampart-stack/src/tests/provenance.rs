// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::{GuardConfig, Provenance, guarded_stack, provenance};

#[test]
fn test_provenance_macro_captures_site() {
    let line = line!() + 1;
    let provenance = provenance!("stk");

    assert_eq!(provenance.name, "stk");
    assert_eq!(provenance.file, file!());
    assert_eq!(provenance.line, line);
    assert_eq!(provenance.function, module_path!());
}

#[test]
fn test_caller() {
    let line = line!() + 1;
    let provenance = Provenance::caller("stk");

    assert_eq!(provenance.file, file!());
    assert_eq!(provenance.line, line);
    assert_eq!(provenance.function, "?");
}

#[test]
fn test_display() {
    let provenance = Provenance::new("stk", "src/main.rs", 12, "driver");

    assert_eq!(
        provenance.to_string(),
        "\"stk\" constructed at src/main.rs:12 in driver"
    );
}

#[test]
fn test_guarded_stack_macro() {
    let numbers = guarded_stack!(numbers: u32);
    let samples = guarded_stack!(samples: f64, GuardConfig::unguarded());

    assert_eq!(numbers.provenance().name, "numbers");
    assert_eq!(*numbers.config(), GuardConfig::default());
    assert_eq!(samples.provenance().name, "samples");
    assert_eq!(*samples.config(), GuardConfig::unguarded());
}
