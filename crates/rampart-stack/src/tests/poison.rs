// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::poison::{is_poisoned, poison_slots};
use crate::tests::support::{Sample, quiet_paranoid, stack_with};
use crate::{GuardConfig, POISON_BYTE, poison_value};

fn slot<T: crate::PlainElement>(stack: &crate::GuardedStack<T>, index: usize) -> T {
    assert!(index < stack.capacity());
    unsafe { stack.data.add(index).read() }
}

// =============================================================================
// poison_value()
// =============================================================================

#[test]
fn test_poison_value_replicates_pattern() {
    assert_eq!(poison_value::<u8>(), POISON_BYTE);
    assert_eq!(poison_value::<u32>(), 0xAAAA_AAAA);
    assert_eq!(poison_value::<i64>(), 0xAAAA_AAAA_AAAA_AAAAu64 as i64);
    assert_eq!(poison_value::<f64>().to_bits(), 0xAAAA_AAAA_AAAA_AAAA);
    assert_eq!(poison_value::<[u16; 3]>(), [0xAAAA; 3]);
}

// =============================================================================
// is_poisoned()
// =============================================================================

#[test]
fn test_is_poisoned() {
    assert!(is_poisoned(&0xAAAA_AAAAu32));
    assert!(is_poisoned(&poison_value::<Sample>()));
    assert!(!is_poisoned(&0xAAAA_AAABu32));
    assert!(!is_poisoned(&0u64));
}

// =============================================================================
// poison_slots()
// =============================================================================

#[test]
fn test_poison_slots_range_only() {
    let mut slots = [1u32, 2, 3, 4, 5];

    unsafe { poison_slots(slots.as_mut_ptr(), 1, 3) };

    assert_eq!(slots, [1, 0xAAAA_AAAA, 0xAAAA_AAAA, 4, 5]);
}

#[test]
fn test_poison_slots_empty_range_is_noop() {
    let mut slots = [7u16; 4];

    unsafe { poison_slots(slots.as_mut_ptr(), 2, 2) };
    unsafe { poison_slots(slots.as_mut_ptr(), 3, 1) };

    assert_eq!(slots, [7; 4]);
}

// =============================================================================
// stack integration
// =============================================================================

#[test]
fn test_fresh_slots_poisoned_after_growth() {
    let stack = stack_with::<u32>(quiet_paranoid(), &[1, 2, 3, 4, 5]);

    assert_eq!(stack.capacity(), 8);
    for index in 5..8 {
        assert!(is_poisoned(&slot(&stack, index)), "slot {index} not poisoned");
    }
}

#[test]
fn test_popped_slot_poisoned() {
    let mut stack = stack_with::<u64>(quiet_paranoid(), &[1, 2, 3, 4]);

    assert_eq!(stack.pop(), Ok(4));

    assert_eq!(stack.capacity(), 4);
    assert!(is_poisoned(&slot(&stack, 3)));
    assert_eq!(slot(&stack, 2), 3);
}

#[test]
fn test_every_dead_slot_poisoned_after_draining() {
    let mut stack = stack_with::<Sample>(
        quiet_paranoid(),
        &[
            Sample { i: 1, c: 2, d: 3.0 },
            Sample { i: 4, c: 5, d: 6.0 },
            Sample { i: 7, c: 8, d: 9.0 },
        ],
    );

    while !stack.is_empty() {
        stack.pop().expect("Failed to pop()");
    }

    for index in 0..stack.capacity() {
        assert!(is_poisoned(&slot(&stack, index)), "slot {index} not poisoned");
    }
}

#[test]
fn test_no_poison_when_disabled() {
    let mut stack = stack_with::<u32>(GuardConfig::unguarded(), &[1, 2, 3]);

    assert_eq!(stack.capacity(), 4);
    // Fresh slots stay zeroed.
    assert_eq!(slot(&stack, 3), 0);

    stack.pop().expect("Failed to pop()");
    assert_eq!(slot(&stack, 2), 3);
}
