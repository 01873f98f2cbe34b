// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::growth::{grown_capacity, needs_grow, needs_shrink, shrunk_capacity};
use crate::tests::support::{quiet_paranoid, stack_with};
use crate::{GuardConfig, GuardedStack, StackBehaviour, StackError};

// =============================================================================
// policy
// =============================================================================

#[test]
fn test_needs_grow() {
    assert!(needs_grow(0, 0));
    assert!(needs_grow(4, 4));
    assert!(!needs_grow(3, 4));
}

#[test]
fn test_grown_capacity() {
    assert_eq!(grown_capacity(0), Some(1));
    assert_eq!(grown_capacity(1), Some(2));
    assert_eq!(grown_capacity(4), Some(8));
    assert_eq!(grown_capacity(usize::MAX), None);
}

#[test]
fn test_needs_shrink() {
    assert!(!needs_shrink(0, 8));
    assert!(needs_shrink(2, 8));
    assert!(!needs_shrink(3, 8));
    assert!(needs_shrink(1, 4));
    assert!(!needs_shrink(usize::MAX, 8));
}

#[test]
fn test_shrunk_capacity() {
    assert_eq!(shrunk_capacity(8), 4);
    assert_eq!(shrunk_capacity(2), 1);
}

// =============================================================================
// growth on push
// =============================================================================

#[test]
fn test_push_visits_power_of_two_capacities() {
    let mut stack = GuardedStack::<u8>::new(quiet_paranoid());
    let mut capacities = vec![stack.capacity()];

    for value in 1..=5u8 {
        stack.push(value).expect("Failed to push(..)");
        capacities.push(stack.capacity());
    }

    assert_eq!(capacities, [0, 1, 2, 4, 4, 8]);
}

#[test]
fn test_growth_keeps_live_elements() {
    let values: Vec<u64> = (0..33).map(|i| i * 1_000_003).collect();
    let stack = stack_with::<u64>(quiet_paranoid(), &values);

    assert_eq!(stack.capacity(), 64);
    let live = unsafe { core::slice::from_raw_parts(stack.data, stack.len()) };
    assert_eq!(live, values.as_slice());
    assert!(stack.verify().is_empty());
}

#[test]
fn test_growth_without_canaries_places_data_at_origin() {
    let stack = stack_with::<u32>(GuardConfig::unguarded(), &[1, 2, 3]);

    assert_eq!(stack.data as *mut u8, stack.origin);
}

#[test]
fn test_growth_with_canaries_offsets_data() {
    let stack = stack_with::<u32>(quiet_paranoid(), &[1, 2, 3]);

    assert_eq!(stack.data as usize - stack.origin as usize, 8);
}

// =============================================================================
// shrink on pop
// =============================================================================

#[test]
fn test_pop_shrinks_at_quarter_occupancy() {
    let mut stack = stack_with::<u32>(quiet_paranoid(), &[1, 2, 3, 4, 5]);
    let mut capacities = Vec::new();

    assert_eq!(stack.capacity(), 8);
    for _ in 0..5 {
        stack.pop().expect("Failed to pop()");
        capacities.push(stack.capacity());
    }

    assert_eq!(capacities, [8, 8, 4, 2, 2]);
    assert!(stack.verify().is_empty());
}

#[test]
fn test_shrink_keeps_remaining_elements() {
    let mut stack = stack_with::<i32>(quiet_paranoid(), &[10, 20, 30, 40, 50, 60, 70, 80, 90]);

    assert_eq!(stack.capacity(), 16);
    for expected in [90, 80, 70, 60, 50, 40] {
        assert_eq!(stack.pop(), Ok(expected));
    }

    assert_eq!(stack.capacity(), 8);
    assert_eq!(stack.pop(), Ok(30));
    assert_eq!(stack.capacity(), 4);
    assert_eq!(stack.pop(), Ok(20));
    assert_eq!(stack.pop(), Ok(10));
}

#[test]
fn test_no_thrashing_at_boundary() {
    let mut stack = stack_with::<u32>(quiet_paranoid(), &[1, 2, 3, 4, 5]);
    let origin = stack.origin;

    for _ in 0..16 {
        stack.pop().expect("Failed to pop()");
        stack.push(5).expect("Failed to push(..)");

        assert_eq!(stack.capacity(), 8);
        assert_eq!(stack.origin, origin);
    }
}

// =============================================================================
// allocation failure
// =============================================================================

#[test]
fn test_failed_growth_leaves_stack_untouched() {
    let mut stack = stack_with::<u32>(quiet_paranoid(), &[1, 2, 3, 4]);
    let (data, origin, data_hash, struct_hash) =
        (stack.data, stack.origin, stack.data_hash, stack.struct_hash);

    stack.change_behaviour(StackBehaviour::FailAtAlloc);
    assert_eq!(stack.push(5), Err(StackError::AllocationFailed));

    assert_eq!(stack.len(), 4);
    assert_eq!(stack.capacity(), 4);
    assert_eq!(stack.data, data);
    assert_eq!(stack.origin, origin);
    assert_eq!(stack.data_hash, data_hash);
    assert_eq!(stack.struct_hash, struct_hash);
    assert!(stack.verify().is_empty());

    stack.change_behaviour(StackBehaviour::None);
    stack.push(5).expect("Failed to push(..)");
    assert_eq!(stack.capacity(), 8);
}

#[test]
fn test_failed_first_allocation() {
    let mut stack = GuardedStack::<u8>::new(quiet_paranoid());
    stack.change_behaviour(StackBehaviour::FailAtAlloc);

    assert_eq!(stack.push(1), Err(StackError::AllocationFailed));
    assert!(stack.data.is_null());
    assert!(stack.verify().is_empty());
}

#[test]
fn test_failed_shrink_keeps_element() {
    let mut stack = stack_with::<u32>(quiet_paranoid(), &[1, 2, 3]);
    stack.pop().expect("Failed to pop()");

    // Next pop leaves 1 of 4 slots live and must shrink.
    stack.change_behaviour(StackBehaviour::FailAtAlloc);
    assert_eq!(stack.pop(), Err(StackError::AllocationFailed));

    assert_eq!(stack.len(), 2);
    assert_eq!(stack.capacity(), 4);
    assert!(stack.verify().is_empty());

    stack.change_behaviour(StackBehaviour::None);
    assert_eq!(stack.pop(), Ok(2));
    assert_eq!(stack.capacity(), 2);
}

#[test]
fn test_reallocation_refused_on_damaged_stack() {
    let mut stack = stack_with::<u32>(quiet_paranoid(), &[1, 2]);
    stack.data_hash ^= 1;

    let result = stack.reallocate(8, 2);

    assert!(matches!(result, Err(StackError::VerificationFailed(_))));
    assert_eq!(stack.capacity(), 2);

    stack.data_hash ^= 1;
}
