// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

// Demo: push/pop script over a stack of records
//
// Runs with dumps and poisoning on, canaries and checksums off, and dumps the
// stack after every step so the growth, shrink and poison behaviour can be
// followed on stderr.

use std::fmt;

use rampart_stack::{GuardConfig, PlainElement, StackError, VerifyFlags, guarded_stack};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
struct Sample {
    i: i32,
    c: u32,
    d: f64,
}

// SAFETY: repr(C), 4 + 4 + 8 bytes with no padding, every field accepts any bits.
unsafe impl PlainElement for Sample {}

impl Sample {
    fn new(i: i32, d: f64, c: char) -> Self {
        Self { i, c: c as u32, d }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = char::from_u32(self.c).unwrap_or(char::REPLACEMENT_CHARACTER);
        write!(f, "{{i = {}, d = {:.6}, c = {}}}", self.i, self.d, c)
    }
}

fn format_sample(value: &Sample, out: &mut dyn fmt::Write) -> fmt::Result {
    write!(out, "{value}")
}

fn main() -> Result<(), StackError> {
    let config = GuardConfig::default()
        .with_canary(false)
        .with_checksum(false);

    let mut stk = guarded_stack!(stk: Sample, config);
    stk.set_formatter(Some(format_sample));

    println!("----ctor");
    stk.dump(VerifyFlags::empty());

    stk.push(Sample::new(19, 19.19, 'f'))?;
    println!("----push1");
    stk.dump(VerifyFlags::empty());

    let mut x = Sample::default();
    stk.pop_into(Some(&mut x))?;
    println!("{x}");
    println!("----pop1");
    stk.dump(VerifyFlags::empty());

    for step in 2..=5 {
        stk.push(Sample::new(-1, 23.42, 's'))?;
        println!("----push{step}");
        stk.dump(VerifyFlags::empty());
    }

    stk.push(Sample::new(2, 0.01, 'k'))?;
    println!("----push6");
    stk.dump(VerifyFlags::empty());

    for step in 2..=3 {
        stk.pop_into(Some(&mut x))?;
        println!("{x}");
        println!("----pop{step}");
        stk.dump(VerifyFlags::empty());
    }

    stk.destruct();

    println!("The END!");

    Ok(())
}
