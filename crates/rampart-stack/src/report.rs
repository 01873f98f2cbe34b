// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Diagnostic reporter.
//!
//! Renders everything known about a stack into text. The reporter never
//! trusts the header it is asked to describe: it recomputes the header checks
//! itself and only walks the payload when they come back clean.

use alloc::string::String;
use core::fmt::{self, Write};
use core::panic::Location;

use rampart_util::write_hex_bytes;

use crate::canary::{self, LEFT_CANARY, RIGHT_CANARY};
use crate::checksum::{payload_checksum, struct_checksum};
use crate::config::DumpAction;
use crate::element::{PlainElement, bytes_of};
use crate::layout::BlockLayout;
use crate::poison::is_poisoned;
use crate::stack::GuardedStack;
use crate::verify::{VerifyFlags, header_flags};

const BANNER: &str = "=== RAMPART STACK DUMP ===";
const FOOTER: &str = "=== END OF DUMP ===";

/// Renders a full report for `stack` into `out`.
pub(crate) fn render<T: PlainElement>(
    out: &mut dyn Write,
    stack: Option<&GuardedStack<T>>,
    flags: VerifyFlags,
    location: &Location<'_>,
) -> fmt::Result {
    writeln!(out, "{BANNER}")?;
    out.write_str("time: ")?;
    write_timestamp(out)?;
    writeln!(out)?;
    writeln!(out, "called from: {}:{}", location.file(), location.line())?;
    render_mask(out, flags)?;

    let Some(stack) = stack else {
        writeln!(out, "stack handle is null, no further information is accessible")?;
        return writeln!(out, "{FOOTER}");
    };

    render_header(out, stack)?;

    let damage = header_flags(stack);
    if !damage.is_empty() {
        writeln!(
            out,
            "header damaged (mask {:#06x}), payload not dereferenced",
            damage.bits()
        )?;
    } else if stack.data.is_null() {
        writeln!(out, "payload: not allocated")?;
    } else {
        render_payload(out, stack)?;
    }

    writeln!(out, "{FOOTER}")
}

fn render_mask(out: &mut dyn Write, flags: VerifyFlags) -> fmt::Result {
    if flags.is_empty() {
        return writeln!(out, "verification mask: 0x0000 (no violations)");
    }

    writeln!(out, "verification mask: {:#06x}", flags.bits())?;
    for message in flags.messages() {
        writeln!(out, "  - {message}")?;
    }

    Ok(())
}

fn render_header<T: PlainElement>(out: &mut dyn Write, stack: &GuardedStack<T>) -> fmt::Result {
    let at = stack as *const GuardedStack<T>;
    let computed = struct_checksum(stack);

    // The provenance strings sit behind header pointers; only follow them
    // when the header digest vouches for those pointers.
    if !stack.config.checksum || computed == stack.struct_hash {
        writeln!(out, "stack at {at:p}: {}", stack.provenance)?;
    } else {
        writeln!(out, "stack at {at:p}: provenance withheld")?;
    }
    writeln!(out, "config: {}", stack.config)?;
    writeln!(out, "size: {}, capacity: {}", stack.size, stack.capacity)?;
    writeln!(out, "data: {:p}, origin: {:p}", stack.data, stack.origin)?;

    if stack.config.canary {
        render_canary(out, "struct canary left", stack.left_canary, LEFT_CANARY)?;
        render_canary(out, "struct canary right", stack.right_canary, RIGHT_CANARY)?;
    }

    if stack.config.checksum {
        render_checksum(out, "struct checksum", stack.struct_hash, computed)?;
    }

    Ok(())
}

fn render_payload<T: PlainElement>(out: &mut dyn Write, stack: &GuardedStack<T>) -> fmt::Result {
    let size = stack.size as usize;
    let capacity = stack.capacity as usize;

    if stack.config.canary {
        // SAFETY (PRECONDITIONS ARE MET): header checks are clean, so origin is the live
        // block planned for this capacity.
        let canaries = BlockLayout::for_type::<T>(capacity, true)
            .and_then(|layout| unsafe { canary::read(stack.origin, &layout) });

        if let Some(canaries) = canaries {
            render_canary(out, "data canary left", canaries.left, LEFT_CANARY)?;
            render_canary(out, "data canary right", canaries.right, RIGHT_CANARY)?;
        }
    }

    if stack.config.checksum {
        // SAFETY (PRECONDITIONS ARE MET): header checks are clean, data holds capacity slots.
        let computed = unsafe { payload_checksum(stack.data, capacity) };
        render_checksum(out, "data checksum", stack.data_hash, computed)?;
    }

    writeln!(out, "slots:")?;
    for index in 0..capacity {
        // SAFETY (PRECONDITIONS ARE MET): index < capacity.
        let value = unsafe { stack.data.add(index).read() };

        if index < size {
            write!(out, "  [{index}] live ")?;
            render_value(out, stack, &value)?;
        } else if is_poisoned(&value) {
            write!(out, "  [{index}] poison")?;
        } else {
            write!(out, "  [{index}] NOT POISON ")?;
            render_value(out, stack, &value)?;
        }

        if index + 1 == size {
            out.write_str(" <-- top")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn render_value<T: PlainElement>(
    out: &mut dyn Write,
    stack: &GuardedStack<T>,
    value: &T,
) -> fmt::Result {
    match stack.formatter {
        Some(formatter) => formatter(value, &mut *out),
        None => write_hex_bytes(&mut *out, bytes_of(value)),
    }
}

fn render_canary(out: &mut dyn Write, label: &str, actual: u64, expected: u64) -> fmt::Result {
    let verdict = if actual == expected { "ok" } else { "DAMAGED" };

    writeln!(
        out,
        "{label}: {actual:#018x} (expected {expected:#018x}) {verdict}"
    )
}

fn render_checksum(out: &mut dyn Write, label: &str, stored: u32, computed: u32) -> fmt::Result {
    let verdict = if stored == computed { "ok" } else { "MISMATCH" };

    writeln!(
        out,
        "{label}: stored {stored:#010x}, computed {computed:#010x} {verdict}"
    )
}

#[cfg(any(test, feature = "std"))]
fn write_timestamp(out: &mut dyn Write) -> fmt::Result {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(elapsed) => write!(out, "{}.{:03}", elapsed.as_secs(), elapsed.subsec_millis()),
        Err(_) => out.write_str("n/a"),
    }
}

#[cfg(not(any(test, feature = "std")))]
fn write_timestamp(out: &mut dyn Write) -> fmt::Result {
    out.write_str("n/a")
}

/// Renders, emits and then runs the terminal action of the stack's config.
///
/// A missing stack has no config, so its dump always returns.
pub(crate) fn dump<T: PlainElement>(
    stack: Option<&GuardedStack<T>>,
    flags: VerifyFlags,
    location: &Location<'_>,
) {
    let mut report = String::new();
    // Writing into a String cannot fail.
    let _ = render(&mut report, stack, flags, location);

    emit(&report);

    tracing::error!(
        mask = flags.bits(),
        file = location.file(),
        line = location.line(),
        "stack dump written"
    );

    if let Some(stack) = stack {
        terminate(stack.config.dump_action, flags);
    }
}

#[cfg(any(test, feature = "std"))]
fn emit(report: &str) {
    std::eprint!("{report}");
}

#[cfg(not(any(test, feature = "std")))]
fn emit(report: &str) {
    tracing::error!(report, "stack dump");
}

/// Process exit status for a verification mask, saturated to 255.
///
/// Dumps without violations (empty pop, on-demand) still end a faulting
/// path, so an empty mask exits with 255 rather than success.
pub(crate) fn exit_code(flags: VerifyFlags) -> i32 {
    if flags.is_empty() {
        return u8::MAX as i32;
    }

    flags.bits().min(u8::MAX as u32) as i32
}

fn terminate(action: DumpAction, flags: VerifyFlags) {
    match action {
        DumpAction::Continue => {}
        DumpAction::Abort => {
            tracing::error!(mask = flags.bits(), "aborting after stack dump");
            abort_process();
        }
        DumpAction::Exit => {
            let code = exit_code(flags);
            tracing::error!(mask = flags.bits(), code, "exiting after stack dump");
            exit_process(code);
        }
    }
}

#[cfg(unix)]
fn abort_process() -> ! {
    // SAFETY (PRECONDITIONS ARE MET): abort has no preconditions.
    unsafe { libc::abort() }
}

#[cfg(unix)]
fn exit_process(code: i32) -> ! {
    // SAFETY (PRECONDITIONS ARE MET): _exit has no preconditions. The damaged stack
    // must not run destructors on the way out.
    unsafe { libc::_exit(code) }
}

#[cfg(all(not(unix), any(test, feature = "std")))]
fn abort_process() -> ! {
    std::process::abort()
}

#[cfg(all(not(unix), any(test, feature = "std")))]
fn exit_process(code: i32) -> ! {
    std::process::exit(code)
}

#[cfg(all(not(unix), not(any(test, feature = "std"))))]
fn abort_process() -> ! {
    panic!("stack dump requested abort")
}

#[cfg(all(not(unix), not(any(test, feature = "std"))))]
fn exit_process(code: i32) -> ! {
    panic!("stack dump requested exit with status {code}")
}
