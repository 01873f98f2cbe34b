// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Re-executes the current test binary to run a single ignored test.
//!
//! Used for behaviour that terminates the process (abort, exit) and therefore
//! cannot be asserted in-process.

/// Exit code reported when the requested test does not exist.
pub const MISSING_TEST_CODE: i32 = -1;

/// How a subprocess test ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessOutcome {
    /// Exit code, `None` when the process was killed by a signal and
    /// [`MISSING_TEST_CODE`] when no test matched the name.
    pub code: Option<i32>,
    /// Everything the subprocess wrote to stderr.
    pub stderr: String,
}

/// Runs an ignored test as a subprocess and returns its exit code.
pub fn run_test_as_subprocess(test_name: &str) -> Option<i32> {
    run_test_as_subprocess_outcome(test_name).code
}

/// Runs an ignored test as a subprocess and returns its exit code and stderr.
pub fn run_test_as_subprocess_outcome(test_name: &str) -> SubprocessOutcome {
    let exe = std::env::current_exe().expect("Failed to current_exe()");
    let output = std::process::Command::new(exe)
        .args([
            "--exact",
            test_name,
            "--ignored",
            "--test-threads=1",
            "--nocapture",
        ])
        .output()
        .expect("Failed to run subprocess");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let code = if stdout.contains("running 0 tests") {
        Some(MISSING_TEST_CODE)
    } else {
        output.status.code()
    };

    SubprocessOutcome {
        code,
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
