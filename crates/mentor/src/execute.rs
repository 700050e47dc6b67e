//! Bounded execution of a compiled submission.
//!
//! Runs the executable produced by [`crate::compile`] with no arguments,
//! no stdin, and captured stdout/stderr, under a wall-clock timeout that
//! is deliberately stricter than the compile bound: this is untrusted,
//! already-compiled code. The module classifies the exit, it never
//! interprets the program's output; empty output passes through unchanged.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::Error;

/// Exit code reported when the process was killed by a signal and no real
/// code is available.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// Outcome of running a compiled submission.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// The program exited 0.
    Success {
        /// Captured stdout, unmodified. May be empty.
        stdout: String,
    },
    /// The program exited with a non-zero code or died to a signal.
    RuntimeFailure {
        /// Captured stderr, unmodified.
        stderr: String,
        /// The exit code, or [`SIGNALED_EXIT_CODE`] for signal deaths.
        exit_code: i32,
    },
    /// The program exceeded the execution timeout and was killed.
    Timeout,
}

/// Run `executable` with no arguments, bounded by `timeout`.
///
/// On timeout the child is force-killed; no process survives this call
/// past the bound.
///
/// # Errors
///
/// Returns [`Error::Infrastructure`] if the process cannot be spawned or
/// its exit cannot be collected.
pub(crate) async fn execute(
    executable: &Path,
    timeout: Duration,
) -> Result<ExecutionResult, Error> {
    let child = Command::new(executable)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Dropping the wait future on timeout kills the child.
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::infra("spawning submission executable", e))?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| Error::infra("waiting for submission", e))?,
        Err(_) => {
            tracing::info!(timeout_secs = timeout.as_secs(), "execution timed out");
            return Ok(ExecutionResult::Timeout);
        }
    };

    if output.status.success() {
        return Ok(ExecutionResult::Success {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        });
    }

    let exit_code = output.status.code().unwrap_or(SIGNALED_EXIT_CODE);
    tracing::debug!(exit_code, "submission exited abnormally");

    Ok(ExecutionResult::RuntimeFailure {
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code,
    })
}
