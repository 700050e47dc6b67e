//! Native compiler invocation.
//!
//! Writes the submitted source into the workspace and runs the system C++
//! compiler against it with a fixed flag set, bounded by a wall-clock
//! timeout. The compiler's identity and flags are constants of this module;
//! they are not configurable through any external surface (tests may
//! substitute the compiler program via [`crate::RunnerBuilder`]).

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::Error;
use crate::workspace::Workspace;

/// The compiler binary invoked for every submission.
pub const COMPILER: &str = "g++";

/// Language-standard flag passed to the compiler.
///
/// Matches what the tutoring prompt tells students their code is built
/// with: C++20 with GNU extensions.
pub const STD_FLAG: &str = "-std=gnu++20";

/// Outcome of one compiler invocation.
///
/// A compile failure is deterministic: it is reported immediately and
/// never retried.
#[derive(Debug, Clone)]
pub enum CompileResult {
    /// The compiler exited 0 and the executable exists in the workspace.
    Success {
        /// Path of the produced executable, inside the workspace.
        executable: std::path::PathBuf,
    },
    /// The compiler rejected the source, or took longer than the bound.
    Failure {
        /// The compiler's stderr, verbatim, or a synthetic timeout message.
        diagnostics: String,
    },
}

/// Compile `source` inside `workspace`, bounded by `timeout`.
///
/// The source text is written verbatim to the workspace's source path. On
/// timeout the compiler process is killed and a synthetic diagnostic is
/// returned as a [`CompileResult::Failure`]; no orphaned compiler survives.
///
/// # Errors
///
/// Returns [`Error::Infrastructure`] if the source cannot be written or
/// the compiler cannot be spawned, and [`Error::MissingArtifact`] if the
/// compiler exits 0 without producing the executable.
pub(crate) async fn compile(
    compiler: &str,
    source: &str,
    workspace: &Workspace,
    timeout: Duration,
) -> Result<CompileResult, Error> {
    tokio::fs::write(workspace.source_path(), source)
        .await
        .map_err(|e| Error::infra("writing source file", e))?;

    let child = Command::new(compiler)
        .arg(STD_FLAG)
        .arg(workspace.source_path())
        .arg("-o")
        .arg(workspace.executable_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // If the timeout drops the wait future below, dropping the child
        // handle delivers SIGKILL. No compiler process outlives the bound.
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::infra(format!("spawning compiler `{compiler}`"), e))?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| Error::infra("waiting for compiler", e))?,
        Err(_) => {
            tracing::info!(timeout_secs = timeout.as_secs(), "compilation timed out");
            return Ok(CompileResult::Failure {
                diagnostics: format!(
                    "compilation timed out after {} seconds",
                    timeout.as_secs()
                ),
            });
        }
    };

    if !output.status.success() {
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::debug!(exit = ?output.status.code(), "compilation failed");
        return Ok(CompileResult::Failure { diagnostics });
    }

    // A zero exit is not proof of an artifact; verify before declaring
    // success so a toolchain inconsistency surfaces as what it is.
    let exists = tokio::fs::try_exists(workspace.executable_path())
        .await
        .map_err(|e| Error::infra("checking for executable", e))?;
    if !exists {
        return Err(Error::MissingArtifact);
    }

    Ok(CompileResult::Success {
        executable: workspace.executable_path().to_path_buf(),
    })
}
