//! Per-submission orchestration.
//!
//! [`Runner`] drives one submission through its full lifecycle:
//!
//! ```text
//! Start → Compiling → { CompileFailed | Executing }
//!                          Executing → { Completed | RuntimeFailed | TimedOut }
//! ```
//!
//! Executing is only reachable from a successful compile. Every terminal
//! state, including infrastructure failures partway through, releases
//! the workspace before the outcome is returned to the caller.
//!
//! A `Runner` is shared across submissions (`run` takes `&self`), but each
//! call allocates its own workspace and child processes; concurrent
//! submissions never share filesystem state or process handles.

use std::path::PathBuf;
use std::time::Duration;

use tracing::Instrument;

use crate::compile::{self, CompileResult};
use crate::error::Error;
use crate::execute::{self, ExecutionResult};
use crate::workspace::Workspace;

/// Wall-clock bounds for the two child-process stages.
///
/// The execute bound must be stricter than the compile bound: compilation
/// is trusted toolchain work, execution is untrusted student code.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum wall-clock time for the compiler.
    pub compile_timeout: Duration,
    /// Maximum wall-clock time for the compiled submission.
    pub execute_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            compile_timeout: Duration::from_secs(10),
            execute_timeout: Duration::from_secs(5),
        }
    }
}

/// Terminal state of one submission.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Compiled and exited 0.
    Completed {
        /// Captured stdout.
        stdout: String,
    },
    /// The compiler rejected the source or exceeded its bound.
    CompileFailed {
        /// Compiler stderr verbatim, or the synthetic timeout message.
        diagnostics: String,
    },
    /// The program exited non-zero or died to a signal.
    RuntimeFailed {
        /// Captured stderr.
        stderr: String,
        /// Exit code, or [`crate::SIGNALED_EXIT_CODE`] for signal deaths.
        exit_code: i32,
    },
    /// The program exceeded the execution timeout.
    TimedOut,
}

impl RunOutcome {
    /// The text treated as "what the program produced", for hint context.
    ///
    /// A runtime failure is deliberately *not* an error here: its stderr
    /// and exit code are the pedagogically relevant output a student needs
    /// a hint about. Compile failures and timeouts have no program output
    /// and return `None`.
    #[must_use]
    pub fn effective_output(&self) -> Option<String> {
        match self {
            Self::Completed { stdout } => Some(stdout.clone()),
            Self::RuntimeFailed { stderr, exit_code } => Some(format!(
                "{stderr}[process exited with code {exit_code}]"
            )),
            Self::CompileFailed { .. } | Self::TimedOut => None,
        }
    }
}

/// Orchestrates compile-and-run for submissions.
#[derive(Debug, Clone)]
pub struct Runner {
    scratch_root: Option<PathBuf>,
    limits: Limits,
    compiler: String,
}

impl Runner {
    /// Create a runner builder.
    #[must_use]
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::default()
    }

    /// Run one submission to a terminal state.
    ///
    /// Allocates a workspace, compiles, executes on compile success, and
    /// releases the workspace before returning, on every path, including
    /// infrastructure failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySource`] for empty or whitespace-only source,
    /// and [`Error::Infrastructure`] / [`Error::MissingArtifact`] when the
    /// stages themselves fail rather than the submission.
    pub async fn run(&self, source: &str) -> Result<RunOutcome, Error> {
        if source.trim().is_empty() {
            return Err(Error::EmptySource);
        }

        let span = tracing::info_span!("submission", id = %uuid::Uuid::new_v4());
        async {
            let workspace = Workspace::acquire(self.scratch_root.as_deref())?;
            let outcome = self.run_stages(source, &workspace).await;
            // Outcome first, then release, then respond. Cancellation
            // mid-run is covered by the workspace's Drop.
            workspace.release();
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        source: &str,
        workspace: &Workspace,
    ) -> Result<RunOutcome, Error> {
        let executable = match compile::compile(
            &self.compiler,
            source,
            workspace,
            self.limits.compile_timeout,
        )
        .await?
        {
            CompileResult::Failure { diagnostics } => {
                return Ok(RunOutcome::CompileFailed { diagnostics });
            }
            CompileResult::Success { executable } => executable,
        };

        match execute::execute(&executable, self.limits.execute_timeout).await? {
            ExecutionResult::Success { stdout } => Ok(RunOutcome::Completed { stdout }),
            ExecutionResult::RuntimeFailure { stderr, exit_code } => {
                Ok(RunOutcome::RuntimeFailed { stderr, exit_code })
            }
            ExecutionResult::Timeout => Ok(RunOutcome::TimedOut),
        }
    }
}

/// Builder for constructing a [`Runner`].
#[derive(Debug, Default)]
pub struct RunnerBuilder {
    scratch_root: Option<PathBuf>,
    limits: Limits,
    compiler: Option<String>,
}

impl RunnerBuilder {
    /// Put workspaces under `root` instead of the system temp directory.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Set the compile/execute timeouts.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Substitute the compiler program.
    ///
    /// Exists so tests can simulate a hanging or missing toolchain; the
    /// flag set stays fixed. Not exposed through any external surface.
    #[must_use]
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = Some(compiler.into());
        self
    }

    /// Build the runner.
    #[must_use]
    pub fn build(self) -> Runner {
        if self.limits.execute_timeout >= self.limits.compile_timeout {
            tracing::warn!(
                execute_secs = self.limits.execute_timeout.as_secs(),
                compile_secs = self.limits.compile_timeout.as_secs(),
                "execute timeout should be stricter than compile timeout"
            );
        }
        Runner {
            scratch_root: self.scratch_root,
            limits: self.limits,
            compiler: self.compiler.unwrap_or_else(|| compile::COMPILER.to_string()),
        }
    }
}
