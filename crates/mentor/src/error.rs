//! Error types for the compile-and-run core.
//!
//! Classified submission outcomes (compile failures, runtime failures,
//! timeouts) are *values*, not errors; see [`crate::RunOutcome`]. The
//! [`Error`] type covers only the cases where no classified outcome
//! exists: the request was invalid at the boundary, or the infrastructure
//! underneath it failed.

use thiserror::Error;

/// Errors that abort a submission before a classified outcome is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The submitted source text was empty or whitespace-only.
    ///
    /// Rejected at the boundary, before any filesystem or process work
    /// happens. This is a validation error, not a compile failure.
    #[error("submitted source code is empty")]
    EmptySource,

    /// Workspace allocation, child-process spawning, or artifact
    /// bookkeeping failed.
    ///
    /// Fatal to the request and never retried. The raw OS error is kept as
    /// the source for logging, but callers should not surface it verbatim.
    #[error("infrastructure failure while {context}")]
    Infrastructure {
        /// What the core was doing when the failure occurred.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler exited successfully but the expected executable is
    /// missing from the workspace.
    ///
    /// Defends against toolchain inconsistencies; treated like any other
    /// infrastructure failure by callers.
    #[error("compiler reported success but produced no executable")]
    MissingArtifact,
}

impl Error {
    /// Wrap an I/O error with a short description of the operation that
    /// failed.
    pub(crate) fn infra(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Infrastructure {
            context: context.into(),
            source,
        }
    }
}
