//! Per-submission scratch directories.
//!
//! Every submission gets its own uniquely named directory holding exactly
//! one source file and (after a successful compile) one executable. The
//! unique name comes from [`tempfile::Builder`], so concurrent submissions
//! can never collide on a path and no cross-request locking is needed.
//!
//! Cleanup is guaranteed on every exit path: [`Workspace::release`] removes
//! the directory explicitly, and the `Drop` impl of the inner
//! [`tempfile::TempDir`] removes it if the owning future is cancelled or
//! panics before release runs.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Error;

/// Name of the source file inside a workspace.
const SOURCE_FILE: &str = "main.cpp";

/// Name of the compiled executable inside a workspace.
const EXECUTABLE_FILE: &str = "main";

/// An isolated filesystem scope owned by a single submission.
///
/// Holds the paths for the submission's source file and executable. Paths
/// are only handed out as borrows, so they cannot outlive the workspace.
#[derive(Debug)]
pub struct Workspace {
    /// `None` once the workspace has been released.
    dir: Option<TempDir>,
    source_path: PathBuf,
    executable_path: PathBuf,
}

impl Workspace {
    /// Allocate a fresh, uniquely named workspace.
    ///
    /// The directory is created under `scratch_root` if given, otherwise
    /// under the system temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Infrastructure`] if the directory cannot be created
    /// (disk full, missing scratch root, permissions).
    pub fn acquire(scratch_root: Option<&Path>) -> Result<Self, Error> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mentor-");

        let dir = match scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::infra("allocating workspace directory", e))?;

        let source_path = dir.path().join(SOURCE_FILE);
        let executable_path = dir.path().join(EXECUTABLE_FILE);

        tracing::debug!(path = %dir.path().display(), "workspace acquired");

        Ok(Self {
            dir: Some(dir),
            source_path,
            executable_path,
        })
    }

    /// Path where the submission's source text is written.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Path where the compiler is told to place the executable.
    #[must_use]
    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }

    /// Remove the workspace directory and everything in it.
    ///
    /// Consumes the workspace, so artifacts cannot be referenced after
    /// release. A failure to delete is logged rather than propagated: by
    /// the time release runs the submission already has its outcome, and
    /// the `TempDir` naming keeps a leaked directory from affecting any
    /// later submission.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove workspace");
            } else {
                tracing::debug!(path = %path.display(), "workspace released");
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Backstop for panics and cancelled futures. Idempotent: a no-op
        // when release() already ran.
        self.release_inner();
    }
}
