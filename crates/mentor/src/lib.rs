//! # Mentor
//!
//! Compile-and-run backend for Socratic C++ tutoring.
//!
//! Mentor takes untrusted, student-submitted C++ source, compiles it with
//! the system toolchain, runs the binary under strict wall-clock bounds,
//! and classifies the result: compile failure, runtime failure, timeout,
//! or captured output. The classified output then feeds a Socratic
//! [`hint`] generator so the student gets a guiding question instead of
//! an answer.
//!
//! ## Isolation model
//!
//! Each submission gets its own uniquely named [`Workspace`] directory and
//! its own child processes; concurrent submissions share nothing. Both
//! child-process stages are bounded by [`Limits`], the child is killed
//! when a bound fires, and workspace cleanup runs on every exit path,
//! including panics and cancelled requests.
//!
//! This is process-level isolation and resource bounding, not a security
//! boundary: a hostile binary is killed when it overruns its bound, but
//! there is no namespace/seccomp/chroot containment here. Run the service
//! inside a container if you need that.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mentor::{Runner, RunOutcome};
//!
//! # async fn demo() -> Result<(), mentor::Error> {
//! let runner = Runner::builder().build();
//!
//! let outcome = runner
//!     .run("#include <cstdio>\nint main() { printf(\"5\\n\"); }")
//!     .await?;
//!
//! match outcome {
//!     RunOutcome::Completed { stdout } => println!("program printed: {stdout}"),
//!     other => println!("classified failure: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod compile;
mod error;
mod execute;
pub mod hint;
mod runner;
mod workspace;

pub use error::Error;
pub use execute::SIGNALED_EXIT_CODE;
pub use hint::{HintContext, HintError, HintGenerator, OpenAiHintGenerator};
pub use runner::{Limits, RunOutcome, Runner, RunnerBuilder};
pub use workspace::Workspace;
