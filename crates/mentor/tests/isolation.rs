//! Integration tests for workspace cleanup and cross-request isolation.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use mentor::{Limits, RunOutcome, Runner};

const PRINTS_FIVE: &str = r#"
#include <cstdio>
int main() {
    printf("5\n");
    return 0;
}
"#;

const INFINITE_LOOP: &str = r#"
int main() {
    volatile int x = 0;
    for (;;) { x++; }
    return 0;
}
"#;

fn have_compiler() -> bool {
    let found = std::process::Command::new("g++")
        .arg("--version")
        .output()
        .is_ok();
    if !found {
        eprintln!("skipping: g++ not found on this host");
    }
    found
}

fn scratch_entries(root: &std::path::Path) -> usize {
    std::fs::read_dir(root).unwrap().count()
}

/// Every outcome (success, compile failure, timeout, infrastructure
/// failure) must leave the scratch root empty.
#[tokio::test]
async fn no_artifacts_survive_any_outcome() {
    if !have_compiler() {
        return;
    }

    let scratch = tempfile::tempdir().unwrap();
    let runner = Runner::builder()
        .with_scratch_root(scratch.path())
        .with_limits(Limits {
            compile_timeout: Duration::from_secs(20),
            execute_timeout: Duration::from_secs(1),
        })
        .build();

    let completed = runner.run(PRINTS_FIVE).await.unwrap();
    assert!(matches!(completed, RunOutcome::Completed { .. }));
    assert_eq!(scratch_entries(scratch.path()), 0, "after success");

    let failed = runner.run("int main( {").await.unwrap();
    assert!(matches!(failed, RunOutcome::CompileFailed { .. }));
    assert_eq!(scratch_entries(scratch.path()), 0, "after compile failure");

    let timed_out = runner.run(INFINITE_LOOP).await.unwrap();
    assert!(matches!(timed_out, RunOutcome::TimedOut));
    assert_eq!(scratch_entries(scratch.path()), 0, "after timeout");
}

#[tokio::test]
async fn no_artifacts_survive_infrastructure_failure() {
    let scratch = tempfile::tempdir().unwrap();
    let runner = Runner::builder()
        .with_scratch_root(scratch.path())
        .with_compiler("/nonexistent/mentor-cxx")
        .build();

    let err = runner.run(PRINTS_FIVE).await;
    assert!(err.is_err());
    assert_eq!(scratch_entries(scratch.path()), 0, "after spawn failure");
}

/// Two submissions in flight at once: one spins until killed, the other
/// prints. Each must receive its own classification, and neither may leave
/// artifacts behind.
#[tokio::test]
async fn concurrent_submissions_are_isolated() {
    if !have_compiler() {
        return;
    }

    let scratch = tempfile::tempdir().unwrap();
    let runner = Runner::builder()
        .with_scratch_root(scratch.path())
        .with_limits(Limits {
            compile_timeout: Duration::from_secs(30),
            execute_timeout: Duration::from_secs(2),
        })
        .build();

    let (looping, printing) = tokio::join!(runner.run(INFINITE_LOOP), runner.run(PRINTS_FIVE));

    assert!(matches!(looping.unwrap(), RunOutcome::TimedOut));
    match printing.unwrap() {
        RunOutcome::Completed { stdout } => assert_eq!(stdout, "5\n"),
        other => panic!("expected Completed, got {other:?}"),
    }

    assert_eq!(scratch_entries(scratch.path()), 0, "after concurrent runs");
}

/// A dropped (cancelled) run must still clean up its workspace. Uses a
/// stand-in compiler that blocks without writing anything, so the run is
/// guaranteed to be mid-compile when it is abandoned.
#[cfg(unix)]
#[tokio::test]
async fn cancelled_run_releases_workspace() {
    use std::os::unix::fs::PermissionsExt;

    let tools = tempfile::tempdir().unwrap();
    let script = tools.path().join("slow-cxx");
    std::fs::write(&script, "#!/bin/sh\nsleep 60\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let scratch = tempfile::tempdir().unwrap();
    let runner = Runner::builder()
        .with_scratch_root(scratch.path())
        .with_compiler(script.to_string_lossy().into_owned())
        .with_limits(Limits {
            compile_timeout: Duration::from_secs(30),
            execute_timeout: Duration::from_secs(1),
        })
        .build();

    let run = runner.run(PRINTS_FIVE);
    // Abandon the run mid-compile, the way a disconnecting client would.
    let cancelled = tokio::time::timeout(Duration::from_millis(300), run).await;
    assert!(cancelled.is_err(), "expected the run to be cut short");

    // Drop-based cleanup is synchronous with future drop.
    assert_eq!(scratch_entries(scratch.path()), 0, "after cancellation");
}
