// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn test_stdin_is_forwarded() {
    let output = run_with_timeout(
        CommandSpec::new("cat").command(),
        Some(b"hello".to_vec()),
        Duration::from_secs(5),
        "cat",
    )
    .await
    .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello");
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let err = run_with_timeout(
        CommandSpec::new("sleep").arg("5").command(),
        None,
        Duration::from_millis(50),
        "sleeper",
    )
    .await
    .unwrap_err();

    assert!(err.contains("sleeper: timed out"), "{err}");
}

#[tokio::test]
async fn test_missing_program_fails_to_spawn() {
    let err = run_with_timeout(
        CommandSpec::new("bw-definitely-not-installed").command(),
        None,
        Duration::from_secs(1),
        "generator",
    )
    .await
    .unwrap_err();

    assert!(err.starts_with("generator: failed to spawn"), "{err}");
}

#[tokio::test]
async fn test_stderr_summary_uses_last_line() {
    let output = run_with_timeout(
        CommandSpec::new("sh")
            .arg("-c")
            .arg("echo first >&2; echo 'out of memory' >&2; exit 3")
            .command(),
        None,
        Duration::from_secs(5),
        "sh",
    )
    .await
    .unwrap();

    assert_eq!(stderr_summary(&output), "exit code 3: out of memory");
}

#[yare::parameterized(
    default_used  = { None, 7 },
    override_used = { Some(2_000), 2 },
)]
fn test_timeout_or(timeout_ms: Option<u64>, secs: u64) {
    let spec = CommandSpec { timeout_ms, ..CommandSpec::new("x") };

    assert_eq!(spec.timeout_or(Duration::from_secs(7)), Duration::from_secs(secs));
}
