//! Execution engine tests.
//!
//! Tests needing python3 or node return early when the interpreter is
//! not installed.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chalice_execpolicy::SafetyPolicy;

use super::*;

fn available(language: GuestLanguage) -> bool {
    Interpreter::resolve(language, None).is_ok()
}

fn engine_in(scratch: &Path) -> ExecutionEngine {
    ExecutionEngine::new(
        EngineConfig {
            scratch_dir: Some(scratch.to_path_buf()),
            ..Default::default()
        },
        Arc::new(SafetyPolicy::new()),
    )
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

mod request_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timeout_clamped() {
        for (requested, expected) in [(-10, 1), (0, 1), (1, 1), (5, 5), (300, 300), (301, 300), (100_000, 300)] {
            let request = ExecutionRequest::python("pass").with_timeout_secs(requested);
            assert_eq!(request.timeout_secs(), expected, "requested {requested}");
            assert_eq!(request.timeout(), Duration::from_secs(expected));
        }
    }

    #[test]
    fn test_engine_request_uses_default_timeout() {
        let engine = ExecutionEngine::new(
            EngineConfig {
                default_timeout_secs: 12,
                ..Default::default()
            },
            Arc::new(SafetyPolicy::new()),
        );
        assert_eq!(engine.request(GuestLanguage::Shell, "true").timeout_secs(), 12);
    }
}

mod python_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_print_and_exit_zero() {
        if !available(GuestLanguage::Python) {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let result = engine_in(scratch.path())
            .execute(ExecutionRequest::python("print('hello from guest')").with_timeout_secs(5))
            .await;

        let payload = result.to_payload();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["return_code"], 0);
        assert_eq!(payload["timeout"], false);
        assert!(payload["stdout"].as_str().unwrap().contains("hello from guest"));
        assert!(dir_is_empty(scratch.path()), "script file left behind");
    }

    #[tokio::test]
    async fn test_sleep_times_out() {
        if !available(GuestLanguage::Python) {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let started = Instant::now();
        let result = engine_in(scratch.path())
            .execute(
                ExecutionRequest::python("import time\nprint('started')\ntime.sleep(10)")
                    .with_timeout_secs(2),
            )
            .await;
        let elapsed = started.elapsed();

        assert!(result.is_timeout(), "{result:?}");
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(4), "overshoot: {elapsed:?}");

        let payload = result.to_payload();
        assert_eq!(payload["success"], false);
        assert_eq!(payload["timeout"], true);
        assert_eq!(payload["return_code"], -1);
        assert!(payload["stdout"].as_str().unwrap().contains("started"));
        assert!(dir_is_empty(scratch.path()), "script file left behind");
    }

    #[tokio::test]
    async fn test_stdin_payload() {
        if !available(GuestLanguage::Python) {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let result = engine_in(scratch.path())
            .execute(
                ExecutionRequest::python("import sys\nprint(sys.stdin.read().upper())")
                    .with_stdin("shout"),
            )
            .await;
        assert!(result.stdout().contains("SHOUT"), "{result:?}");
    }

    #[tokio::test]
    async fn test_exception_is_nonzero_exit() {
        if !available(GuestLanguage::Python) {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let result = engine_in(scratch.path())
            .execute(ExecutionRequest::python("raise ValueError('bad')"))
            .await;
        match result {
            ExecutionResult::Completed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, 1);
                assert!(stderr.contains("ValueError: bad"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_interpreter_override() {
        let engine = ExecutionEngine::new(
            EngineConfig {
                python: Some("/nonexistent/bin/python9".into()),
                ..Default::default()
            },
            Arc::new(SafetyPolicy::new()),
        );
        let started = Instant::now();
        let result = engine
            .execute(ExecutionRequest::python("print(1)").with_timeout_secs(30))
            .await;
        assert!(matches!(result, ExecutionResult::EngineError { .. }));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}

mod javascript_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_console_log() {
        if !available(GuestLanguage::JavaScript) {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let result = engine_in(scratch.path())
            .execute(ExecutionRequest::javascript("console.log(6 * 7)").with_timeout_secs(10))
            .await;
        assert!(result.success(), "{result:?}");
        assert_eq!(result.stdout().trim(), "42");
        assert!(dir_is_empty(scratch.path()));
    }
}

#[cfg(unix)]
mod shell_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    /// Whether `pid` is gone (absent or a zombie awaiting reaping).
    fn process_gone(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .is_some_and(|rest| rest.trim_start().starts_with('Z')),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_exit_code_and_streams() {
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("echo out; echo err >&2; exit 3"))
            .await;
        match result {
            ExecutionResult::Completed {
                exit_code,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(exit_code, 3);
                assert_eq!(stdout, "out\n");
                assert_eq!(stderr, "err\n");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_replaced() {
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("printf 'ok\\377'"))
            .await;
        assert!(result.stdout().starts_with("ok"));
        assert!(result.stdout().contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("ls").with_working_dir(dir.path()))
            .await;
        assert_eq!(result.stdout().trim(), "marker.txt");
    }

    #[tokio::test]
    async fn test_missing_working_dir() {
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("ls").with_working_dir("/nonexistent/chalice/dir"))
            .await;
        assert!(matches!(result, ExecutionResult::EngineError { .. }));
    }

    #[tokio::test]
    async fn test_blocked_pattern_never_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let command = format!("touch {} && rm -rf /", marker.display());

        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell(command))
            .await;

        let payload = result.to_payload();
        assert_eq!(payload["blocked"], true);
        assert!(!payload["error"].as_str().unwrap().is_empty());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_denied_leading_token_never_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let command = format!("rm -f nothing; touch {}", marker.display());

        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell(command))
            .await;

        assert!(result.is_blocked(), "{result:?}");
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_timeout_kills_descendants() {
        let started = Instant::now();
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("sleep 60 & echo $!; wait").with_timeout_secs(1))
            .await;

        assert!(result.is_timeout(), "{result:?}");
        assert!(started.elapsed() < Duration::from_secs(3));

        let grandchild: u32 = result.stdout().trim().parse().unwrap();
        assert!(process_gone(grandchild), "background sleep {grandchild} survived");
    }

    #[tokio::test]
    async fn test_background_holding_pipe_times_out() {
        // The shell exits at once but its child keeps stdout open
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("sleep 60 & echo $!").with_timeout_secs(1))
            .await;

        assert!(result.is_timeout(), "{result:?}");
        let grandchild: u32 = result.stdout().trim().parse().unwrap();
        assert!(process_gone(grandchild));
    }

    #[tokio::test]
    #[serial]
    async fn test_sensitive_env_scrubbed() {
        // SAFETY: serialized with the other env-mutating tests
        unsafe {
            std::env::set_var("CHALICE_TEST_API_TOKEN", "leak");
        }
        let result = ExecutionEngine::default()
            .execute(ExecutionRequest::shell("echo ${CHALICE_TEST_API_TOKEN:-unset}"))
            .await;
        unsafe {
            std::env::remove_var("CHALICE_TEST_API_TOKEN");
        }
        assert_eq!(result.stdout().trim(), "unset");
    }

    #[tokio::test]
    async fn test_concurrent_executions_are_independent() {
        let engine = Arc::new(ExecutionEngine::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .execute(ExecutionRequest::shell(format!("echo {i}")))
                        .await
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap().stdout().trim(), i.to_string());
        }
    }
}
