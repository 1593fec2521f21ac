//! Single-command execution
//!
//! Runs one command spec to completion: spawns the shell, captures output,
//! enforces the spec's timeout, and retries failed attempts with a delay
//! in between. The caller gets exactly one result, reflecting the final
//! attempt, whose duration spans every attempt and delay.

use std::process::Stdio;
use std::time::Instant;

use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::batch::CommandSpec;
use crate::results::{ExecutionResult, FAILURE_SENTINEL_EXIT_CODE};

pub struct CommandExecutor<'a> {
    spec: &'a CommandSpec,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(spec: &'a CommandSpec) -> Self {
        Self { spec }
    }

    /// Run the command, retrying failed attempts up to `retry_count` times
    /// with `retry_delay` between them. Non-zero exit, timeout, and spawn
    /// failure all count as failed attempts. The retry sleep suspends only
    /// this task.
    pub async fn execute(&self) -> ExecutionResult {
        let started = Instant::now();
        let total_attempts = self.spec.retry_count + 1;
        let mut attempt = 1;

        loop {
            debug!(
                command = %self.spec.name,
                attempt,
                total_attempts,
                "executing command"
            );
            let mut result = self.run_attempt(attempt).await;
            result.duration = started.elapsed();

            if result.success || attempt == total_attempts {
                return result;
            }

            warn!(
                command = %self.spec.name,
                attempt,
                exit_code = result.exit_code,
                "attempt failed, retrying after {:?}",
                self.spec.retry_delay
            );
            tokio::time::sleep(self.spec.retry_delay).await;
            attempt += 1;
        }
    }

    async fn run_attempt(&self, attempt: u32) -> ExecutionResult {
        let timestamp = Utc::now();

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.spec.command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future on timeout must take the child with it.
            .kill_on_drop(true);

        if let Some(dir) = &self.spec.working_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.spec.env {
            command.env(key, value);
        }

        let output = match self.spec.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(io_result) => io_result,
                Err(_) => {
                    return self.attempt_result(
                        attempt,
                        timestamp,
                        false,
                        FAILURE_SENTINEL_EXIT_CODE,
                        String::new(),
                        String::new(),
                        Some(format!("timed out after {:.1}s", limit.as_secs_f64())),
                    );
                }
            },
            None => command.output().await,
        };

        match output {
            Ok(output) => {
                let exit_code = output
                    .status
                    .code()
                    .unwrap_or(FAILURE_SENTINEL_EXIT_CODE);
                let success = output.status.success();
                self.attempt_result(
                    attempt,
                    timestamp,
                    success,
                    exit_code,
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                    (!success).then(|| format!("exited with code {exit_code}")),
                )
            }
            Err(spawn_error) => self.attempt_result(
                attempt,
                timestamp,
                false,
                FAILURE_SENTINEL_EXIT_CODE,
                String::new(),
                String::new(),
                Some(format!("failed to spawn: {spawn_error}")),
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn attempt_result(
        &self,
        attempts: u32,
        timestamp: chrono::DateTime<Utc>,
        success: bool,
        exit_code: i32,
        stdout: String,
        stderr: String,
        error_detail: Option<String>,
    ) -> ExecutionResult {
        ExecutionResult {
            name: self.spec.name.clone(),
            command: self.spec.command_line.clone(),
            success,
            exit_code,
            attempts,
            // Overwritten by `execute` with the full elapsed span.
            duration: std::time::Duration::ZERO,
            stdout,
            stderr,
            error_detail,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn captures_stdout_and_exit_status() {
        let spec = CommandSpec::new("greet", "echo hello");
        let result = CommandExecutor::new(&spec).execute().await;

        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.error_detail.is_none());
    }

    #[tokio::test]
    async fn captures_stderr_and_nonzero_exit() {
        let spec = CommandSpec::new("fail", "echo oops >&2; exit 3");
        let result = CommandExecutor::new(&spec).execute().await;

        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr.trim(), "oops");
        assert_eq!(result.error_detail.as_deref(), Some("exited with code 3"));
    }

    #[tokio::test]
    async fn always_failing_command_is_attempted_retry_count_plus_one_times() {
        let mut spec = CommandSpec::new("flaky", "false");
        spec.retry_count = 2;
        spec.retry_delay = Duration::from_millis(50);

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(!result.success);
        assert_eq!(result.attempts, 3);
        assert!(result.duration >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn successful_command_is_never_retried() {
        let mut spec = CommandSpec::new("quick", "true");
        spec.retry_count = 5;
        spec.retry_delay = Duration::from_secs(10);

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(result.success);
        assert_eq!(result.attempts, 1);
        assert!(result.duration < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn timeout_terminates_the_command() {
        let mut spec = CommandSpec::new("slow", "sleep 5");
        spec.timeout = Some(Duration::from_millis(100));

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(!result.success);
        assert_eq!(result.exit_code, FAILURE_SENTINEL_EXIT_CODE);
        assert!(result.stdout.is_empty());
        assert!(result
            .error_detail
            .as_deref()
            .is_some_and(|detail| detail.contains("timed out")));
        assert!(result.duration < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn timeout_counts_as_a_failed_attempt_subject_to_retry() {
        let mut spec = CommandSpec::new("slow", "sleep 5");
        spec.timeout = Some(Duration::from_millis(50));
        spec.retry_count = 1;
        spec.retry_delay = Duration::from_millis(10);

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(!result.success);
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn spawn_failure_yields_sentinel_and_detail() {
        let mut spec = CommandSpec::new("lost", "true");
        spec.working_dir = Some("/this/path/does/not/exist".into());

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(!result.success);
        assert_eq!(result.exit_code, FAILURE_SENTINEL_EXIT_CODE);
        assert!(result
            .error_detail
            .as_deref()
            .is_some_and(|detail| detail.contains("failed to spawn")));
    }

    #[tokio::test]
    async fn environment_overrides_are_visible_to_the_shell() {
        let mut spec = CommandSpec::new("env", "printf '%s' \"$CONVOY_PROBE\"");
        spec.env
            .insert("CONVOY_PROBE".to_string(), "overlay".to_string());

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(result.success);
        assert_eq!(result.stdout, "overlay");
    }

    #[tokio::test]
    async fn working_directory_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = CommandSpec::new("pwd", "pwd");
        spec.working_dir = Some(dir.path().to_path_buf());

        let result = CommandExecutor::new(&spec).execute().await;

        assert!(result.success);
        // Canonicalize both sides; the tempdir may sit behind a symlink.
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(reported, expected);
    }
}
