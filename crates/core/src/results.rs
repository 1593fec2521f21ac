//! Result types for batch execution
//!
//! This module contains the records produced by the execution engine and
//! consumed by reporting: per-command outcomes, the run summary, and the
//! combined report handed to renderers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Exit code recorded when a command timed out or could not be spawned.
pub const FAILURE_SENTINEL_EXIT_CODE: i32 = -1;

/// Outcome of one command's full attempt sequence. Created once per command
/// per run and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub name: String,
    pub command: String,
    pub success: bool,
    pub exit_code: i32,
    /// Number of attempts actually made (1 when no retry was needed).
    pub attempts: u32,
    /// Wall-clock span across all attempts and retry delays.
    #[serde(rename = "duration_ms", serialize_with = "duration_as_millis")]
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
    pub error_detail: Option<String>,
    /// Capture time of the attempt that produced this result.
    pub timestamp: DateTime<Utc>,
}

/// Aggregate over all results of one run, computed once after the run
/// terminates by completion or abort.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_commands: usize,
    /// Commands actually executed; commands suppressed by an abort are not
    /// counted here.
    pub executed: usize,
    pub successful: usize,
    pub failed: usize,
    pub success: bool,
    #[serde(rename = "total_duration_ms", serialize_with = "duration_as_millis")]
    pub total_duration: Duration,
}

impl BatchSummary {
    pub fn from_results(
        total_commands: usize,
        results: &[ExecutionResult],
        total_duration: Duration,
    ) -> Self {
        let successful = results.iter().filter(|result| result.success).count();
        let failed = results.len() - successful;
        Self {
            total_commands,
            executed: results.len(),
            successful,
            failed,
            success: failed == 0,
            total_duration,
        }
    }

    /// Share of defined commands that succeeded, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total_commands == 0 {
            100.0
        } else {
            self.successful as f64 / self.total_commands as f64 * 100.0
        }
    }
}

/// Everything a run produces, in level order, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<ExecutionResult>,
}

fn duration_as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool) -> ExecutionResult {
        ExecutionResult {
            name: name.to_string(),
            command: "true".to_string(),
            success,
            exit_code: if success { 0 } else { 1 },
            attempts: 1,
            duration: Duration::from_millis(10),
            stdout: String::new(),
            stderr: String::new(),
            error_detail: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn summary_partitions_results() {
        let results = vec![result("a", true), result("b", false), result("c", true)];
        let summary = BatchSummary::from_results(4, &results, Duration::from_millis(30));

        assert_eq!(summary.total_commands, 4);
        assert_eq!(summary.executed, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.success);
        assert_eq!(summary.success_rate(), 50.0);
    }

    #[test]
    fn empty_run_counts_as_success() {
        let summary = BatchSummary::from_results(0, &[], Duration::ZERO);
        assert!(summary.success);
        assert_eq!(summary.success_rate(), 100.0);
    }
}
