//! High-level batch runner
//!
//! Drives a batch end to end: validates the dependency graph, computes the
//! level plan, executes levels in sequence through the group coordinator,
//! and aggregates every result into a summary.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::batch::{Batch, FailureStrategy};
use crate::execution::group::{GroupCoordinator, GroupOptions, DEFAULT_MAX_CONCURRENCY};
use crate::graph::levels::compute_levels;
use crate::graph::validate::validate;
use crate::results::{BatchReport, BatchSummary};
use crate::types::{ConvoyError, ConvoyResult};

/// Configuration for the batch runner
#[derive(Debug, Clone)]
pub struct BatchRunnerConfig {
    /// When true, a failed level stops the run before the next level starts.
    pub abort_on_failure: bool,
    pub max_concurrency: usize,
}

impl Default for BatchRunnerConfig {
    fn default() -> Self {
        Self {
            abort_on_failure: true,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Runs a whole batch level by level.
pub struct BatchRunner<'a> {
    batch: &'a Batch,
    config: BatchRunnerConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(batch: &'a Batch) -> Self {
        Self {
            batch,
            config: BatchRunnerConfig::default(),
        }
    }

    pub fn with_config(batch: &'a Batch, config: BatchRunnerConfig) -> Self {
        Self { batch, config }
    }

    /// Execute the batch.
    ///
    /// Fails with a validation error before anything runs if the graph has
    /// dangling references or cycles. Otherwise executes levels in
    /// ascending order; after a failed level, remaining levels are skipped
    /// when `abort_on_failure` is set. Per-command failures are recorded in
    /// their results and never abort the runner itself.
    pub async fn run(&self) -> ConvoyResult<BatchReport> {
        let errors = validate(self.batch);
        if !errors.is_empty() {
            return Err(ConvoyError::Validation(errors));
        }

        let plan = compute_levels(self.batch)?;
        info!(
            commands = self.batch.len(),
            levels = plan.len(),
            "starting batch"
        );

        let options = GroupOptions {
            abort_on_failure: self.config.abort_on_failure,
            max_concurrency: self.config.max_concurrency,
        };

        let started = Instant::now();
        let mut results = Vec::with_capacity(self.batch.len());

        for (index, level) in plan.iter().enumerate() {
            debug!(level = index, commands = level.len(), "executing level");
            let (all_succeeded, level_results) =
                GroupCoordinator::execute_group(level, self.batch, &options).await;

            // Failures from commands marked `continue` count against the
            // summary but do not stop the run.
            let tripped_abort = level_results.iter().any(|result| {
                !result.success
                    && self
                        .batch
                        .get(&result.name)
                        .map_or(true, |spec| spec.failure_strategy == FailureStrategy::Abort)
            });
            results.extend(level_results);

            if !all_succeeded && tripped_abort && self.config.abort_on_failure {
                warn!(level = index, "level failed, skipping remaining levels");
                break;
            }
        }

        let summary = BatchSummary::from_results(self.batch.len(), &results, started.elapsed());
        info!(
            executed = summary.executed,
            failed = summary.failed,
            "batch finished"
        );
        Ok(BatchReport { summary, results })
    }
}
