//! Level execution
//!
//! Fans the commands of one level out across concurrent tasks, bounded by a
//! configurable concurrency cap. A shared failure flag lets a failing
//! command suppress commands that have not started yet; commands already
//! running are never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::batch::{Batch, FailureStrategy};
use crate::execution::command::CommandExecutor;
use crate::results::ExecutionResult;

/// Cap on commands running at once within a level.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Options governing how a level is executed.
#[derive(Debug, Clone)]
pub struct GroupOptions {
    /// When true, a failed command suppresses the start of commands that
    /// have not begun their first attempt yet.
    pub abort_on_failure: bool,
    pub max_concurrency: usize,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            abort_on_failure: true,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

pub struct GroupCoordinator;

impl GroupCoordinator {
    /// Execute every named command of one level concurrently.
    ///
    /// Returns whether all collected results succeeded, plus the results in
    /// completion order. Commands skipped because the failure flag was
    /// already set produce no result; an empty collection counts as
    /// success. The coordinator waits for every spawned task to finish.
    pub async fn execute_group(
        names: &[String],
        batch: &Batch,
        options: &GroupOptions,
    ) -> (bool, Vec<ExecutionResult>) {
        let failed = Arc::new(AtomicBool::new(false));
        let results = Arc::new(Mutex::new(Vec::with_capacity(names.len())));
        let permits = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
        let abort_on_failure = options.abort_on_failure;

        let mut tasks = JoinSet::new();
        for name in names {
            // Names come from a plan computed over this batch; anything
            // unresolvable would have failed validation.
            let Some(spec) = batch.get(name) else { continue };
            let spec = spec.clone();
            let failed = Arc::clone(&failed);
            let results = Arc::clone(&results);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                // Best-effort early exit, checked before the first attempt;
                // a command racing past this check simply runs to completion.
                if abort_on_failure && failed.load(Ordering::SeqCst) {
                    debug!(command = %spec.name, "skipped: an earlier command failed");
                    return;
                }

                let result = CommandExecutor::new(&spec).execute().await;

                if !result.success
                    && abort_on_failure
                    && spec.failure_strategy == FailureStrategy::Abort
                {
                    failed.store(true, Ordering::SeqCst);
                }
                results.lock().await.push(result);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(join_error) = joined {
                warn!("command task aborted: {join_error}");
            }
        }

        let collected = {
            let mut guard = results.lock().await;
            std::mem::take(&mut *guard)
        };
        let all_succeeded = collected.iter().all(|result| result.success);
        (all_succeeded, collected)
    }
}
