//! Batch execution module
//!
//! This module handles the actual execution of a batch: running single
//! commands with timeout and retry policy, fanning a level out across
//! concurrent tasks, and driving levels in sequence.

pub mod command;
pub mod group;
pub mod runner;

pub use command::CommandExecutor;
pub use group::{GroupCoordinator, GroupOptions, DEFAULT_MAX_CONCURRENCY};
pub use runner::{BatchRunner, BatchRunnerConfig};
