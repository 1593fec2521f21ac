//! Convoy Core Library
//!
//! This is the core library for the Convoy batch runner. It provides the
//! dependency-resolution and leveled-execution engine: named shell commands
//! declare dependencies on one another, the engine partitions the resulting
//! acyclic graph into topological levels, and each level runs concurrently
//! with per-command timeout and retry policy.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`batch_manager`] - High-level interface: load, validate, plan, run
//! - [`batch`] - Immutable command specs behind a duplicate-rejecting builder
//! - [`graph`] - Adjacency construction, validation, and level computation
//! - [`execution`] - Command executor, level coordinator, and batch runner
//! - [`configs`] - Batch definition file parsing (YAML/JSON)
//! - [`results`] - Per-command results, run summary, and report types
//! - [`report`] - Text/JSON/markdown report rendering
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`BatchManager`]:
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use convoy_core::batch_manager::BatchManager;
//! use convoy_core::execution::runner::BatchRunnerConfig;
//!
//! # async fn example() -> convoy_core::types::ConvoyResult<()> {
//! let manager = BatchManager::load(Path::new("batch.yml"))?;
//! let report = manager.run(BatchRunnerConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod batch_manager;
pub mod configs;
pub mod execution;
pub mod graph;
pub mod report;
pub mod results;
pub mod types;

// Re-export the main types for easier usage
pub use batch::{Batch, BatchBuilder, CommandSpec, FailureStrategy};
pub use batch_manager::BatchManager;
pub use types::{ConvoyError, ConvoyResult};
