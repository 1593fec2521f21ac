//! High-level batch management interface
//!
//! This module provides the [`BatchManager`], the primary entry point for
//! consumers: it loads a batch definition file (YAML or JSON, picked by
//! extension), and exposes validation, planning, and execution over the
//! resulting batch.
//!
//! ## Example
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
//! println!("{} of {} succeeded", report.summary.successful, report.summary.total_commands);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use crate::batch::Batch;
use crate::configs::batch::{parse_batch_config, parse_batch_config_json};
use crate::execution::runner::{BatchRunner, BatchRunnerConfig};
use crate::graph::levels::{compute_levels, LevelPlan};
use crate::graph::validate::{validate, ValidationError};
use crate::results::BatchReport;
use crate::types::{ConvoyError, ConvoyResult};

pub struct BatchManager {
    batch: Batch,
    name: Option<String>,
}

impl BatchManager {
    /// Load a batch definition from a file. `.json` files are parsed as
    /// JSON; everything else as YAML.
    pub fn load(path: &Path) -> ConvoyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvoyError::Config(format!("failed to read batch file {}: {}", path.display(), e))
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => parse_batch_config_json(&content)?,
            _ => parse_batch_config(&content)?,
        };

        let name = config.name.clone();
        let batch = config.into_batch()?;
        Ok(Self { batch, name })
    }

    pub fn from_batch(batch: Batch) -> Self {
        Self { batch, name: None }
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// Display name from the definition file, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check the batch for structural problems. Empty means valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate(&self.batch)
    }

    /// Compute the leveled execution plan without running anything.
    pub fn plan(&self) -> ConvoyResult<LevelPlan> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ConvoyError::Validation(errors));
        }
        compute_levels(&self.batch)
    }

    /// Validate and execute the batch.
    pub async fn run(&self, config: BatchRunnerConfig) -> ConvoyResult<BatchReport> {
        BatchRunner::with_config(&self.batch, config).run().await
    }
}
