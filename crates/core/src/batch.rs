//! Batch definition model
//!
//! A batch is an immutable, name-keyed collection of command specifications.
//! Specs enter through [`BatchBuilder`], which rejects duplicate names at
//! construction time; once built, the batch is never mutated.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::graph::validate::ValidationError;
use crate::types::{ConvoyError, ConvoyResult};

/// Whether a command's failure should suppress the start of not-yet-started
/// commands when the run's abort mode is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FailureStrategy {
    #[default]
    Abort,
    Continue,
}

/// Immutable description of one unit of work.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub command_line: String,
    pub depends_on: BTreeSet<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub failure_strategy: FailureStrategy,
}

impl CommandSpec {
    /// Create a spec with the default policy: no dependencies, no timeout,
    /// no retries, one second between retry attempts, abort on failure.
    pub fn new(name: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_line: command_line.into(),
            depends_on: BTreeSet::new(),
            working_dir: None,
            env: BTreeMap::new(),
            timeout: None,
            retry_count: 0,
            retry_delay: Duration::from_secs(1),
            failure_strategy: FailureStrategy::default(),
        }
    }
}

/// Accumulates command specs into an immutable [`Batch`], collecting
/// duplicate-name violations instead of panicking on insert.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    commands: BTreeMap<String, CommandSpec>,
    duplicates: Vec<ValidationError>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, spec: CommandSpec) -> Self {
        if self.commands.contains_key(&spec.name) {
            self.duplicates
                .push(ValidationError::DuplicateName(spec.name));
        } else {
            self.commands.insert(spec.name.clone(), spec);
        }
        self
    }

    /// Finalize the batch. Fails with the collected duplicate-name errors
    /// if any name was added more than once.
    pub fn build(self) -> ConvoyResult<Batch> {
        if !self.duplicates.is_empty() {
            return Err(ConvoyError::Validation(self.duplicates));
        }
        Ok(Batch {
            commands: self.commands,
        })
    }
}

/// Name-keyed command set, read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    commands: BTreeMap<String, CommandSpec>,
}

impl Batch {
    pub fn builder() -> BatchBuilder {
        BatchBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CommandSpec)> {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_specs_by_name() {
        let batch = Batch::builder()
            .command(CommandSpec::new("build", "make build"))
            .command(CommandSpec::new("test", "make test"))
            .build()
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get("build").unwrap().command_line, "make build");
        assert!(batch.get("deploy").is_none());
    }

    #[test]
    fn builder_rejects_duplicate_names() {
        let result = Batch::builder()
            .command(CommandSpec::new("build", "make build"))
            .command(CommandSpec::new("build", "make rebuild"))
            .build();

        match result {
            Err(ConvoyError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors[0],
                    ValidationError::DuplicateName("build".to_string())
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn spec_defaults() {
        let spec = CommandSpec::new("noop", "true");
        assert!(spec.depends_on.is_empty());
        assert!(spec.timeout.is_none());
        assert_eq!(spec.retry_count, 0);
        assert_eq!(spec.retry_delay, Duration::from_secs(1));
        assert_eq!(spec.failure_strategy, FailureStrategy::Abort);
    }
}
