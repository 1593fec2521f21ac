use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::batch::{Batch, CommandSpec, FailureStrategy};
use crate::types::{ConvoyError, ConvoyResult};

#[derive(Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct BatchFileConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub commands: Vec<CommandConfig>,
}

#[derive(Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub working_dir: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Per-command timeout in seconds; absent means unbounded.
    pub timeout: Option<f64>,
    #[serde(default)]
    pub retry_count: u32,
    /// Delay between retry attempts in seconds; defaults to 1.
    pub retry_delay: Option<f64>,
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
}

impl CommandConfig {
    pub fn into_spec(self) -> ConvoyResult<CommandSpec> {
        let timeout = self
            .timeout
            .map(|secs| duration_from_secs(secs, "timeout", &self.name))
            .transpose()?;
        let retry_delay = self
            .retry_delay
            .map(|secs| duration_from_secs(secs, "retry_delay", &self.name))
            .transpose()?
            .unwrap_or(Duration::from_secs(1));

        Ok(CommandSpec {
            name: self.name,
            command_line: self.command,
            depends_on: self.depends_on.into_iter().collect(),
            working_dir: self.working_dir.map(PathBuf::from),
            env: self.env,
            timeout,
            retry_count: self.retry_count,
            retry_delay,
            failure_strategy: self.failure_strategy,
        })
    }
}

impl BatchFileConfig {
    /// Convert the parsed file into an immutable batch, rejecting duplicate
    /// command names.
    pub fn into_batch(self) -> ConvoyResult<Batch> {
        let mut builder = Batch::builder();
        for command in self.commands {
            builder = builder.command(command.into_spec()?);
        }
        builder.build()
    }
}

fn duration_from_secs(secs: f64, field: &str, command: &str) -> ConvoyResult<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConvoyError::Config(format!(
            "command '{command}': {field} must be a non-negative number of seconds, got {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

pub fn parse_batch_config(yaml_str: &str) -> ConvoyResult<BatchFileConfig> {
    let config: BatchFileConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn parse_batch_config_json(json_str: &str) -> ConvoyResult<BatchFileConfig> {
    let config: BatchFileConfig = serde_json::from_str(json_str)?;
    Ok(config)
}
