use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use convoy_core::execution::group::DEFAULT_MAX_CONCURRENCY;
use convoy_core::report::ReportFormat;
use tracing_subscriber::EnvFilter;

mod commands;

/// Convoy - dependency-aware command batch orchestration
#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "Run batches of shell commands with dependency-aware parallelism")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch definition
    Run {
        /// Path to the batch definition file (YAML or JSON)
        config: PathBuf,

        /// Keep executing later levels after a command fails
        #[arg(long)]
        continue_on_failure: bool,

        /// Show the execution plan without running anything
        #[arg(long)]
        dry_run: bool,

        /// Maximum commands running at once within a level
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate a batch definition without executing it
    Validate {
        /// Path to the batch definition file (YAML or JSON)
        config: PathBuf,
    },
    /// Show the leveled execution plan
    Plan {
        /// Path to the batch definition file (YAML or JSON)
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Markdown => ReportFormat::Markdown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            config,
            continue_on_failure,
            dry_run,
            max_concurrency,
            format,
            output,
            quiet,
        } => {
            commands::run::execute(commands::run::RunArgs {
                config,
                continue_on_failure,
                dry_run,
                max_concurrency,
                format: format.into(),
                output,
                quiet,
            })
            .await
        }
        Commands::Validate { config } => commands::validate::execute(&config),
        Commands::Plan { config } => commands::plan::execute(&config),
    }
}
