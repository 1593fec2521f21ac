use std::path::PathBuf;

use anyhow::Result;
use colored::*;
use convoy_core::batch_manager::BatchManager;
use convoy_core::execution::runner::BatchRunnerConfig;
use convoy_core::report::{render, ReportFormat};

pub struct RunArgs {
    pub config: PathBuf,
    pub continue_on_failure: bool,
    pub dry_run: bool,
    pub max_concurrency: usize,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let manager = BatchManager::load(&args.config)
        .map_err(|e| anyhow::anyhow!("Failed to load batch: {}", e))?;

    if args.dry_run {
        return super::plan::print_plan(&manager);
    }

    if !args.quiet {
        let label = manager.name().unwrap_or("batch");
        println!(
            "{} {} {}",
            "Running".bold(),
            label.cyan().bold(),
            format!("({} commands)", manager.batch().len()).dimmed()
        );
        println!();
    }

    let report = manager
        .run(BatchRunnerConfig {
            abort_on_failure: !args.continue_on_failure,
            max_concurrency: args.max_concurrency,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run batch: {}", e))?;

    let rendered = render(&report, args.format)
        .map_err(|e| anyhow::anyhow!("Failed to render report: {}", e))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            if !args.quiet {
                println!("Report written to {}", path.display());
            }
        }
        None => println!("{rendered}"),
    }

    if report.summary.success {
        if !args.quiet {
            println!(
                "{} {}",
                "✓".green().bold(),
                "All commands completed successfully!".green().bold()
            );
        }
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} executed command(s) failed",
            report.summary.failed,
            report.summary.executed
        )
    }
}
