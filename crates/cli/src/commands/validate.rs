use std::path::Path;

use anyhow::Result;
use colored::*;
use convoy_core::batch_manager::BatchManager;
use convoy_core::types::ConvoyError;

pub fn execute(config: &Path) -> Result<()> {
    // Duplicate names surface while the batch is being built, before the
    // structural checks get a chance to run.
    let manager = match BatchManager::load(config) {
        Ok(manager) => manager,
        Err(ConvoyError::Validation(errors)) => {
            print_errors(&errors);
            anyhow::bail!("{} validation error(s)", errors.len());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to load batch: {}", e)),
    };

    let errors = manager.validate();
    if errors.is_empty() {
        println!(
            "{} {}",
            "✓".green().bold(),
            "Batch definition is valid".green()
        );
        Ok(())
    } else {
        print_errors(&errors);
        anyhow::bail!("{} validation error(s)", errors.len())
    }
}

fn print_errors(errors: &[convoy_core::graph::validate::ValidationError]) {
    println!("{}", "Validation errors:".red().bold());
    for error in errors {
        println!("  {} {}", "-".red(), error);
    }
}
