use std::path::Path;

use anyhow::Result;
use colored::*;
use convoy_core::batch_manager::BatchManager;

pub fn execute(config: &Path) -> Result<()> {
    let manager = BatchManager::load(config)
        .map_err(|e| anyhow::anyhow!("Failed to load batch: {}", e))?;
    print_plan(&manager)
}

pub fn print_plan(manager: &BatchManager) -> Result<()> {
    let plan = manager
        .plan()
        .map_err(|e| anyhow::anyhow!("Failed to compute execution plan: {}", e))?;

    println!("{}", "Execution plan:".bold().underline());
    if plan.is_empty() {
        println!("  {}", "No commands defined".dimmed());
        return Ok(());
    }

    for (index, level) in plan.iter().enumerate() {
        println!(
            "{} {}",
            format!("Level {}", index).bold(),
            format!("({} concurrent)", level.len()).dimmed()
        );
        for name in level {
            match manager.batch().get(name) {
                Some(spec) => {
                    println!("  {} {}", name.cyan(), spec.command_line.dimmed());
                }
                None => println!("  {}", name.cyan()),
            }
        }
    }

    Ok(())
}
