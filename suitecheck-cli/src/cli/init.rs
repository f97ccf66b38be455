//! Init command - write an example configuration

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::{CONFIG_FILE_NAMES, EXAMPLE_CONFIG};

/// Run the init command
pub fn run(path: &Path, force: bool) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("○").dim(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("\nNext: edit the [inputs] paths, then run {}", style("suitecheck").bold());
    Ok(())
}
