//! Doctor command - check environment

use anyhow::Result;
use std::path::Path;

use super::analyze::load_config;
use super::Cli;
use crate::cluster::kubectl_available;
use crate::config::CONFIG_FILE_NAMES;
use crate::probes::default_probes;

pub fn run(cli: &Cli) -> Result<()> {
    println!("🩺 suitecheck doctor\n");
    let mut problems = 0;

    match &cli.config {
        Some(path) => println!("✓ Config: {}", path.display()),
        None => match CONFIG_FILE_NAMES
            .iter()
            .map(|name| cli.path.join(name))
            .find(|p| p.exists())
        {
            Some(path) => println!("✓ Config: {}", path.display()),
            None => println!("○ Config: none found, using defaults (run `suitecheck init`)"),
        },
    }

    let config = load_config(cli)?;
    problems += check_path("Requirements document", &config.inputs.requirements, false);
    problems += check_path("Design document", &config.inputs.design, false);
    problems += check_path("Test root", &config.inputs.tests, true);

    if config.probes.cluster {
        if kubectl_available(&config.probes.kubectl) {
            println!("✓ kubectl: {}", config.probes.kubectl);
        } else {
            println!("✗ kubectl: '{}' not runnable", config.probes.kubectl);
            println!("  Install kubectl or use --offline to skip cluster probes");
            problems += 1;
        }
    } else {
        println!("○ Cluster probes: disabled");
    }

    println!("\nProbes:");
    for probe in default_probes(config.probes.cluster) {
        println!("  {:<24} {}", probe.name(), probe.description());
    }

    if problems == 0 {
        println!("\n✅ All checks passed!");
    } else {
        println!("\n⚠️  {} problem(s) found", problems);
    }
    Ok(())
}

fn check_path(label: &str, path: &Path, want_dir: bool) -> usize {
    let ok = if want_dir { path.is_dir() } else { path.is_file() };
    if ok {
        println!("✓ {}: {}", label, path.display());
        0
    } else {
        println!("✗ {}: {} not found", label, path.display());
        1
    }
}
