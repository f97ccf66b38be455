//! Analyze, coverage and health commands

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::Cli;
use crate::analysis::Analyzer;
use crate::cluster::KubectlClient;
use crate::config::{load_config_file, load_project_config, ProjectConfig};
use crate::models::HealthStatus;
use crate::probes::CancelToken;
use crate::reporters::{self, OutputFormat, ReportView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    Full,
    Coverage,
    Health,
}

pub(super) fn run(cli: &Cli, mode: Mode) -> Result<()> {
    let format = OutputFormat::from_str(&cli.format)?;
    let fail_on = cli.fail_on_status()?;
    let config = load_config(cli)?;

    let cancel = CancelToken::new();
    let client = (config.probes.cluster && mode != Mode::Coverage).then(|| {
        Arc::new(KubectlClient::from_config(&config.probes).with_cancel(cancel.clone()))
    });
    let mut analyzer = Analyzer::new(config).with_cancel(cancel);
    if let Some(client) = client {
        analyzer = analyzer.with_cluster(client);
    }

    let spinner = spinner(match mode {
        Mode::Full => "Analyzing test suite...",
        Mode::Coverage => "Correlating coverage...",
        Mode::Health => "Probing component health...",
    });

    let color = !cli.no_color && cli.output.is_none() && console::colors_enabled();
    let (rendered, failures) = match mode {
        Mode::Full => {
            let report = analyzer.run();
            spinner.finish_and_clear();
            let report = report.context("Analysis failed")?;
            let view = ReportView::Full(&report);
            (
                reporters::render(view, format, color)?,
                gate_failures(view, cli.fail_under, fail_on),
            )
        }
        Mode::Coverage => {
            let coverage = analyzer.coverage();
            spinner.finish_and_clear();
            let coverage = coverage.context("Coverage analysis failed")?;
            let view = ReportView::Coverage(&coverage);
            (
                reporters::render(view, format, color)?,
                gate_failures(view, cli.fail_under, fail_on),
            )
        }
        Mode::Health => {
            let health = analyzer.health();
            spinner.finish_and_clear();
            let health = health.context("Health check failed")?;
            let view = ReportView::Health(&health);
            (
                reporters::render(view, format, color)?,
                gate_failures(view, cli.fail_under, fail_on),
            )
        }
    };

    write_output(&rendered, cli.output.as_deref())?;

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{} {}", style("✗").red(), failure);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Config file plus command-line overrides, with inputs resolved against the project dir
pub(super) fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_project_config(&cli.path),
    };

    if let Some(p) = &cli.requirements {
        config.inputs.requirements = p.clone();
    }
    if let Some(p) = &cli.design {
        config.inputs.design = p.clone();
    }
    if let Some(p) = &cli.tests {
        config.inputs.tests = p.clone();
    }
    if cli.offline {
        config.probes.cluster = false;
    }
    if let Some(secs) = cli.timeout_secs {
        config.probes.timeout_secs = secs;
    }

    config.resolve_inputs(&cli.path);
    config.validate()?;
    debug!("Effective config: {:?}", config);
    Ok(config)
}

/// Reasons to exit non-zero; empty when every gate passes
pub(super) fn gate_failures(
    view: ReportView<'_>,
    fail_under: Option<f64>,
    fail_on: Option<HealthStatus>,
) -> Vec<String> {
    let mut failures = Vec::new();
    if let (Some(threshold), Some(coverage)) = (fail_under, view.coverage()) {
        if coverage.coverage_percent < threshold {
            failures.push(format!(
                "Coverage {:.1}% is below --fail-under={}",
                coverage.coverage_percent, threshold
            ));
        }
    }
    if let (Some(level), Some(health)) = (fail_on, view.health()) {
        if health.overall_health >= level {
            failures.push(format!(
                "Overall health is {} (--fail-on={})",
                health.overall_health, level
            ));
        }
    }
    failures
}

fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Report written to: {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}");
    if let Ok(style) = style {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
