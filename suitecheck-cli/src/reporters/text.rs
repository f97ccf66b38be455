//! Text (terminal) reporter
//!
//! Line-oriented and deterministic: the same report always renders to the
//! same text. Colors are ANSI escapes and can be switched off for pipes.

use std::fmt::Write;

use super::ReportView;
use crate::coverage::CoverageSummary;
use crate::models::{CoverageRecord, HealthSnapshot, HealthStatus, Recommendation, Severity};

#[derive(Clone, Copy)]
struct Palette {
    bold: &'static str,
    dim: &'static str,
    green: &'static str,
    yellow: &'static str,
    red: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                green: "\x1b[32m",
                yellow: "\x1b[33m",
                red: "\x1b[31m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                bold: "",
                dim: "",
                green: "",
                yellow: "",
                red: "",
                reset: "",
            }
        }
    }

    fn status(&self, status: HealthStatus) -> &'static str {
        match status {
            HealthStatus::Healthy => self.green,
            HealthStatus::Degraded => self.yellow,
            HealthStatus::Unhealthy => self.red,
        }
    }

    fn severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Minor => self.dim,
            Severity::Major => self.yellow,
            Severity::Critical => self.red,
        }
    }
}

fn mark(covered: bool) -> &'static str {
    if covered {
        "✅"
    } else {
        "❌"
    }
}

/// Render a view as terminal text
pub fn render(view: ReportView<'_>, color: bool) -> String {
    let p = Palette::new(color);
    let mut out = String::new();

    let _ = writeln!(out, "{}Test Suite Health Report{}", p.bold, p.reset);
    let _ = writeln!(out, "{}──────────────────────────────────────{}", p.dim, p.reset);

    if let Some(health) = view.health() {
        let _ = writeln!(
            out,
            "Overall health: {}{}{}{}",
            p.bold,
            p.status(health.overall_health),
            health.overall_health,
            p.reset
        );
    }
    if let Some(coverage) = view.coverage() {
        render_coverage(&mut out, coverage, &p);
    }

    render_recommendations(&mut out, view.recommendations(), &p);

    if let Some(health) = view.health() {
        render_health(&mut out, health, &p);
    }
    if let Some(coverage) = view.coverage() {
        let _ = writeln!(
            out,
            "\n{}TEST FILES{} ({})",
            p.bold,
            p.reset,
            coverage.test_files.len()
        );
        for file in &coverage.test_files {
            let _ = writeln!(out, "  {}", file.display().to_string().replace('\\', "/"));
        }
    }

    out
}

fn render_coverage(out: &mut String, coverage: &CoverageSummary, p: &Palette) {
    let _ = writeln!(
        out,
        "Coverage: {}{:.1}%{} ({}/{} requirements, {}/{} properties)",
        p.bold,
        coverage.coverage_percent,
        p.reset,
        coverage.covered_requirements(),
        coverage.requirements.len(),
        coverage.implemented_properties(),
        coverage.properties.len()
    );

    let _ = writeln!(out, "\n{}REQUIREMENTS{}", p.bold, p.reset);
    if coverage.requirements.is_empty() {
        let _ = writeln!(out, "  (none found)");
    }
    for record in &coverage.requirements {
        let files = record.evidence.len();
        let _ = writeln!(
            out,
            "  {} Requirement {}: {} ({} file{})",
            mark(record.covered),
            record.id,
            record.text,
            files,
            if files == 1 { "" } else { "s" }
        );
    }

    let _ = writeln!(out, "\n{}PROPERTIES{}", p.bold, p.reset);
    if coverage.properties.is_empty() {
        let _ = writeln!(out, "  (none found)");
    }
    for record in &coverage.properties {
        let _ = writeln!(
            out,
            "  {} Property {}: {}{}{}",
            mark(record.covered),
            record.id,
            record.text,
            witness(record),
            validates(record)
        );
    }

    if !coverage.missing_coverage.is_empty() {
        let _ = writeln!(out, "\n{}MISSING COVERAGE{}", p.bold, p.reset);
        for line in &coverage.missing_coverage {
            let _ = writeln!(out, "  - {}", line);
        }
    }
}

/// ` [TestName]`, ` [file.go]` for a file-level witness, or nothing
fn witness(record: &CoverageRecord) -> String {
    match (record.witness_name(), record.evidence.first()) {
        (Some(name), _) => format!(" [{}]", name),
        (None, Some(evidence)) => format!(
            " [{}]",
            evidence.source_file.display().to_string().replace('\\', "/")
        ),
        (None, None) => String::new(),
    }
}

/// ` (validates 1.1, 1.2)` or nothing
fn validates(record: &CoverageRecord) -> String {
    if record.validates.is_empty() {
        String::new()
    } else {
        format!(" (validates {})", record.validates.join(", "))
    }
}

fn render_recommendations(out: &mut String, recs: &[Recommendation], p: &Palette) {
    if recs.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}RECOMMENDATIONS{}", p.bold, p.reset);
    for rec in recs {
        let _ = writeln!(out, "  [{}] {}: {}", rec.priority, rec.category, rec.message);
    }
}

fn render_health(out: &mut String, health: &HealthSnapshot, p: &Palette) {
    let _ = writeln!(out, "\n{}COMPONENT HEALTH{}", p.bold, p.reset);
    let width = health
        .component_health
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0);
    for (component, status) in &health.component_health {
        let _ = writeln!(
            out,
            "  {:<width$}  {}{}{}",
            component,
            p.status(*status),
            status,
            p.reset,
            width = width
        );
    }

    if !health.issues.is_empty() {
        let _ = writeln!(out, "\n{}ISSUES{} ({})", p.bold, p.reset, health.issues.len());
        for issue in &health.issues {
            let _ = writeln!(
                out,
                "  {}[{}]{} {}: {}",
                p.severity(issue.severity),
                issue.severity,
                p.reset,
                issue.component,
                issue.description
            );
            let _ = writeln!(out, "      {}impact: {}{}", p.dim, issue.impact, p.reset);
            let _ = writeln!(out, "      {}fix: {}{}", p.dim, issue.suggestion, p.reset);
        }
    }

    let _ = writeln!(out, "\n{}QUALITY METRICS{}", p.bold, p.reset);
    for (name, value) in health.quality_metrics.fields() {
        let _ = writeln!(out, "  {:<22} {:.2}", name, value);
    }
}
