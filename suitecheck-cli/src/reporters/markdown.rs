//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - CI job summaries
//! - Documentation

use super::ReportView;
use crate::coverage::CoverageSummary;
use crate::models::{CoverageRecord, HealthSnapshot, HealthStatus, Recommendation, Severity};

/// Render a view as GitHub-flavored Markdown
pub fn render(view: ReportView<'_>) -> String {
    let mut md = String::new();

    md.push_str(&render_header(view));
    md.push('\n');

    if let Some(coverage) = view.coverage() {
        md.push_str(&render_coverage(coverage));
        md.push('\n');
    }

    md.push_str(&render_recommendations(view.recommendations()));
    md.push('\n');

    if let Some(health) = view.health() {
        md.push_str(&render_health(health));
        md.push('\n');
    }

    if let Some(coverage) = view.coverage() {
        md.push_str(&render_files(coverage));
        md.push('\n');
    }

    md.push_str(&render_footer());
    md
}

fn render_header(view: ReportView<'_>) -> String {
    let mut md = String::from("# Test Suite Health Report\n\n");
    if let ReportView::Full(report) = view {
        md.push_str(&format!(
            "Generated: {}\n\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    md.push_str("| Metric | Value |\n|--------|-------|\n");
    if let Some(health) = view.health() {
        md.push_str(&format!(
            "| **Overall Health** | {} {} |\n",
            status_emoji(health.overall_health),
            health.overall_health
        ));
    }
    if let Some(coverage) = view.coverage() {
        md.push_str(&format!(
            "| **Coverage** | {:.1}% |\n| **Requirements** | {}/{} |\n| **Properties** | {}/{} |\n| **Test Files** | {} |\n",
            coverage.coverage_percent,
            coverage.covered_requirements(),
            coverage.requirements.len(),
            coverage.implemented_properties(),
            coverage.properties.len(),
            coverage.test_files.len()
        ));
    }
    md
}

fn render_coverage(coverage: &CoverageSummary) -> String {
    let mut md = String::from("## Requirements\n\n");
    if coverage.requirements.is_empty() {
        md.push_str("No requirements found.\n");
    } else {
        md.push_str("| | ID | Requirement | Evidence |\n|---|----|-------------|----------|\n");
        for record in &coverage.requirements {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                mark(record.covered),
                record.id,
                escape_cell(&record.text),
                evidence_files(record)
            ));
        }
    }

    md.push_str("\n## Properties\n\n");
    if coverage.properties.is_empty() {
        md.push_str("No correctness properties found.\n");
    } else {
        md.push_str("| | ID | Property | Validates | Test |\n|---|----|----------|-----------|------|\n");
        for record in &coverage.properties {
            let test = record
                .witness_name()
                .map(|n| format!("`{}`", n))
                .unwrap_or_else(|| evidence_files(record));
            let validates = if record.validates.is_empty() {
                "-".to_string()
            } else {
                record.validates.join(", ")
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                mark(record.covered),
                record.id,
                escape_cell(&record.text),
                validates,
                test
            ));
        }
    }

    if !coverage.missing_coverage.is_empty() {
        md.push_str("\n### Missing Coverage\n\n");
        for line in &coverage.missing_coverage {
            md.push_str(&format!("- {}\n", line));
        }
    }
    md
}

fn render_recommendations(recs: &[Recommendation]) -> String {
    let mut md = String::from("## Recommendations\n\n");
    if recs.is_empty() {
        md.push_str("✅ Nothing to recommend.\n");
        return md;
    }
    for rec in recs {
        md.push_str(&format!(
            "- **{}** ({}): {}\n",
            rec.priority, rec.category, rec.message
        ));
    }
    md
}

fn render_health(health: &HealthSnapshot) -> String {
    let mut md = String::from("## Component Health\n\n| Component | Status |\n|-----------|--------|\n");
    for (component, status) in &health.component_health {
        md.push_str(&format!(
            "| {} | {} {} |\n",
            component,
            status_emoji(*status),
            status
        ));
    }

    md.push_str("\n## Issues\n\n");
    if health.issues.is_empty() {
        md.push_str("✅ No issues found.\n");
    } else {
        for issue in &health.issues {
            md.push_str(&format!(
                "- {} **{}** `{}`: {}\n  - Impact: {}\n  - Fix: {}\n",
                severity_emoji(issue.severity),
                issue.severity,
                issue.component,
                issue.description,
                issue.impact,
                issue.suggestion
            ));
        }
    }

    md.push_str("\n## Quality Metrics\n\n| Metric | Score |\n|--------|-------|\n");
    for (name, value) in health.quality_metrics.fields() {
        md.push_str(&format!("| {} | {:.2} |\n", name, value));
    }
    md
}

fn render_files(coverage: &CoverageSummary) -> String {
    let mut md = format!(
        "<details>\n<summary>Test files ({})</summary>\n\n",
        coverage.test_files.len()
    );
    for file in &coverage.test_files {
        md.push_str(&format!(
            "- `{}`\n",
            file.display().to_string().replace('\\', "/")
        ));
    }
    md.push_str("\n</details>\n");
    md
}

fn render_footer() -> String {
    "---\n\n*Generated by suitecheck*\n".to_string()
}

fn mark(covered: bool) -> &'static str {
    if covered {
        "✅"
    } else {
        "❌"
    }
}

fn evidence_files(record: &CoverageRecord) -> String {
    if record.evidence.is_empty() {
        return "-".to_string();
    }
    record
        .evidence
        .iter()
        .map(|e| format!("`{}`", e.source_file.display().to_string().replace('\\', "/")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn status_emoji(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "🟢",
        HealthStatus::Degraded => "🟡",
        HealthStatus::Unhealthy => "🔴",
    }
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Major => "🟠",
        Severity::Minor => "🔵",
    }
}
