//! Coverage aggregation
//!
//! Turns correlator records into a percentage, the missing-coverage list and
//! first-pass recommendations.
//!
//! ```text
//! CoveragePercent = 100 × (covered requirements + implemented properties)
//!                       / (total requirements + total properties)
//! ```
//!
//! The percentage is 0 when there is nothing to cover.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Thresholds;
use crate::models::{CoverageRecord, Priority, Recommendation};

/// Coverage half of a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub requirements: Vec<CoverageRecord>,
    pub properties: Vec<CoverageRecord>,
    pub coverage_percent: f64,
    /// `"<Kind> <id>: <text>"` for every uncovered item
    pub missing_coverage: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Enumerated test files, relative to the test root
    pub test_files: Vec<PathBuf>,
}

impl CoverageSummary {
    pub fn covered_requirements(&self) -> usize {
        self.requirements.iter().filter(|r| r.covered).count()
    }

    pub fn implemented_properties(&self) -> usize {
        self.properties.iter().filter(|p| p.covered).count()
    }
}

/// Percentage of covered items, 0 when `total` is 0
pub fn coverage_percent(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (100.0 * covered as f64 / total as f64).clamp(0.0, 100.0)
}

/// Aggregate correlator output into a summary
pub fn summarize(
    requirements: Vec<CoverageRecord>,
    properties: Vec<CoverageRecord>,
    test_files: Vec<PathBuf>,
    thresholds: &Thresholds,
) -> CoverageSummary {
    let covered = requirements.iter().filter(|r| r.covered).count()
        + properties.iter().filter(|p| p.covered).count();
    let total = requirements.len() + properties.len();
    let percent = coverage_percent(covered, total);

    let missing_coverage: Vec<String> = requirements
        .iter()
        .chain(properties.iter())
        .filter(|r| !r.covered)
        .map(CoverageRecord::missing_line)
        .collect();

    let uncovered_reqs = requirements.iter().filter(|r| !r.covered).count();
    let unimplemented_props = properties.iter().filter(|p| !p.covered).count();

    let recommendations = coverage_recommendations(
        percent,
        uncovered_reqs,
        unimplemented_props,
        test_files.len(),
        thresholds,
    );

    CoverageSummary {
        requirements,
        properties,
        coverage_percent: percent,
        missing_coverage,
        recommendations,
        test_files,
    }
}

/// First-pass recommendations driven by fixed thresholds
pub fn coverage_recommendations(
    percent: f64,
    uncovered_requirements: usize,
    unimplemented_properties: usize,
    test_file_count: usize,
    thresholds: &Thresholds,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if percent < thresholds.coverage_target_percent {
        recs.push(Recommendation::new(
            Priority::High,
            "coverage",
            format!(
                "Add more tests: overall coverage is {:.1}%, below the {:.0}% target",
                percent, thresholds.coverage_target_percent
            ),
        ));
    }

    if uncovered_requirements > 0 {
        recs.push(Recommendation::new(
            Priority::High,
            "coverage",
            format!(
                "Add tests referencing the {} uncovered requirement{}",
                uncovered_requirements,
                plural(uncovered_requirements)
            ),
        ));
    }

    if unimplemented_properties > 0 {
        recs.push(Recommendation::new(
            Priority::Medium,
            "coverage",
            format!(
                "Implement property tests for the {} unimplemented correctness propert{}",
                unimplemented_properties,
                if unimplemented_properties == 1 { "y" } else { "ies" }
            ),
        ));
    }

    if test_file_count < thresholds.min_test_files {
        recs.push(Recommendation::new(
            Priority::Low,
            "organization",
            format!(
                "Organize the suite into more focused test files: found {}, expected at least {}",
                test_file_count, thresholds.min_test_files
            ),
        ));
    }

    recs
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
