//! Quality metrics probe
//!
//! Derives the six [`QualityMetrics`] scores from static inspection of the
//! test files:
//!
//! | Metric | Score |
//! |---|---|
//! | test_coverage | test files / `min_test_files`, capped at 1 |
//! | property_coverage | share of files referencing `Property N` |
//! | helper_utilization | share of files using a helper package or constructor |
//! | cleanup_effectiveness | share of files with `AfterEach`, `DeferCleanup`, `defer` or `.Cleanup(` |
//! | execution_stability | 1 − share of files with sleeps, skips or flaky markers; 0 with no files |
//! | performance_score | share of files bounding waits with explicit timeouts |

use regex::Regex;
use std::sync::OnceLock;

use super::{HealthProbe, ProbeContext, ProbeOutcome};
use crate::models::{HealthCheckResult, HealthStatus, QualityMetrics, Severity, ValidationIssue};

fn property_ref() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bproperty\s+\d+\b").expect("valid regex"))
}

fn cleanup_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:AfterEach|DeferCleanup|defer)\b|\.Cleanup\(").expect("valid regex")
    })
}

fn instability_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"time\.Sleep\(|\bSkip\(|\bFlaky\b|\bFIXME\b").expect("valid regex")
    })
}

fn timeout_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"WithTimeout\(|SetDefaultEventuallyTimeout\(").expect("valid regex")
    })
}

/// Compute metrics over test file contents. `helper_markers` are substrings
/// that indicate a helper is used (package qualifier or constructor name).
pub fn compute_metrics(
    sources: &[&str],
    min_test_files: usize,
    helper_markers: &[&str],
) -> QualityMetrics {
    let n = sources.len();
    let test_coverage = if min_test_files == 0 {
        1.0
    } else {
        n as f64 / min_test_files as f64
    };

    QualityMetrics {
        test_coverage,
        property_coverage: share(sources, |s| property_ref().is_match(s)),
        helper_utilization: share(sources, |s| helper_markers.iter().any(|m| s.contains(m))),
        cleanup_effectiveness: share(sources, |s| cleanup_marker().is_match(s)),
        execution_stability: stability(sources),
        performance_score: share(sources, |s| timeout_marker().is_match(s)),
    }
    .clamped()
}

/// 1 minus the share of unstable sources; nothing to run is not stable
fn stability(sources: &[&str]) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }
    1.0 - share(sources, |s| instability_marker().is_match(s))
}

/// Fraction of sources satisfying `pred`; 0 for no sources
fn share(sources: &[&str], pred: impl Fn(&str) -> bool) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }
    sources.iter().filter(|s| pred(**s)).count() as f64 / sources.len() as f64
}

fn suggestion(metric: &str) -> &'static str {
    match metric {
        "test_coverage" => "Add test files for uncovered scenarios",
        "property_coverage" => "Reference correctness properties (\"Property N\") from property tests",
        "helper_utilization" => "Use the shared helpers instead of ad-hoc setup code",
        "cleanup_effectiveness" => "Register cleanup with AfterEach or DeferCleanup",
        "execution_stability" => "Replace fixed sleeps and skips with Eventually-style polling",
        _ => "Bound waits with context.WithTimeout or SetDefaultEventuallyTimeout",
    }
}

pub struct QualityProbe;

impl HealthProbe for QualityProbe {
    fn name(&self) -> &'static str {
        "quality_metrics"
    }

    fn description(&self) -> &'static str {
        "Scores the test suite from keyword density and file counts"
    }

    fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let loaded: Vec<_> = ctx
            .index
            .files()
            .iter()
            .filter_map(|p| ctx.index.source(p))
            .collect();
        let sources: Vec<&str> = loaded.iter().map(|s| &**s).collect();

        let mut markers: Vec<&str> = vec!["helpers."];
        markers.extend(ctx.probes.helpers.iter().map(|h| h.constructor.as_str()));

        let metrics = compute_metrics(&sources, ctx.thresholds.min_test_files, &markers);
        let target = ctx.thresholds.quality_target;

        let mut issues = Vec::new();
        for (metric, value) in metrics.fields() {
            if value >= target {
                continue;
            }
            let severity = if value < 0.5 {
                Severity::Major
            } else {
                Severity::Minor
            };
            issues.push(ValidationIssue::new(
                severity,
                self.name(),
                format!("{} is {:.2}, below target {:.2}", metric, value, target),
                "Suite quality is below the expected level",
                suggestion(metric),
            ));
        }

        let status = if issues.is_empty() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        ProbeOutcome {
            results: vec![HealthCheckResult::new(self.name(), status)
                .with_detail(format!("{} metrics below target", issues.len()))],
            issues,
            metrics: Some(metrics),
        }
    }
}
