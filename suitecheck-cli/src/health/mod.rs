//! Health aggregation
//!
//! Reduces one snapshot of probe verdicts and issues to a single
//! [`HealthStatus`]. No history is kept; the same inputs always produce the
//! same verdict.
//!
//! | Verdict | Condition |
//! |---|---|
//! | Unhealthy | any `Critical` issue, or ≥ `unhealthy_fraction` of components unhealthy |
//! | Degraded | ≥ `degraded_fraction` of components degraded, or ≥ `major_issue_limit` `Major` issues |
//! | Healthy | otherwise |

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::config::Thresholds;
use crate::models::{
    HealthSnapshot, HealthStatus, Priority, QualityMetrics, Recommendation, Severity,
    ValidationIssue,
};
use crate::probes::ProbeReport;

/// Overall verdict for one snapshot
pub fn aggregate(
    component_health: &BTreeMap<String, HealthStatus>,
    issues: &[ValidationIssue],
    thresholds: &Thresholds,
) -> HealthStatus {
    let total = component_health.len();
    let fraction = |status: HealthStatus| -> f64 {
        if total == 0 {
            return 0.0;
        }
        component_health.values().filter(|s| **s == status).count() as f64 / total as f64
    };
    let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();

    let unhealthy = fraction(HealthStatus::Unhealthy);
    let degraded = fraction(HealthStatus::Degraded);
    let critical = count(Severity::Critical);
    let major = count(Severity::Major);
    debug!(
        "Aggregating {} components: unhealthy={:.2} degraded={:.2} critical={} major={}",
        total, unhealthy, degraded, critical, major
    );

    if critical > 0 || unhealthy >= thresholds.unhealthy_fraction {
        HealthStatus::Unhealthy
    } else if degraded >= thresholds.degraded_fraction || major >= thresholds.major_issue_limit {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Merge coverage recommendations with metric- and issue-driven ones.
///
/// The result is stably sorted by priority and free of duplicate messages.
pub fn merge_recommendations(
    coverage: &[Recommendation],
    metrics: &QualityMetrics,
    issues: &[ValidationIssue],
    thresholds: &Thresholds,
) -> Vec<Recommendation> {
    let target = thresholds.quality_target;
    let mut recs: Vec<Recommendation> = coverage.to_vec();

    if metrics.test_coverage < target {
        recs.push(Recommendation::new(
            Priority::High,
            "coverage",
            format!(
                "Increase test coverage: test file coverage score is {:.2}",
                metrics.test_coverage
            ),
        ));
    }
    if metrics.property_coverage < target {
        recs.push(Recommendation::new(
            Priority::Medium,
            "coverage",
            format!(
                "Improve property test coverage: {:.0}% of test files reference a property",
                metrics.property_coverage * 100.0
            ),
        ));
    }
    if metrics.performance_score < target {
        recs.push(Recommendation::new(
            Priority::Low,
            "performance",
            format!(
                "Improve test performance: only {:.0}% of test files bound their waits with timeouts",
                metrics.performance_score * 100.0
            ),
        ));
    }

    for issue in issues {
        let priority = match issue.severity {
            Severity::Critical => Priority::High,
            Severity::Major => Priority::Medium,
            Severity::Minor => continue,
        };
        recs.push(Recommendation::new(
            priority,
            issue.component.clone(),
            issue.suggestion.clone(),
        ));
    }

    recs.sort_by_key(|r| r.priority);
    let mut seen = HashSet::new();
    recs.retain(|r| seen.insert(r.message.clone()));
    recs
}

/// Health half of the report from merged probe output
pub fn snapshot(
    probes: ProbeReport,
    coverage_recommendations: &[Recommendation],
    thresholds: &Thresholds,
) -> HealthSnapshot {
    let overall_health = aggregate(&probes.component_health, &probes.issues, thresholds);
    let recommendations = merge_recommendations(
        coverage_recommendations,
        &probes.quality_metrics,
        &probes.issues,
        thresholds,
    );
    HealthSnapshot {
        overall_health,
        component_health: probes.component_health,
        quality_metrics: probes.quality_metrics,
        issues: probes.issues,
        recommendations,
    }
}
