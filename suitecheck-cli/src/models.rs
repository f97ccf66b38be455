//! Core data models for suitecheck
//!
//! These models are shared by the miner, correlator, probes and reporters.
//! Everything here is plain data: values are created once per analysis run
//! and never mutated after the report is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::coverage::CoverageSummary;

/// Severity levels for validation issues
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Minor,
    Major,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Health of one probed component, or of the whole suite.
///
/// Ordered from best to worst so `max()` picks the worse of two verdicts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "degraded" => Ok(HealthStatus::Degraded),
            "unhealthy" => Ok(HealthStatus::Unhealthy),
            other => Err(format!(
                "Unknown health status '{}'. Valid values: healthy, degraded, unhealthy",
                other
            )),
        }
    }
}

/// One normative acceptance criterion mined from a requirements document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Dotted numeric id ("2.3", "10"); empty when the line had no prefix
    pub id: String,
    pub text: String,
}

/// One correctness property mined from a design document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub text: String,
    /// Requirement ids named on the `**Validates: ...**` line
    #[serde(default)]
    pub validates: Vec<String>,
}

/// Proof that a requirement or property is exercised by a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_function_name: Option<String>,
}

impl Evidence {
    pub fn file(source_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            test_function_name: None,
        }
    }

    pub fn function(source_file: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            test_function_name: Some(name.into()),
        }
    }
}

/// Which kind of document item a coverage record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageKind {
    Requirement,
    Property,
}

impl std::fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageKind::Requirement => write!(f, "Requirement"),
            CoverageKind::Property => write!(f, "Property"),
        }
    }
}

/// Coverage verdict for one requirement or property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub kind: CoverageKind,
    pub id: String,
    pub text: String,
    /// For properties this means "implemented" (a non-stub witness was found)
    pub covered: bool,
    pub evidence: Vec<Evidence>,
    /// Requirement ids a property validates; empty for requirements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validates: Vec<String>,
}

impl CoverageRecord {
    /// `"<Kind> <id>: <text>"`, the missing-coverage line format
    pub fn missing_line(&self) -> String {
        format!("{} {}: {}", self.kind, self.id, self.text)
    }

    /// Name of the winning test function, if the witness was function-level
    pub fn witness_name(&self) -> Option<&str> {
        self.evidence
            .first()
            .and_then(|e| e.test_function_name.as_deref())
    }
}

/// Verdict for one probed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub component: String,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthCheckResult {
    pub fn new(component: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            component: component.into(),
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A problem discovered by one of the probes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub component: String,
    pub description: String,
    pub impact: String,
    pub suggestion: String,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        component: impl Into<String>,
        description: impl Into<String>,
        impact: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            component: component.into(),
            description: description.into(),
            impact: impact.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Six normalized scores summarizing test-suite health, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub test_coverage: f64,
    pub property_coverage: f64,
    pub helper_utilization: f64,
    pub cleanup_effectiveness: f64,
    pub execution_stability: f64,
    pub performance_score: f64,
}

impl QualityMetrics {
    /// Clamp every field into [0, 1]; NaN becomes 0
    pub fn clamped(self) -> Self {
        fn unit(v: f64) -> f64 {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, 1.0)
            }
        }
        Self {
            test_coverage: unit(self.test_coverage),
            property_coverage: unit(self.property_coverage),
            helper_utilization: unit(self.helper_utilization),
            cleanup_effectiveness: unit(self.cleanup_effectiveness),
            execution_stability: unit(self.execution_stability),
            performance_score: unit(self.performance_score),
        }
    }

    /// (name, value) pairs in declaration order
    pub fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("test_coverage", self.test_coverage),
            ("property_coverage", self.property_coverage),
            ("helper_utilization", self.helper_utilization),
            ("cleanup_effectiveness", self.cleanup_effectiveness),
            ("execution_stability", self.execution_stability),
            ("performance_score", self.performance_score),
        ]
    }
}

/// Recommendation priority, highest first when sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A remediation suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    /// Short grouping tag: "coverage", "organization", "performance", or a component name
    pub category: String,
    pub message: String,
}

impl Recommendation {
    pub fn new(priority: Priority, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            priority,
            category: category.into(),
            message: message.into(),
        }
    }
}

/// Health half of a report: probe verdicts plus the aggregated verdict
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub overall_health: HealthStatus,
    pub component_health: BTreeMap<String, HealthStatus>,
    pub quality_metrics: QualityMetrics,
    pub issues: Vec<ValidationIssue>,
    pub recommendations: Vec<Recommendation>,
}

/// Final, immutable snapshot of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub health: HealthSnapshot,
    pub coverage: CoverageSummary,
}
