//! End-to-end tests through the library API
//!
//! Each test lays out a small project (requirements, design, Go test tree)
//! in a temp directory and runs the analyzer over it. A fake cluster client
//! stands in for the Kubernetes API.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use suitecheck::analysis::Analyzer;
use suitecheck::cluster::{ClusterClient, ClusterError};
use suitecheck::config::{ProjectConfig, Thresholds};
use suitecheck::error::{AnalysisError, DocumentKind};
use suitecheck::health::aggregate;
use suitecheck::miner::DocumentMiner;
use suitecheck::models::{HealthStatus, Severity, ValidationIssue};

struct FakeCluster {
    namespaces: Vec<&'static str>,
}

impl ClusterClient for FakeCluster {
    fn server_version(&self) -> Result<String, ClusterError> {
        Ok("v1.30.0".to_string())
    }

    fn namespace_exists(&self, name: &str) -> Result<bool, ClusterError> {
        Ok(self.namespaces.iter().any(|n| *n == name))
    }

    fn crd_exists(&self, _name: &str) -> Result<bool, ClusterError> {
        Ok(true)
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Project layout matching the default config paths
fn project(root: &Path, requirements: &str, design: &str, tests: &[(&str, &str)]) -> ProjectConfig {
    write(root, "docs/requirements.md", requirements);
    write(root, "docs/design.md", design);
    std::fs::create_dir_all(root.join("test/e2e")).unwrap();
    for (name, content) in tests {
        write(root, &format!("test/e2e/{}", name), content);
    }
    let mut config = ProjectConfig::default();
    config.probes.cluster = false;
    config.resolve_inputs(root);
    config
}

const TWO_REQUIREMENTS: &str = "\
# Requirements

### Requirement 1: Policy application

1. WHEN an optimization policy is created THE controller SHALL compute recommendations
2. WHEN a recommendation exceeds the bounds THE controller SHALL clamp it
";

const THREE_REQUIREMENTS: &str = "\
1.1 WHEN a policy targets a workload THE controller SHALL annotate the workload
1.2 WHEN a policy is paused THE controller SHALL stop updating the workload
2.1 WHEN a policy is deleted THE controller SHALL restore the original resources
";

const TWO_PROPERTIES: &str = "\
## Correctness Properties

Property 1: Recommendations respect bounds
*For any* workload W and policy P, every recommendation lies within P's bounds
**Validates: Requirements 1.1, 1.2**

Property 2: Deletion restores resources
*For any* policy P, deleting P restores the workload's original requests
**Validates: Requirements 2.1**
";

const SCENARIO_B_TEST: &str = r#"package e2e

import "testing"

// Exercises Requirement 1.1, Requirement 1.2 and Requirement 2.1

// Property 1: recommendations respect bounds
func TestBounds(t *testing.T) {
	t.Log("checking bounds")
}

// Property 2: deletion restores resources
func TestRestore(t *testing.T) {
	// TODO: delete the policy and compare requests
}
"#;

#[test]
fn scenario_a_unreferenced_requirements_are_zero_percent() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(
        dir.path(),
        TWO_REQUIREMENTS,
        "# Design\n",
        &[("smoke_test.go", "package e2e\n\nfunc TestSmoke(t *testing.T) {}\n")],
    );

    let coverage = Analyzer::new(config).coverage().unwrap();
    assert_eq!(coverage.requirements.len(), 2);
    assert_eq!(coverage.coverage_percent, 0.0);
    assert_eq!(coverage.missing_coverage.len(), 2);
    assert!(coverage.missing_coverage[0].starts_with("Requirement 1: WHEN an optimization policy"));
}

#[test]
fn scenario_b_eighty_percent_with_stub_property() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(
        dir.path(),
        THREE_REQUIREMENTS,
        TWO_PROPERTIES,
        &[("policy_test.go", SCENARIO_B_TEST)],
    );

    let coverage = Analyzer::new(config).coverage().unwrap();
    assert!(coverage.requirements.iter().all(|r| r.covered));
    assert!(coverage.properties[0].covered);
    assert_eq!(coverage.properties[0].witness_name(), Some("TestBounds"));
    assert!(!coverage.properties[1].covered, "TODO body must not count");
    assert!((coverage.coverage_percent - 80.0).abs() < 1e-9);
    assert_eq!(
        coverage.missing_coverage,
        vec!["Property 2: Deletion restores resources"]
    );
    assert_eq!(coverage.properties[0].evidence[0].source_file, Path::new("policy_test.go"));
    assert_eq!(coverage.properties[0].validates, vec!["1.1", "1.2"]);
}

fn components(statuses: &[HealthStatus]) -> BTreeMap<String, HealthStatus> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, s)| (format!("component-{}", i), *s))
        .collect()
}

fn issues(severity: Severity, n: usize) -> Vec<ValidationIssue> {
    (0..n)
        .map(|i| ValidationIssue::new(severity, format!("c{}", i), "problem", "impact", "fix it"))
        .collect()
}

#[test]
fn scenario_c_healthy() {
    let health = components(&[HealthStatus::Healthy, HealthStatus::Healthy]);
    assert_eq!(
        aggregate(&health, &issues(Severity::Minor, 1), &Thresholds::default()),
        HealthStatus::Healthy
    );
}

#[test]
fn scenario_d_degraded() {
    let health = components(&[HealthStatus::Degraded; 4]);
    assert_eq!(
        aggregate(&health, &issues(Severity::Major, 3), &Thresholds::default()),
        HealthStatus::Degraded
    );
}

#[test]
fn scenario_e_unhealthy() {
    let health = components(&[HealthStatus::Unhealthy; 3]);
    assert_eq!(
        aggregate(&health, &issues(Severity::Critical, 1), &Thresholds::default()),
        HealthStatus::Unhealthy
    );
}

#[test]
fn scenario_f_few_test_files_get_organizational_advice() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(
        dir.path(),
        TWO_REQUIREMENTS,
        "# Design\n",
        &[(
            "policy_test.go",
            "package e2e\n\n// Requirement 1 and Requirement 2\nfunc TestPolicy(t *testing.T) {}\n",
        )],
    );

    let coverage = Analyzer::new(config).coverage().unwrap();
    assert_eq!(coverage.coverage_percent, 100.0);
    assert!(coverage
        .recommendations
        .iter()
        .any(|r| r.category == "organization"));
}

#[test]
fn property_id_one_does_not_match_ten_or_eleven() {
    let dir = tempfile::tempdir().unwrap();
    let design = "\
Property 1: First
*For any* x, first holds
**Validates: Requirements 1**
";
    let config = project(
        dir.path(),
        "",
        design,
        &[(
            "many_test.go",
            "package e2e\n\n// Property 10 and Property 11\nfunc TestMany(t *testing.T) {}\n",
        )],
    );
    let coverage = Analyzer::new(config).coverage().unwrap();
    assert!(!coverage.properties[0].covered);
}

#[test]
fn mining_twice_yields_identical_lists() {
    let miner = DocumentMiner::builtin().unwrap();
    assert_eq!(
        miner.mine_requirements(THREE_REQUIREMENTS),
        miner.mine_requirements(THREE_REQUIREMENTS)
    );
    let props = miner.mine_properties(TWO_PROPERTIES);
    assert_eq!(props, miner.mine_properties(TWO_PROPERTIES));
    let ids: Vec<_> = props.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(props[0].validates, vec!["1.1", "1.2"]);
}

#[test]
fn unreadable_requirements_document_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), THREE_REQUIREMENTS, TWO_PROPERTIES, &[]);
    std::fs::remove_file(dir.path().join("docs/requirements.md")).unwrap();

    match Analyzer::new(config).run() {
        Err(AnalysisError::DocumentUnreadable { kind, path, .. }) => {
            assert_eq!(kind, DocumentKind::Requirements);
            assert!(path.ends_with("docs/requirements.md"));
        }
        other => panic!("expected DocumentUnreadable, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unparseable_test_file_still_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(
        dir.path(),
        THREE_REQUIREMENTS,
        "",
        &[
            ("broken_test.go", "package e2e\n\n// Requirement 2.1\nfunc TestBroken( {\n"),
            ("ok_test.go", "package e2e\n"),
        ],
    );
    let coverage = Analyzer::new(config).coverage().unwrap();
    assert_eq!(coverage.test_files.len(), 2);
    assert!(coverage.requirements[2].covered);
}

#[test]
fn full_run_with_fake_cluster() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = project(
        dir.path(),
        THREE_REQUIREMENTS,
        TWO_PROPERTIES,
        &[("policy_test.go", SCENARIO_B_TEST)],
    );
    config.probes.cluster = true;
    config.probes.namespaces = vec!["kube-system".to_string()];

    let report = Analyzer::new(config)
        .with_cluster(Arc::new(FakeCluster {
            namespaces: vec!["kube-system"],
        }))
        .run()
        .unwrap();

    let health = &report.health;
    assert_eq!(health.component_health["cluster_connectivity"], HealthStatus::Healthy);
    assert_eq!(health.component_health["resource_availability"], HealthStatus::Healthy);
    assert!(health.component_health.contains_key("helper:policy"));
    assert!(health.component_health.contains_key("test_structure"));
    assert!(health.component_health.contains_key("quality_metrics"));
    for (name, value) in health.quality_metrics.fields() {
        assert!((0.0..=1.0).contains(&value), "{} = {}", name, value);
    }
    // Coverage recommendations are carried into the merged list
    assert!(health
        .recommendations
        .iter()
        .any(|r| r.category == "organization"));
    assert!((report.coverage.coverage_percent - 80.0).abs() < 1e-9);
}

#[test]
fn zero_items_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), "", "", &[]);
    let coverage = Analyzer::new(config).coverage().unwrap();
    assert_eq!(coverage.coverage_percent, 0.0);
    assert!(coverage.missing_coverage.is_empty());
}
