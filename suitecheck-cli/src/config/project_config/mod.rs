//! Project-level configuration support
//!
//! Loads per-project configuration from `suitecheck.toml` (or
//! `.suitecheckrc.json`) in the working directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # suitecheck.toml
//!
//! [inputs]
//! requirements = "docs/requirements.md"
//! design = "docs/design.md"
//! tests = "test/e2e"
//!
//! [index]
//! test_file_suffix = "_test.go"
//! test_function_prefix = "Test"
//!
//! [thresholds]
//! coverage_target_percent = 80.0
//! min_test_files = 8
//!
//! [probes]
//! timeout_secs = 30
//! namespaces = ["kube-system"]
//! crds = ["optimizationpolicies.example.io"]
//!
//! [[probes.content_checks]]
//! path = "e2e_suite_test.go"
//! pattern = "RunSpecs\\("
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};

/// File names searched, in order, by [`load_project_config`]
pub const CONFIG_FILE_NAMES: &[&str] = &["suitecheck.toml", ".suitecheckrc.json"];

/// Project-level configuration loaded from suitecheck.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Locations of the analyzed documents and test tree
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Test file and test function conventions
    #[serde(default)]
    pub index: IndexConfig,

    /// Extraction rule overrides
    #[serde(default)]
    pub miner: MinerConfig,

    /// Fixed thresholds for recommendations and health aggregation
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Health probe settings
    #[serde(default)]
    pub probes: ProbeConfig,
}

/// Input document and test-tree locations
#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    #[serde(default = "default_requirements_path")]
    pub requirements: PathBuf,

    #[serde(default = "default_design_path")]
    pub design: PathBuf,

    #[serde(default = "default_tests_path")]
    pub tests: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            requirements: default_requirements_path(),
            design: default_design_path(),
            tests: default_tests_path(),
        }
    }
}

fn default_requirements_path() -> PathBuf {
    PathBuf::from("docs/requirements.md")
}
fn default_design_path() -> PathBuf {
    PathBuf::from("docs/design.md")
}
fn default_tests_path() -> PathBuf {
    PathBuf::from("test/e2e")
}

/// Naming conventions used to find test files and test entry points
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Filename suffix selecting test sources (default: `_test.go`)
    #[serde(default = "default_test_file_suffix")]
    pub test_file_suffix: String,

    /// Prefix of top-level test entry points (default: `Test`)
    #[serde(default = "default_test_function_prefix")]
    pub test_function_prefix: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            test_file_suffix: default_test_file_suffix(),
            test_function_prefix: default_test_function_prefix(),
        }
    }
}

fn default_test_file_suffix() -> String {
    "_test.go".to_string()
}
fn default_test_function_prefix() -> String {
    "Test".to_string()
}

/// Extraction rule overrides; empty lists keep the built-in rules
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MinerConfig {
    #[serde(default)]
    pub requirement_rules: Vec<RuleConfig>,

    #[serde(default)]
    pub property_rules: Vec<RuleConfig>,
}

/// One declarative `(pattern, captured-id-group)` extraction rule
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,

    #[serde(default = "default_id_group")]
    pub id_group: String,

    /// Group holding the item text; the whole match is used when absent
    #[serde(default)]
    pub text_group: Option<String>,

    /// Group holding a comma-separated list of validated requirement ids
    #[serde(default)]
    pub validates_group: Option<String>,
}

fn default_id_group() -> String {
    "id".to_string()
}

/// Thresholds for recommendations and health aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Coverage percent below which a generic recommendation is issued
    #[serde(default = "default_coverage_target")]
    pub coverage_target_percent: f64,

    /// Fewer discovered test files than this triggers an organizational recommendation
    #[serde(default = "default_min_test_files")]
    pub min_test_files: usize,

    /// Quality metric value below which a recommendation is issued
    #[serde(default = "default_quality_target")]
    pub quality_target: f64,

    /// Fraction of unhealthy components that makes the suite unhealthy
    #[serde(default = "default_half")]
    pub unhealthy_fraction: f64,

    /// Fraction of degraded components that makes the suite degraded
    #[serde(default = "default_half")]
    pub degraded_fraction: f64,

    /// Major issue count that makes the suite degraded
    #[serde(default = "default_major_issue_limit")]
    pub major_issue_limit: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            coverage_target_percent: default_coverage_target(),
            min_test_files: default_min_test_files(),
            quality_target: default_quality_target(),
            unhealthy_fraction: default_half(),
            degraded_fraction: default_half(),
            major_issue_limit: default_major_issue_limit(),
        }
    }
}

fn default_coverage_target() -> f64 {
    80.0
}
fn default_min_test_files() -> usize {
    8
}
fn default_quality_target() -> f64 {
    0.8
}
fn default_half() -> f64 {
    0.5
}
fn default_major_issue_limit() -> usize {
    2
}

/// Health probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Deadline for the whole probe phase
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Run the cluster-backed probes (connectivity, resources)
    #[serde(default = "default_true")]
    pub cluster: bool,

    /// kubectl binary used to reach the cluster
    #[serde(default = "default_kubectl")]
    pub kubectl: String,

    /// kubeconfig context; the current context when unset
    #[serde(default)]
    pub context: Option<String>,

    /// Namespaces that must exist
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,

    /// Namespaces whose absence only degrades the resource probe
    #[serde(default)]
    pub optional_namespaces: Vec<String>,

    /// CustomResourceDefinitions that must be installed
    #[serde(default)]
    pub crds: Vec<String>,

    /// Scaffolding paths, relative to the test root, that should exist
    #[serde(default = "default_required_files")]
    pub required_files: Vec<String>,

    /// Helper categories checked by the helper probe
    #[serde(default = "default_helpers")]
    pub helpers: Vec<HelperCategory>,

    /// Caller-supplied regex checks against scaffolding files
    #[serde(default)]
    pub content_checks: Vec<ContentCheck>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cluster: true,
            kubectl: default_kubectl(),
            context: None,
            namespaces: default_namespaces(),
            optional_namespaces: Vec::new(),
            crds: Vec::new(),
            required_files: default_required_files(),
            helpers: default_helpers(),
            content_checks: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_kubectl() -> String {
    "kubectl".to_string()
}
fn default_namespaces() -> Vec<String> {
    vec!["kube-system".to_string()]
}
fn default_required_files() -> Vec<String> {
    vec![
        "e2e_suite_test.go".to_string(),
        "helpers".to_string(),
        "fixtures".to_string(),
    ]
}

/// A helper category and how to recognize that it can be constructed
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HelperCategory {
    pub name: String,
    /// Source file relative to the test root
    pub file: String,
    /// Constructor function name expected in `file`
    pub constructor: String,
}

impl HelperCategory {
    fn new(name: &str, file: &str, constructor: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            constructor: constructor.to_string(),
        }
    }
}

fn default_helpers() -> Vec<HelperCategory> {
    vec![
        HelperCategory::new("policy", "helpers/policy_helpers.go", "NewPolicyHelper"),
        HelperCategory::new("workload", "helpers/workload_helpers.go", "NewWorkloadHelper"),
        HelperCategory::new(
            "validation",
            "helpers/validation_helpers.go",
            "NewValidationHelper",
        ),
        HelperCategory::new("cleanup", "helpers/cleanup_helpers.go", "NewCleanupHelper"),
    ]
}

/// A regex that must match somewhere in a scaffolding file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentCheck {
    /// File relative to the test root
    pub path: String,
    pub pattern: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProjectConfig {
    /// Reject values that would make the thresholds meaningless
    pub fn validate(&self) -> AnalysisResult<()> {
        let t = &self.thresholds;
        if !(0.0..=100.0).contains(&t.coverage_target_percent) {
            return Err(AnalysisError::Config(format!(
                "coverage_target_percent must be within 0..=100, got {}",
                t.coverage_target_percent
            )));
        }
        if !(0.0..=1.0).contains(&t.quality_target) {
            return Err(AnalysisError::Config(format!(
                "quality_target must be within 0..=1, got {}",
                t.quality_target
            )));
        }
        for (name, value) in [
            ("unhealthy_fraction", t.unhealthy_fraction),
            ("degraded_fraction", t.degraded_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(AnalysisError::Config(format!(
                    "{} must be within (0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.index.test_file_suffix.is_empty() {
            return Err(AnalysisError::Config(
                "index.test_file_suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve input paths that are relative against `base`
    pub fn resolve_inputs(&mut self, base: &Path) {
        for path in [
            &mut self.inputs.requirements,
            &mut self.inputs.design,
            &mut self.inputs.tests,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Load project configuration from `dir`.
///
/// Searches for `suitecheck.toml`, then `.suitecheckrc.json`.
/// Returns default configuration if no config file is found or it cannot be parsed.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from an explicit TOML or JSON file
pub fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let config: ProjectConfig = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

/// Example configuration written by `suitecheck init`
pub const EXAMPLE_CONFIG: &str = r#"# suitecheck configuration

[inputs]
requirements = "docs/requirements.md"
design = "docs/design.md"
tests = "test/e2e"

[index]
test_file_suffix = "_test.go"
test_function_prefix = "Test"

[thresholds]
coverage_target_percent = 80.0
min_test_files = 8
quality_target = 0.8
# unhealthy_fraction = 0.5
# degraded_fraction = 0.5
# major_issue_limit = 2

[probes]
timeout_secs = 30
cluster = true
# context = "kind-e2e"
namespaces = ["kube-system"]
# optional_namespaces = ["monitoring"]
# crds = ["optimizationpolicies.example.io"]
required_files = ["e2e_suite_test.go", "helpers", "fixtures"]

# [[probes.helpers]]
# name = "policy"
# file = "helpers/policy_helpers.go"
# constructor = "NewPolicyHelper"

# [[probes.content_checks]]
# path = "e2e_suite_test.go"
# pattern = "RunSpecs\\("
# description = "suite entry point registers Ginkgo specs"
"#;

#[cfg(test)]
mod tests;
