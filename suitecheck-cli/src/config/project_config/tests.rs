use super::*;

#[test]
fn test_default_config() {
    let config = ProjectConfig::default();

    assert_eq!(config.index.test_file_suffix, "_test.go");
    assert_eq!(config.index.test_function_prefix, "Test");
    assert_eq!(config.thresholds.coverage_target_percent, 80.0);
    assert_eq!(config.thresholds.min_test_files, 8);
    assert_eq!(config.thresholds.major_issue_limit, 2);
    assert_eq!(config.probes.helpers.len(), 4);
    assert!(config.probes.cluster);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_toml_config() {
    let toml_content = r#"
[inputs]
tests = "e2e"

[index]
test_file_suffix = "_spec.go"

[thresholds]
min_test_files = 3

[probes]
cluster = false
crds = ["optimizationpolicies.example.io"]

[[probes.content_checks]]
path = "e2e_suite_test.go"
pattern = "RunSpecs"
"#;

    let config: ProjectConfig = toml::from_str(toml_content).unwrap();

    assert_eq!(config.inputs.tests, PathBuf::from("e2e"));
    // Unset fields keep their defaults
    assert_eq!(config.inputs.design, PathBuf::from("docs/design.md"));
    assert_eq!(config.index.test_file_suffix, "_spec.go");
    assert_eq!(config.index.test_function_prefix, "Test");
    assert_eq!(config.thresholds.min_test_files, 3);
    assert_eq!(config.thresholds.coverage_target_percent, 80.0);
    assert!(!config.probes.cluster);
    assert_eq!(config.probes.crds, vec!["optimizationpolicies.example.io"]);
    assert_eq!(config.probes.content_checks.len(), 1);
    assert_eq!(config.probes.content_checks[0].pattern, "RunSpecs");
}

#[test]
fn test_parse_rule_overrides() {
    let toml_content = r#"
[[miner.requirement_rules]]
pattern = '(?m)^REQ-(?P<id>\d+): (?P<text>.+)$'
text_group = "text"
"#;

    let config: ProjectConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.miner.requirement_rules.len(), 1);
    let rule = &config.miner.requirement_rules[0];
    assert_eq!(rule.id_group, "id");
    assert_eq!(rule.text_group.as_deref(), Some("text"));
    assert!(config.miner.property_rules.is_empty());
}

#[test]
fn test_example_config_parses() {
    let config: ProjectConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.probes.required_files.len(), 3);
}

#[test]
fn test_validate_rejects_bad_fractions() {
    let mut config = ProjectConfig::default();
    config.thresholds.unhealthy_fraction = 0.0;
    assert!(config.validate().is_err());

    let mut config = ProjectConfig::default();
    config.thresholds.quality_target = 1.5;
    assert!(config.validate().is_err());

    let mut config = ProjectConfig::default();
    config.index.test_file_suffix.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_project_config_missing_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_project_config(dir.path());
    assert_eq!(config.thresholds.min_test_files, 8);
}

#[test]
fn test_load_project_config_malformed_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("suitecheck.toml"), "[thresholds\nbroken").unwrap();
    let config = load_project_config(dir.path());
    assert_eq!(config.thresholds.min_test_files, 8);
}

#[test]
fn test_load_json_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".suitecheckrc.json"),
        r#"{"thresholds": {"min_test_files": 2}}"#,
    )
    .unwrap();
    let config = load_project_config(dir.path());
    assert_eq!(config.thresholds.min_test_files, 2);
}

#[test]
fn test_resolve_inputs() {
    let mut config = ProjectConfig::default();
    config.inputs.design = PathBuf::from("/abs/design.md");
    config.resolve_inputs(Path::new("/repo"));
    assert_eq!(
        config.inputs.requirements,
        PathBuf::from("/repo/docs/requirements.md")
    );
    assert_eq!(config.inputs.design, PathBuf::from("/abs/design.md"));
    assert_eq!(config.inputs.tests, PathBuf::from("/repo/test/e2e"));
}
