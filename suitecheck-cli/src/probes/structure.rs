//! Test structure probe
//!
//! Checks the scaffolding around the test files: required helper and fixture
//! paths, the test-file naming convention, and caller-supplied content
//! checks. Missing scaffolding does not stop tests from running, so the worst
//! verdict here is `Degraded`.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use super::{HealthProbe, ProbeContext, ProbeOutcome};
use crate::error::{AnalysisError, AnalysisResult};
use crate::index::walk_files;
use crate::models::{HealthCheckResult, HealthStatus, Severity, ValidationIssue};

fn test_func_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^func\s+Test[A-Z_]").expect("valid regex"))
}

/// Whether `pattern` matches anywhere in `text`.
///
/// A malformed pattern is reported as [`AnalysisError::InvalidPattern`].
pub fn content_check(pattern: &str, text: &str) -> AnalysisResult<bool> {
    let re = Regex::new(pattern).map_err(|e| AnalysisError::invalid_pattern(pattern, e))?;
    Ok(re.is_match(text))
}

pub struct StructureProbe;

impl StructureProbe {
    fn required_paths(&self, ctx: &ProbeContext, issues: &mut Vec<ValidationIssue>) {
        for entry in &ctx.probes.required_files {
            if !ctx.test_root().join(entry).exists() {
                issues.push(ValidationIssue::new(
                    Severity::Minor,
                    self.name(),
                    format!("Missing scaffolding: {}", entry),
                    "Shared setup is duplicated or absent across tests",
                    format!("Create {} under the test root", entry),
                ));
            }
        }
    }

    /// Go sources declaring `func TestX` must carry the test-file suffix
    fn naming_convention(&self, ctx: &ProbeContext, issues: &mut Vec<ValidationIssue>) {
        let suffix = &ctx.index_config.test_file_suffix;
        for path in walk_files(ctx.test_root()) {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.ends_with(".go") || file_name.ends_with(suffix.as_str()) {
                continue;
            }
            let Ok(text) = std::fs::read_to_string(&path) else {
                continue;
            };
            if test_func_pattern().is_match(&text) {
                let rel = ctx.index.display_path(&path);
                issues.push(ValidationIssue::new(
                    Severity::Minor,
                    self.name(),
                    format!("{} declares test functions but is not named *{}", rel.display(), suffix),
                    "The Go toolchain will not run these tests",
                    format!("Rename {} to end in {}", rel.display(), suffix),
                ));
            }
        }
    }

    fn content_checks(&self, ctx: &ProbeContext, issues: &mut Vec<ValidationIssue>) {
        for check in &ctx.probes.content_checks {
            let label = check.description.as_deref().unwrap_or(check.pattern.as_str());
            let path = ctx.test_root().join(&check.path);
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(_) => {
                    issues.push(ValidationIssue::new(
                        Severity::Minor,
                        self.name(),
                        format!("Content check target missing: {}", check.path),
                        format!("Cannot verify: {}", label),
                        format!("Create {} under the test root", check.path),
                    ));
                    continue;
                }
            };

            match content_check(&check.pattern, &text) {
                Ok(true) => {}
                Ok(false) => issues.push(ValidationIssue::new(
                    Severity::Minor,
                    self.name(),
                    format!("{} does not contain: {}", check.path, label),
                    "Expected scaffolding is absent",
                    format!("Add code matching /{}/ to {}", check.pattern, check.path),
                )),
                Err(e) => {
                    warn!("Skipping content check on {}: {}", check.path, e);
                    issues.push(ValidationIssue::new(
                        Severity::Minor,
                        self.name(),
                        e.to_string(),
                        "This content check could not run",
                        "Fix the pattern in probes.content_checks",
                    ));
                }
            }
        }
    }
}

impl HealthProbe for StructureProbe {
    fn name(&self) -> &'static str {
        "test_structure"
    }

    fn description(&self) -> &'static str {
        "Checks helper/fixture scaffolding and test file naming"
    }

    fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let mut issues = Vec::new();
        self.required_paths(ctx, &mut issues);
        self.naming_convention(ctx, &mut issues);
        self.content_checks(ctx, &mut issues);

        let status = if issues.is_empty() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        let detail = format!("{} test files, {} structure issues", ctx.index.len(), issues.len());
        ProbeOutcome::single(HealthCheckResult::new(self.name(), status).with_detail(detail), issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentCheck;
    use crate::probes::testing::{context, write};

    fn scaffold(root: &std::path::Path) {
        write(root, "e2e_suite_test.go", "package e2e\n\nfunc TestE2E(t *testing.T) {\n\tRunSpecs(t, \"e2e\")\n}\n");
        write(root, "helpers/policy_helpers.go", "package helpers\n");
        write(root, "fixtures/policy.yaml", "kind: Policy\n");
    }

    #[test]
    fn test_content_check_reports_invalid_pattern() {
        assert!(content_check(r"RunSpecs\(", "RunSpecs(t)").unwrap());
        assert!(!content_check(r"RunSpecs\(", "nothing").unwrap());
        let err = content_check("([unclosed", "text").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPattern { .. }));
    }

    #[test]
    fn test_complete_scaffolding_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let ctx = context(dir.path(), None);
        let outcome = StructureProbe.check(&ctx);
        assert_eq!(outcome.results[0].status, HealthStatus::Healthy, "{:?}", outcome.issues);
    }

    #[test]
    fn test_missing_scaffolding_degrades_not_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "policy_test.go", "package e2e\n");
        let ctx = context(dir.path(), None);
        let outcome = StructureProbe.check(&ctx);
        assert_eq!(outcome.results[0].status, HealthStatus::Degraded);
        assert_eq!(outcome.issues.len(), 3);
        assert!(outcome.issues.iter().all(|i| i.severity == Severity::Minor));
    }

    #[test]
    fn test_misnamed_test_file_flagged() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(dir.path(), "workload.go", "package e2e\n\nfunc TestWorkload(t *testing.T) {}\n");
        let ctx = context(dir.path(), None);
        let outcome = StructureProbe.check(&ctx);
        assert_eq!(outcome.issues.len(), 1);
        assert!(outcome.issues[0].description.contains("workload.go"));
    }

    #[test]
    fn test_invalid_content_pattern_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let mut ctx = context(dir.path(), None);
        ctx.probes.content_checks = vec![
            ContentCheck {
                path: "e2e_suite_test.go".into(),
                pattern: "([unclosed".into(),
                description: None,
            },
            ContentCheck {
                path: "e2e_suite_test.go".into(),
                pattern: r"RunSpecs\(".into(),
                description: Some("suite registers specs".into()),
            },
            ContentCheck {
                path: "e2e_suite_test.go".into(),
                pattern: r"BeforeSuite\(".into(),
                description: Some("suite setup".into()),
            },
        ];
        let outcome = StructureProbe.check(&ctx);
        assert_eq!(outcome.results[0].status, HealthStatus::Degraded);
        assert_eq!(outcome.issues.len(), 2);
        assert!(outcome.issues[0].description.contains("Invalid pattern"));
        assert!(outcome.issues[1].description.contains("suite setup"));
    }
}
