//! Helper component probe
//!
//! A helper category counts as instantiable when its source file exists and
//! declares the expected constructor. Each category gets its own
//! `helper:<name>` entry in the component map.

use regex::Regex;

use super::{HealthProbe, ProbeContext, ProbeOutcome};
use crate::config::HelperCategory;
use crate::models::{HealthCheckResult, HealthStatus, Severity, ValidationIssue};

pub struct HelperProbe;

fn constructor_declared(constructor: &str, source: &str) -> bool {
    // Plain functions and methods: `func NewX(` or `func (r *T) NewX(`
    let pattern = format!(
        r"(?m)^func\s+(?:\([^)]*\)\s*)?{}\s*[\[(]",
        regex::escape(constructor)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(source))
}

fn check_category(ctx: &ProbeContext, category: &HelperCategory) -> (HealthCheckResult, Option<ValidationIssue>) {
    let component = format!("helper:{}", category.name);
    let path = ctx.test_root().join(&category.file);

    let Ok(source) = std::fs::read_to_string(&path) else {
        let issue = ValidationIssue::new(
            Severity::Major,
            component.clone(),
            format!("{} helper missing: {} not found", category.name, category.file),
            format!("Tests needing {} helpers cannot be written or run", category.name),
            format!("Add {} with a {} constructor", category.file, category.constructor),
        );
        return (
            HealthCheckResult::new(component, HealthStatus::Unhealthy).with_detail("file missing"),
            Some(issue),
        );
    };

    if constructor_declared(&category.constructor, &source) {
        (
            HealthCheckResult::new(component, HealthStatus::Healthy)
                .with_detail(format!("{} available", category.constructor)),
            None,
        )
    } else {
        let issue = ValidationIssue::new(
            Severity::Minor,
            component.clone(),
            format!("{} does not declare {}", category.file, category.constructor),
            format!("{} helpers cannot be instantiated uniformly", category.name),
            format!("Add func {}(...) to {}", category.constructor, category.file),
        );
        (
            HealthCheckResult::new(component, HealthStatus::Degraded)
                .with_detail("constructor missing"),
            Some(issue),
        )
    }
}

impl HealthProbe for HelperProbe {
    fn name(&self) -> &'static str {
        "helpers"
    }

    fn description(&self) -> &'static str {
        "Checks that each helper category can be instantiated"
    }

    fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::default();
        for category in &ctx.probes.helpers {
            let (result, issue) = check_category(ctx, category);
            outcome.results.push(result);
            outcome.issues.extend(issue);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::{context, write};

    #[test]
    fn test_constructor_detection() {
        assert!(constructor_declared(
            "NewPolicyHelper",
            "package helpers\n\nfunc NewPolicyHelper(c client.Client) *PolicyHelper {\n"
        ));
        assert!(constructor_declared(
            "NewPolicyHelper",
            "func (f *Factory) NewPolicyHelper() *PolicyHelper {}\n"
        ));
        assert!(!constructor_declared(
            "NewPolicyHelper",
            "// NewPolicyHelper is coming soon\nfunc NewPolicyHelperV2() {}\n"
        ));
    }

    #[test]
    fn test_one_entry_per_category() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "helpers/policy_helpers.go",
            "package helpers\n\nfunc NewPolicyHelper() *PolicyHelper { return nil }\n",
        );
        write(dir.path(), "helpers/workload_helpers.go", "package helpers\n");
        let ctx = context(dir.path(), None);

        let outcome = HelperProbe.check(&ctx);
        let entries: Vec<_> = outcome
            .results
            .iter()
            .map(|r| (r.component.as_str(), r.status))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("helper:policy", HealthStatus::Healthy),
                ("helper:workload", HealthStatus::Degraded),
                ("helper:validation", HealthStatus::Unhealthy),
                ("helper:cleanup", HealthStatus::Unhealthy),
            ]
        );
        assert_eq!(outcome.issues.len(), 3);
        assert_eq!(outcome.issues[0].severity, Severity::Minor);
        assert_eq!(outcome.issues[1].severity, Severity::Major);
    }

    #[test]
    fn test_no_categories_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), None);
        ctx.probes.helpers.clear();
        let outcome = HelperProbe.check(&ctx);
        assert!(outcome.results.is_empty());
        assert!(outcome.issues.is_empty());
    }
}
