//! Resource availability probe
//!
//! Required namespaces and CRDs make the component `Unhealthy` when absent;
//! optional namespaces only degrade it.

use super::{HealthProbe, ProbeContext, ProbeOutcome};
use crate::cluster::{ClusterClient, ClusterError};
use crate::models::{HealthCheckResult, HealthStatus, Severity, ValidationIssue};
use tracing::debug;

pub struct ResourceProbe;

#[derive(Clone, Copy)]
enum Kind {
    Namespace,
    Crd,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Namespace => "namespace",
            Kind::Crd => "CRD",
        }
    }

    fn exists(self, cluster: &dyn ClusterClient, name: &str) -> Result<bool, ClusterError> {
        match self {
            Kind::Namespace => cluster.namespace_exists(name),
            Kind::Crd => cluster.crd_exists(name),
        }
    }
}

impl HealthProbe for ResourceProbe {
    fn name(&self) -> &'static str {
        "resource_availability"
    }

    fn description(&self) -> &'static str {
        "Checks that expected namespaces and CRDs exist"
    }

    fn requires_cluster(&self) -> bool {
        true
    }

    fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let name = self.name();
        let Some(cluster) = ctx.cluster.as_deref() else {
            return ProbeOutcome::single(
                HealthCheckResult::new(name, HealthStatus::Unhealthy)
                    .with_detail("no cluster client configured"),
                vec![ValidationIssue::new(
                    Severity::Major,
                    name,
                    "Cannot check cluster resources without a cluster client",
                    "Namespaces and CRDs are unverified",
                    "Run without --offline and with a reachable cluster",
                )],
            );
        };

        let required = ctx
            .probes
            .namespaces
            .iter()
            .map(|n| (Kind::Namespace, n, true))
            .chain(ctx.probes.crds.iter().map(|c| (Kind::Crd, c, true)))
            .chain(
                ctx.probes
                    .optional_namespaces
                    .iter()
                    .map(|n| (Kind::Namespace, n, false)),
            );

        let mut status = HealthStatus::Healthy;
        let mut issues = Vec::new();
        let mut checked = 0usize;

        for (kind, resource, mandatory) in required {
            if ctx.cancel.is_cancelled() {
                debug!("Resource lookups cancelled after {} checks", checked);
                break;
            }
            checked += 1;
            let problem = match kind.exists(cluster, resource) {
                Ok(true) => continue,
                Ok(false) => format!("{} '{}' not found", kind.label(), resource),
                Err(e) => format!("could not check {} '{}': {}", kind.label(), resource, e),
            };

            if mandatory {
                status = status.max(HealthStatus::Unhealthy);
                issues.push(ValidationIssue::new(
                    Severity::Major,
                    name,
                    format!("Required {}", problem),
                    "Tests depending on it will fail at setup",
                    format!("Install the {} '{}' before running the suite", kind.label(), resource),
                ));
            } else {
                status = status.max(HealthStatus::Degraded);
                issues.push(ValidationIssue::new(
                    Severity::Minor,
                    name,
                    format!("Optional {}", problem),
                    "Tests depending on it will be skipped",
                    format!("Create the {} '{}' for full coverage", kind.label(), resource),
                ));
            }
        }

        let detail = format!("{} resources checked, {} missing", checked, issues.len());
        ProbeOutcome::single(
            HealthCheckResult::new(name, status).with_detail(detail),
            issues,
        )
    }
}
