//! Cluster connectivity probe

use tracing::debug;

use super::{HealthProbe, ProbeContext, ProbeOutcome};
use crate::models::{HealthCheckResult, HealthStatus, Severity, ValidationIssue};

/// Performs one cheap authenticated read against the control plane
pub struct ConnectivityProbe;

impl HealthProbe for ConnectivityProbe {
    fn name(&self) -> &'static str {
        "cluster_connectivity"
    }

    fn description(&self) -> &'static str {
        "Checks that the Kubernetes API server answers"
    }

    fn requires_cluster(&self) -> bool {
        true
    }

    fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let Some(cluster) = ctx.cluster.as_deref() else {
            return unreachable(self.name(), "no cluster client configured".to_string());
        };

        match cluster.server_version() {
            Ok(version) => {
                debug!("Cluster reachable, server {}", version);
                ProbeOutcome::single(
                    HealthCheckResult::new(self.name(), HealthStatus::Healthy)
                        .with_detail(format!("server {}", version)),
                    vec![],
                )
            }
            Err(e) => unreachable(self.name(), e.to_string()),
        }
    }
}

fn unreachable(name: &str, reason: String) -> ProbeOutcome {
    ProbeOutcome::single(
        HealthCheckResult::new(name, HealthStatus::Unhealthy).with_detail(reason.clone()),
        vec![ValidationIssue::new(
            Severity::Critical,
            name,
            format!("Cluster API unreachable: {}", reason),
            "No e2e test can run against the cluster",
            "Verify the kubeconfig context and that the control plane is up",
        )],
    )
}
