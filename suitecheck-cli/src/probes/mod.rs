//! Component health probes
//!
//! Each probe inspects one component of the e2e harness and reports one or
//! more [`HealthCheckResult`]s plus the [`ValidationIssue`]s it found.
//! Probes are independent of each other, so the [`ProbeRunner`] fans them
//! out on separate threads and merges the outcomes once all have finished
//! or the deadline has passed.
//!
//! # Adding a probe
//!
//! ```ignore
//! pub struct MyProbe;
//!
//! impl HealthProbe for MyProbe {
//!     fn name(&self) -> &'static str { "my_component" }
//!     fn description(&self) -> &'static str { "Checks my component" }
//!     fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
//!         ProbeOutcome::single(HealthCheckResult::new(self.name(), HealthStatus::Healthy), vec![])
//!     }
//! }
//! ```
//!
//! Then add it to [`default_probes`].

mod connectivity;
mod helpers;
mod quality;
mod resources;
mod runner;
mod structure;

pub use connectivity::ConnectivityProbe;
pub use helpers::HelperProbe;
pub use quality::{compute_metrics, QualityProbe};
pub use resources::ResourceProbe;
pub use runner::{CancelToken, ProbeReport, ProbeRunner};
pub use structure::{content_check, StructureProbe};

use std::path::Path;
use std::sync::Arc;

use crate::cluster::ClusterClient;
use crate::config::{IndexConfig, ProbeConfig, Thresholds};
use crate::index::TestArtifactIndex;
use crate::models::{HealthCheckResult, QualityMetrics, ValidationIssue};

/// Read-only inputs shared by every probe in one run
pub struct ProbeContext {
    pub index: Arc<TestArtifactIndex>,
    pub index_config: IndexConfig,
    pub probes: ProbeConfig,
    pub thresholds: Thresholds,
    pub cluster: Option<Arc<dyn ClusterClient>>,
    /// Fired when the run is abandoned; long probes stop at the next step
    pub cancel: CancelToken,
}

impl ProbeContext {
    pub fn test_root(&self) -> &Path {
        self.index.root()
    }
}

/// What one probe observed
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    pub results: Vec<HealthCheckResult>,
    pub issues: Vec<ValidationIssue>,
    /// Only the quality probe fills this in
    pub metrics: Option<QualityMetrics>,
}

impl ProbeOutcome {
    pub fn single(result: HealthCheckResult, issues: Vec<ValidationIssue>) -> Self {
        Self {
            results: vec![result],
            issues,
            metrics: None,
        }
    }
}

/// A health check over one component of the test harness
pub trait HealthProbe: Send + Sync {
    /// Component key used in `component_health`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Probes that talk to the live cluster are skipped in offline mode
    fn requires_cluster(&self) -> bool {
        false
    }

    /// Inspect the component. Must not panic on missing inputs; report them instead.
    fn check(&self, ctx: &ProbeContext) -> ProbeOutcome;
}

/// The canonical probes, in registration order
pub fn default_probes(include_cluster: bool) -> Vec<Arc<dyn HealthProbe>> {
    let all: Vec<Arc<dyn HealthProbe>> = vec![
        Arc::new(ConnectivityProbe),
        Arc::new(ResourceProbe),
        Arc::new(StructureProbe),
        Arc::new(HelperProbe),
        Arc::new(QualityProbe),
    ];
    all.into_iter()
        .filter(|p| include_cluster || !p.requires_cluster())
        .collect()
}
