//! One analysis run
//!
//! [`Analyzer`] owns the configuration and external capabilities for a
//! single run and drives the phases in order:
//!
//! 1. mine requirements and properties (an unreadable document is fatal)
//! 2. index the test tree
//! 3. correlate and aggregate coverage
//! 4. run the health probes
//! 5. aggregate health and assemble the [`Report`]
//!
//! Cancellation is checked between phases and inside the probe runner.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cluster::ClusterClient;
use crate::config::ProjectConfig;
use crate::coverage::{self, Correlator, CoverageSummary};
use crate::error::AnalysisResult;
use crate::health;
use crate::index::TestArtifactIndex;
use crate::miner::DocumentMiner;
use crate::models::{HealthSnapshot, Recommendation, Report};
use crate::probes::{default_probes, CancelToken, ProbeContext, ProbeRunner};

pub struct Analyzer {
    config: ProjectConfig,
    cluster: Option<Arc<dyn ClusterClient>>,
    cancel: CancelToken,
}

impl Analyzer {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            cluster: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cluster(mut self, cluster: Arc<dyn ClusterClient>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Full run: coverage plus health
    pub fn run(&self) -> AnalysisResult<Report> {
        let (coverage, index) = self.coverage_phase()?;
        let health = self.health_phase(index, &coverage.recommendations)?;
        info!(
            "Analysis complete: {:.1}% coverage, overall {}",
            coverage.coverage_percent, health.overall_health
        );
        Ok(Report {
            timestamp: Utc::now(),
            health,
            coverage,
        })
    }

    /// Coverage only; no probes are run
    pub fn coverage(&self) -> AnalysisResult<CoverageSummary> {
        self.coverage_phase().map(|(summary, _)| summary)
    }

    /// Health only; documents are not read
    pub fn health(&self) -> AnalysisResult<HealthSnapshot> {
        self.config.validate()?;
        let index = self.index_phase()?;
        self.health_phase(index, &[])
    }

    fn index_phase(&self) -> AnalysisResult<Arc<TestArtifactIndex>> {
        self.cancel.check()?;
        let index = TestArtifactIndex::scan(&self.config.inputs.tests, &self.config.index)?;
        Ok(Arc::new(index))
    }

    fn coverage_phase(&self) -> AnalysisResult<(CoverageSummary, Arc<TestArtifactIndex>)> {
        self.config.validate()?;
        self.cancel.check()?;

        let miner = DocumentMiner::from_config(&self.config.miner)?;
        let docs = miner.mine_documents(&self.config.inputs.requirements, &self.config.inputs.design)?;

        let index = self.index_phase()?;
        let (requirements, properties) =
            Correlator::new(&index).correlate(&docs.requirements, &docs.properties);
        self.cancel.check()?;

        let test_files = index
            .files()
            .iter()
            .map(|p| index.display_path(p).to_path_buf())
            .collect();
        let summary = coverage::summarize(requirements, properties, test_files, &self.config.thresholds);
        Ok((summary, index))
    }

    fn health_phase(
        &self,
        index: Arc<TestArtifactIndex>,
        coverage_recommendations: &[Recommendation],
    ) -> AnalysisResult<HealthSnapshot> {
        self.cancel.check()?;

        let probes = &self.config.probes;
        let ctx = Arc::new(ProbeContext {
            index,
            index_config: self.config.index.clone(),
            probes: probes.clone(),
            thresholds: self.config.thresholds.clone(),
            cluster: self.cluster.clone(),
            cancel: self.cancel.clone(),
        });
        let runner = ProbeRunner::new(
            default_probes(probes.cluster),
            Duration::from_secs(probes.timeout_secs),
        )
        .with_cancel(self.cancel.clone());
        info!("Running probes: {}", runner.probe_names().join(", "));

        let report = runner.run(ctx)?;
        Ok(health::snapshot(
            report,
            coverage_recommendations,
            &self.config.thresholds,
        ))
    }
}
