//! Concurrent probe execution with a deadline
//!
//! Every probe runs on its own thread and reports back over a channel.
//! The runner waits until all probes have reported or the deadline passes;
//! a probe still running at the deadline is recorded as `Unhealthy` with a
//! `Critical` timeout issue and its thread is abandoned.

use crossbeam_channel::{unbounded, RecvTimeoutError};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{HealthProbe, ProbeContext, ProbeOutcome};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{HealthCheckResult, HealthStatus, QualityMetrics, Severity, ValidationIssue};

/// Granularity at which the runner notices cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared cancellation flag for one analysis run
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called
    pub fn check(&self) -> AnalysisResult<()> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Merged outcome of all probes
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    /// Per-component verdicts; a component reported twice keeps the worse one
    pub component_health: BTreeMap<String, HealthStatus>,
    /// Every individual result, in probe registration order
    pub results: Vec<HealthCheckResult>,
    pub issues: Vec<ValidationIssue>,
    pub quality_metrics: QualityMetrics,
}

impl ProbeReport {
    fn absorb(&mut self, outcome: ProbeOutcome) {
        for result in outcome.results {
            self.component_health
                .entry(result.component.clone())
                .and_modify(|s| *s = (*s).max(result.status))
                .or_insert(result.status);
            self.results.push(result);
        }
        self.issues.extend(outcome.issues);
        if let Some(metrics) = outcome.metrics {
            self.quality_metrics = metrics.clamped();
        }
    }
}

pub struct ProbeRunner {
    probes: Vec<Arc<dyn HealthProbe>>,
    timeout: Duration,
    cancel: CancelToken,
}

impl ProbeRunner {
    pub fn new(probes: Vec<Arc<dyn HealthProbe>>, timeout: Duration) -> Self {
        Self {
            probes,
            timeout,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Run every probe and wait for all of them, or for the deadline
    pub fn run(&self, ctx: Arc<ProbeContext>) -> AnalysisResult<ProbeReport> {
        self.cancel.check()?;

        let start = Instant::now();
        let deadline = start + self.timeout;
        let (tx, rx) = unbounded::<(usize, ProbeOutcome)>();
        let mut outcomes: Vec<Option<ProbeOutcome>> = vec![None; self.probes.len()];
        let mut pending = 0usize;

        for (i, probe) in self.probes.iter().enumerate() {
            let name = probe.name();
            let probe = Arc::clone(probe);
            let ctx = Arc::clone(&ctx);
            let tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("probe-{}", name))
                .spawn(move || {
                    let outcome = catch_unwind(AssertUnwindSafe(|| probe.check(&ctx)))
                        .unwrap_or_else(|_| {
                            warn!("Probe {} panicked", name);
                            failed_outcome(name, "probe panicked")
                        });
                    // Receiver may be gone after a timeout or cancellation
                    let _ = tx.send((i, outcome));
                });
            match spawned {
                Ok(_) => pending += 1,
                Err(e) => {
                    warn!("Failed to start probe {}: {}", name, e);
                    outcomes[i] = Some(failed_outcome(name, "probe could not be started"));
                }
            }
        }
        drop(tx);

        while pending > 0 {
            self.cancel.check()?;
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait = (deadline - now).min(POLL_INTERVAL);
            match rx.recv_timeout(wait) {
                Ok((i, outcome)) => {
                    debug!("Probe {} finished", self.probes[i].name());
                    outcomes[i] = Some(outcome);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.cancel.check()?;

        let mut report = ProbeReport::default();
        for (probe, outcome) in self.probes.iter().zip(outcomes) {
            let outcome = outcome.unwrap_or_else(|| {
                warn!(
                    "Probe {} did not finish within {}s",
                    probe.name(),
                    self.timeout.as_secs()
                );
                timeout_outcome(probe.name(), self.timeout)
            });
            report.absorb(outcome);
        }

        info!(
            "Ran {} probes in {:?}: {} issues",
            self.probes.len(),
            start.elapsed(),
            report.issues.len()
        );
        Ok(report)
    }
}

fn timeout_outcome(name: &str, timeout: Duration) -> ProbeOutcome {
    ProbeOutcome::single(
        HealthCheckResult::new(name, HealthStatus::Unhealthy)
            .with_detail(format!("timeout after {}s", timeout.as_secs())),
        vec![ValidationIssue::new(
            Severity::Critical,
            name,
            format!("Probe timeout: no result within {}s", timeout.as_secs()),
            "Component health is unknown",
            "Check the component's responsiveness or raise probes.timeout_secs",
        )],
    )
}

fn failed_outcome(name: &str, reason: &str) -> ProbeOutcome {
    ProbeOutcome::single(
        HealthCheckResult::new(name, HealthStatus::Unhealthy).with_detail(reason),
        vec![ValidationIssue::new(
            Severity::Critical,
            name,
            format!("Probe failed: {}", reason),
            "Component health is unknown",
            "Re-run with --log-level debug to see the failure",
        )],
    )
}
