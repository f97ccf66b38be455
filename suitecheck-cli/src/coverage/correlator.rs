//! Requirement and property correlation against the test artifact index
//!
//! Two evidence policies are applied on purpose:
//!
//! - [`EvidencePolicy::AllMatches`] for requirements: any test file whose raw
//!   text mentions `requirement ... <id>` (or `req ... <id>`) is evidence, and
//!   every such file is recorded.
//! - [`EvidencePolicy::FirstNonStubWitness`] for properties: the first test
//!   file mentioning `property <id>` whose enclosing test function is not a
//!   stub wins, and scanning stops there.

use rayon::prelude::*;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::index::{FunctionSpan, SourceSymbolIndex, TestArtifactIndex};
use crate::models::{CoverageKind, CoverageRecord, Evidence, Property, Requirement};

/// How evidence is collected for one kind of document item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidencePolicy {
    /// Whole-file search; every matching file is evidence
    AllMatches,
    /// Function-level search; first non-stub match wins
    FirstNonStubWitness,
}

impl EvidencePolicy {
    pub fn for_kind(kind: CoverageKind) -> Self {
        match kind {
            CoverageKind::Requirement => EvidencePolicy::AllMatches,
            CoverageKind::Property => EvidencePolicy::FirstNonStubWitness,
        }
    }
}

static STUB_MARKER: OnceLock<Regex> = OnceLock::new();

/// Markers that identify a test function as not actually implemented
fn stub_marker() -> &'static Regex {
    STUB_MARKER.get_or_init(|| {
        Regex::new(r"(?i)(not implemented|todo|placeholder|not.*yet)").expect("valid regex")
    })
}

/// `(requirement|req).*?<id>`, case-insensitive, id matched literally
pub fn requirement_pattern(id: &str) -> AnalysisResult<Regex> {
    let pattern = format!(r"(?i)(requirement|req).*?{}", regex::escape(id));
    Regex::new(&pattern).map_err(|e| AnalysisError::invalid_pattern(pattern, e))
}

/// `property\s+<id>\b`, case-insensitive; `1` never matches `10` or `11`
pub fn property_pattern(id: &str) -> AnalysisResult<Regex> {
    let pattern = format!(r"(?i)property\s+{}\b", regex::escape(id));
    Regex::new(&pattern).map_err(|e| AnalysisError::invalid_pattern(pattern, e))
}

/// Whether a test function body carries a stub marker
pub fn is_stub(function_text: &str) -> bool {
    stub_marker().is_match(function_text)
}

/// Matches document items against the test sources of one index
pub struct Correlator<'a> {
    index: &'a TestArtifactIndex,
}

impl<'a> Correlator<'a> {
    pub fn new(index: &'a TestArtifactIndex) -> Self {
        Self { index }
    }

    /// Correlate all items in parallel; output order follows input order
    pub fn correlate(
        &self,
        requirements: &[Requirement],
        properties: &[Property],
    ) -> (Vec<CoverageRecord>, Vec<CoverageRecord>) {
        let reqs = requirements
            .par_iter()
            .map(|r| self.correlate_requirement(r))
            .collect();
        let props = properties
            .par_iter()
            .map(|p| self.correlate_property(p))
            .collect();
        (reqs, props)
    }

    pub fn correlate_requirement(&self, requirement: &Requirement) -> CoverageRecord {
        let evidence = self.evidence(CoverageKind::Requirement, &requirement.id);
        debug!(
            "Requirement {}: {} evidence file(s)",
            requirement.id,
            evidence.len()
        );
        CoverageRecord {
            kind: CoverageKind::Requirement,
            id: requirement.id.clone(),
            text: requirement.text.clone(),
            covered: !evidence.is_empty(),
            evidence,
            validates: Vec::new(),
        }
    }

    pub fn correlate_property(&self, property: &Property) -> CoverageRecord {
        let evidence = self.evidence(CoverageKind::Property, &property.id);
        CoverageRecord {
            kind: CoverageKind::Property,
            id: property.id.clone(),
            text: property.text.clone(),
            covered: !evidence.is_empty(),
            evidence,
            validates: property.validates.clone(),
        }
    }

    /// Evidence for one item under the policy of its kind
    fn evidence(&self, kind: CoverageKind, id: &str) -> Vec<Evidence> {
        // No id, nothing to correlate against
        if id.is_empty() {
            return Vec::new();
        }

        let pattern = match kind {
            CoverageKind::Requirement => requirement_pattern(id),
            CoverageKind::Property => property_pattern(id),
        };
        let pattern = match pattern {
            Ok(p) => p,
            Err(e) => {
                warn!("{} {}: {}", kind, id, e);
                return Vec::new();
            }
        };

        match EvidencePolicy::for_kind(kind) {
            EvidencePolicy::AllMatches => self
                .index
                .files()
                .iter()
                .filter(|file| {
                    self.index
                        .source(file)
                        .is_some_and(|source| pattern.is_match(&source))
                })
                .map(|file| Evidence::file(self.index.display_path(file)))
                .collect(),
            EvidencePolicy::FirstNonStubWitness => self
                .index
                .files()
                .iter()
                .find_map(|file| self.witness(&pattern, file, id))
                .into_iter()
                .collect(),
        }
    }

    /// Witness from one file, or `None` if it has no usable match
    fn witness(&self, pattern: &Regex, file: &Path, id: &str) -> Option<Evidence> {
        let source = self.index.source(file)?;
        let offsets: Vec<usize> = pattern.find_iter(&source).map(|m| m.start()).collect();
        if offsets.is_empty() {
            return None;
        }

        let rel = self.index.display_path(file);
        let Some(spans) = self.index.function_spans(file) else {
            // Unparseable: the mention alone is the evidence
            return Some(Evidence::file(rel));
        };

        match enclosing_function(&spans, &offsets) {
            Some(span) if is_stub(span.text(&source)) => {
                debug!(
                    "Property {}: {} in {} is a stub, continuing",
                    id,
                    span.name,
                    rel.display()
                );
                None
            }
            Some(span) => Some(Evidence::function(rel, span.name.clone())),
            None => Some(Evidence::file(rel)),
        }
    }
}

/// Smallest test function enclosing the earliest match that lies inside any function
fn enclosing_function<'s>(spans: &'s [FunctionSpan], offsets: &[usize]) -> Option<&'s FunctionSpan> {
    offsets.iter().find_map(|&offset| {
        spans
            .iter()
            .filter(|s| s.contains(offset))
            .min_by_key(|s| s.len())
    })
}
