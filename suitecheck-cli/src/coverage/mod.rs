//! Requirement/property coverage
//!
//! - `correlator` matches mined items against the test artifact index
//! - `aggregate` computes the percentage, missing list and recommendations

mod aggregate;
mod correlator;

pub use aggregate::{coverage_percent, coverage_recommendations, summarize, CoverageSummary};
pub use correlator::{
    is_stub, property_pattern, requirement_pattern, Correlator, EvidencePolicy,
};
