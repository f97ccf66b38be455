//! suitecheck - coverage and health diagnostics for Kubernetes e2e test suites
//!
//! Mines requirements and correctness properties from design documents,
//! correlates them with a Go test tree, and probes the health of the test
//! harness. [`analysis::Analyzer`] runs the whole pipeline once per call.

pub mod analysis;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod coverage;
pub mod error;
pub mod health;
pub mod index;
pub mod miner;
pub mod models;
pub mod probes;
pub mod reporters;
