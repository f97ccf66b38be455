//! Configuration module for suitecheck
//!
//! This module handles:
//! - Project-level configuration (suitecheck.toml)
//! - Input locations and test naming conventions
//! - Recommendation and health-aggregation thresholds
//! - Probe settings

mod project_config;

pub use project_config::{
    load_config_file,
    load_project_config,
    ContentCheck,
    HelperCategory,
    IndexConfig,
    InputsConfig,
    MinerConfig,
    ProbeConfig,
    ProjectConfig,
    RuleConfig,
    Thresholds,
    CONFIG_FILE_NAMES,
    EXAMPLE_CONFIG,
};
