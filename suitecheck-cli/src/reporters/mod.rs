//! Output reporters for suitecheck results
//!
//! Supports multiple output formats:
//! - `text` - Line-oriented terminal output, optionally colored
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use anyhow::{anyhow, Result};
use std::str::FromStr;

use crate::coverage::CoverageSummary;
use crate::models::{HealthSnapshot, Recommendation, Report};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// What a subcommand produced
#[derive(Debug, Clone, Copy)]
pub enum ReportView<'a> {
    Full(&'a Report),
    Coverage(&'a CoverageSummary),
    Health(&'a HealthSnapshot),
}

impl<'a> ReportView<'a> {
    pub fn coverage(&self) -> Option<&'a CoverageSummary> {
        match self {
            ReportView::Full(r) => Some(&r.coverage),
            ReportView::Coverage(c) => Some(c),
            ReportView::Health(_) => None,
        }
    }

    pub fn health(&self) -> Option<&'a HealthSnapshot> {
        match self {
            ReportView::Full(r) => Some(&r.health),
            ReportView::Coverage(_) => None,
            ReportView::Health(h) => Some(h),
        }
    }

    /// Merged list when health ran, otherwise the coverage-only list
    pub fn recommendations(&self) -> &'a [Recommendation] {
        match self {
            ReportView::Full(r) => &r.health.recommendations,
            ReportView::Coverage(c) => &c.recommendations,
            ReportView::Health(h) => &h.recommendations,
        }
    }
}

/// Render a view in the specified format; `color` only affects text output
pub fn render(view: ReportView<'_>, format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render(view, color)),
        OutputFormat::Json => json::render(view),
        OutputFormat::Markdown => Ok(markdown::render(view)),
    }
}
