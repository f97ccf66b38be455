//! Error types for the analysis engine
//!
//! The engine either returns a complete report or exactly one of these.
//! Soft failures (an unparseable test file, a timed-out probe) never
//! surface here; they are folded into the report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Which input document a read error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Requirements,
    Design,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Requirements => write!(f, "requirements"),
            DocumentKind::Design => write!(f, "design"),
        }
    }
}

/// Errors that abort an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Cannot read {kind} document {}: {source}", path.display())]
    DocumentUnreadable {
        kind: DocumentKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read test root {}: {reason}", path.display())]
    TestRootUnreadable { path: PathBuf, reason: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    pub(crate) fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        AnalysisError::InvalidPattern {
            pattern: pattern.into(),
            source: Box::new(source),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_names_the_artifact() {
        let err = AnalysisError::DocumentUnreadable {
            kind: DocumentKind::Design,
            path: PathBuf::from("docs/design.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("design"), "got: {}", msg);
        assert!(msg.contains("docs/design.md"), "got: {}", msg);
    }

    #[test]
    fn test_invalid_pattern_message() {
        let source = regex::Regex::new("(unclosed").expect_err("pattern should be invalid");
        let err = AnalysisError::invalid_pattern("(unclosed", source);
        assert!(err.to_string().starts_with("Invalid pattern '(unclosed'"));
    }
}
