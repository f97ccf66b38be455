//! Test artifact index
//!
//! Enumerates test source files under a root directory and, on demand,
//! extracts the byte spans of their top-level test functions. File
//! contents and spans are cached for the lifetime of the index, so one
//! index serves exactly one analysis run.
//!
//! Span extraction sits behind [`SourceSymbolIndex`]; Go sources are parsed
//! with tree-sitter. A file that fails to parse is excluded from
//! function-level lookup but still counts as an enumerated test file.

mod go;

use dashmap::DashMap;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::error::{AnalysisError, AnalysisResult};

/// `[start, end)` byte span of one top-level test function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl FunctionSpan {
    /// Raw text of the function within `source`
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Function-level view of source files
pub trait SourceSymbolIndex: Send + Sync {
    /// Test entry points in `path`, or `None` when the file cannot be parsed
    fn function_spans(&self, path: &Path) -> Option<Arc<[FunctionSpan]>>;
}

/// Test source files of one tree, with lazily parsed function spans
pub struct TestArtifactIndex {
    root: PathBuf,
    files: Vec<PathBuf>,
    function_prefix: String,
    contents: DashMap<PathBuf, Option<Arc<str>>>,
    spans: DashMap<PathBuf, Option<Arc<[FunctionSpan]>>>,
}

impl TestArtifactIndex {
    /// Enumerate every file under `root` whose name ends with the configured suffix
    pub fn scan(root: &Path, config: &IndexConfig) -> AnalysisResult<Self> {
        if !root.is_dir() {
            return Err(AnalysisError::TestRootUnreadable {
                path: root.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let files: Vec<PathBuf> = walk_files(root)
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&config.test_file_suffix))
            })
            .collect();

        info!(
            "Found {} test files (*{}) under {}",
            files.len(),
            config.test_file_suffix,
            root.display()
        );

        Ok(Self::from_files(root, files, &config.test_function_prefix))
    }

    /// Build an index over an explicit file list
    pub fn from_files(root: &Path, mut files: Vec<PathBuf>, function_prefix: &str) -> Self {
        files.sort();
        files.dedup();
        Self {
            root: root.to_path_buf(),
            files,
            function_prefix: function_prefix.to_string(),
            contents: DashMap::new(),
            spans: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerated test files, sorted by path
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Path relative to the index root, for display
    pub fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Raw text of a test file; `None` if it cannot be read as UTF-8
    pub fn source(&self, path: &Path) -> Option<Arc<str>> {
        if let Some(cached) = self.contents.get(path) {
            return cached.value().clone();
        }

        let loaded = match std::fs::read_to_string(path) {
            Ok(text) => Some(Arc::<str>::from(text)),
            Err(e) => {
                warn!("Skipping unreadable test file {}: {}", path.display(), e);
                None
            }
        };
        self.contents.insert(path.to_path_buf(), loaded.clone());
        loaded
    }
}

impl SourceSymbolIndex for TestArtifactIndex {
    fn function_spans(&self, path: &Path) -> Option<Arc<[FunctionSpan]>> {
        if let Some(cached) = self.spans.get(path) {
            return cached.value().clone();
        }

        let parsed = self.source(path).and_then(|source| {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            match ext {
                "go" => go::test_functions(&source, &self.function_prefix),
                _ => {
                    debug!("No symbol parser for {}", path.display());
                    None
                }
            }
        });

        let parsed: Option<Arc<[FunctionSpan]>> = match parsed {
            Some(spans) => Some(spans.into()),
            None => {
                warn!(
                    "Could not parse {}; excluded from function-level lookup",
                    path.display()
                );
                None
            }
        };
        self.spans.insert(path.to_path_buf(), parsed.clone());
        parsed
    }
}

/// Every regular file under `root`, sorted, honoring .gitignore files
pub(crate) fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warn!("Walk error under {}: {}", root.display(), e),
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_TEST: &str = r#"package e2e

import "testing"

// TestPolicyApply checks Property 1.
func TestPolicyApply(t *testing.T) {
	t.Log("apply")
}

func helper() {}

func TestCleanup(t *testing.T) {}
"#;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_scan_filters_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "policy_test.go", GO_TEST);
        write(dir.path(), "nested/workload_test.go", GO_TEST);
        write(dir.path(), "helpers/helpers.go", "package helpers\n");
        write(dir.path(), "README.md", "# e2e\n");

        let index = TestArtifactIndex::scan(dir.path(), &IndexConfig::default()).unwrap();
        let names: Vec<_> = index
            .files()
            .iter()
            .map(|p| index.display_path(p).to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["nested/workload_test.go", "policy_test.go"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TestArtifactIndex::scan(&dir.path().join("nope"), &IndexConfig::default())
            .err()
            .expect("missing root should fail");
        assert!(matches!(err, AnalysisError::TestRootUnreadable { .. }));
    }

    #[test]
    fn test_function_spans_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "policy_test.go", GO_TEST);
        let index = TestArtifactIndex::from_files(dir.path(), vec![path.clone()], "Test");

        let spans = index.function_spans(&path).expect("file should parse");
        let names: Vec<_> = spans.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["TestPolicyApply", "TestCleanup"]);

        let source = index.source(&path).unwrap();
        let first = spans[0].text(&source);
        assert!(first.starts_with("// TestPolicyApply checks Property 1."));
        assert!(first.ends_with('}'));
    }

    #[test]
    fn test_unparseable_file_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "a_test.go", GO_TEST);
        let bad = write(dir.path(), "b_test.go", "package e2e\n\nfunc TestBroken( {\n");
        let index = TestArtifactIndex::scan(dir.path(), &IndexConfig::default()).unwrap();

        // Both files are enumerated
        assert_eq!(index.len(), 2);
        assert!(index.function_spans(&good).is_some());
        assert!(index.function_spans(&bad).is_none());
        // Raw text is still available for whole-file searches
        assert!(index.source(&bad).is_some());
    }

    #[test]
    fn test_unknown_extension_has_no_spans() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "smoke_test.sh", "echo ok\n");
        let index = TestArtifactIndex::from_files(dir.path(), vec![path.clone()], "Test");
        assert!(index.function_spans(&path).is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_span_helpers() {
        let span = FunctionSpan {
            name: "TestX".into(),
            start: 4,
            end: 10,
        };
        assert!(span.contains(4));
        assert!(!span.contains(10));
        assert_eq!(span.len(), 6);
        assert_eq!(span.text("0123456789ab"), "456789");
    }
}
