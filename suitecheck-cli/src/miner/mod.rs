//! Document miner
//!
//! Extracts [`Requirement`] and [`Property`] records from free-text design
//! documents using a declarative list of extraction rules per document kind.
//! Each rule is a regex plus the names of the capture groups holding the id,
//! the text and (for properties) the list of validated requirements.
//!
//! Built-in rules recognize the acceptance-criterion shape
//! `1.2 WHEN ... THE ... SHALL ...` (one physical line) and property blocks
//!
//! ```text
//! **Property 3: Recommendations stay within bounds**
//! *For any* workload and policy, ...
//! **Validates: Requirements 2.1, 2.3**
//! ```

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::config::{MinerConfig, RuleConfig};
use crate::error::{AnalysisError, AnalysisResult, DocumentKind};
use crate::models::{Property, Requirement};

/// Acceptance criteria: optional dotted-numeric prefix, then WHEN/THE/SHALL on one line
pub const REQUIREMENT_PATTERN: &str =
    r"(?im)^[ \t]*(?:(?P<id>\d+(?:\.\d+)*)\.?[ \t]+)?(?P<text>WHEN[^\n]*?THE[^\n]*?SHALL[^\n]*)$";

/// Property blocks: header line, `*For any*` clause, `**Validates: ...**` terminator
pub const PROPERTY_PATTERN: &str = r"Property (?P<id>\d+):(?P<text>[^\n]*)\r?\n\*For any\*[^\n]*\r?\n\*\*Validates:(?P<validates>[^\n]*?)\*\*";

static REQUIREMENT_ID: OnceLock<Regex> = OnceLock::new();

fn requirement_id_regex() -> &'static Regex {
    REQUIREMENT_ID.get_or_init(|| Regex::new(r"\d+(?:\.\d+)*").expect("valid regex"))
}

/// One compiled `(pattern, captured-id-group)` rule
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pattern: Regex,
    id_group: String,
    text_group: Option<String>,
    validates_group: Option<String>,
}

/// A single rule match before it is turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawMatch {
    start: usize,
    id: String,
    text: String,
    validates: Vec<String>,
}

impl ExtractionRule {
    /// Compile a rule; a malformed pattern is a configuration error
    pub fn new(
        pattern: &str,
        id_group: impl Into<String>,
        text_group: Option<String>,
        validates_group: Option<String>,
    ) -> AnalysisResult<Self> {
        let compiled =
            Regex::new(pattern).map_err(|e| AnalysisError::invalid_pattern(pattern, e))?;
        let id_group = id_group.into();

        for group in std::iter::once(Some(&id_group))
            .chain([text_group.as_ref(), validates_group.as_ref()])
            .flatten()
        {
            if !compiled.capture_names().flatten().any(|n| n == group.as_str()) {
                return Err(AnalysisError::Config(format!(
                    "extraction pattern '{}' has no capture group named '{}'",
                    pattern, group
                )));
            }
        }

        Ok(Self {
            pattern: compiled,
            id_group,
            text_group,
            validates_group,
        })
    }

    fn from_config(rule: &RuleConfig) -> AnalysisResult<Self> {
        Self::new(
            &rule.pattern,
            rule.id_group.clone(),
            rule.text_group.clone(),
            rule.validates_group.clone(),
        )
    }

    fn matches(&self, text: &str) -> Vec<RawMatch> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let id = caps
                    .name(&self.id_group)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                let raw_text = match &self.text_group {
                    Some(group) => caps.name(group).map(|m| m.as_str()).unwrap_or(""),
                    None => whole.as_str(),
                };
                let validates = self
                    .validates_group
                    .as_ref()
                    .and_then(|group| caps.name(group))
                    .map(|m| {
                        requirement_id_regex()
                            .find_iter(m.as_str())
                            .map(|id| id.as_str().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                Some(RawMatch {
                    start: whole.start(),
                    id,
                    text: clean_text(raw_text),
                    validates,
                })
            })
            .collect()
    }
}

/// Strip surrounding whitespace and markdown emphasis
fn clean_text(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .to_string()
}

/// Requirements and properties mined from one pair of documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinedDocuments {
    pub requirements: Vec<Requirement>,
    pub properties: Vec<Property>,
}

/// Extracts requirement and property records with a fixed rule set
#[derive(Debug, Clone)]
pub struct DocumentMiner {
    requirement_rules: Vec<ExtractionRule>,
    property_rules: Vec<ExtractionRule>,
}

impl DocumentMiner {
    /// Miner with the built-in rules
    pub fn builtin() -> AnalysisResult<Self> {
        Self::from_config(&MinerConfig::default())
    }

    /// Miner using configured rules, falling back to built-ins per empty list
    pub fn from_config(config: &MinerConfig) -> AnalysisResult<Self> {
        let requirement_rules = if config.requirement_rules.is_empty() {
            vec![ExtractionRule::new(
                REQUIREMENT_PATTERN,
                "id",
                Some("text".to_string()),
                None,
            )?]
        } else {
            config
                .requirement_rules
                .iter()
                .map(ExtractionRule::from_config)
                .collect::<AnalysisResult<_>>()?
        };

        let property_rules = if config.property_rules.is_empty() {
            vec![ExtractionRule::new(
                PROPERTY_PATTERN,
                "id",
                Some("text".to_string()),
                Some("validates".to_string()),
            )?]
        } else {
            config
                .property_rules
                .iter()
                .map(ExtractionRule::from_config)
                .collect::<AnalysisResult<_>>()?
        };

        Ok(Self {
            requirement_rules,
            property_rules,
        })
    }

    /// Requirements in document order
    pub fn mine_requirements(&self, text: &str) -> Vec<Requirement> {
        apply_rules(&self.requirement_rules, text, "requirement")
            .into_iter()
            .map(|m| Requirement {
                id: m.id,
                text: m.text,
            })
            .collect()
    }

    /// Properties in document order
    pub fn mine_properties(&self, text: &str) -> Vec<Property> {
        apply_rules(&self.property_rules, text, "property")
            .into_iter()
            .map(|m| Property {
                id: m.id,
                text: m.text,
                validates: m.validates,
            })
            .collect()
    }

    /// Read and mine both documents; an unreadable document fails the run
    pub fn mine_documents(
        &self,
        requirements_path: &Path,
        design_path: &Path,
    ) -> AnalysisResult<MinedDocuments> {
        let requirements_text = read_document(DocumentKind::Requirements, requirements_path)?;
        let design_text = read_document(DocumentKind::Design, design_path)?;

        let mined = MinedDocuments {
            requirements: self.mine_requirements(&requirements_text),
            properties: self.mine_properties(&design_text),
        };
        info!(
            "Mined {} requirements and {} properties",
            mined.requirements.len(),
            mined.properties.len()
        );
        Ok(mined)
    }
}

/// Run every rule and merge the matches in document order.
///
/// Two rules matching at the same offset with the same id yield one record.
/// A non-empty id seen again later in the document is dropped; the first
/// occurrence wins. Items without an id are all kept.
fn apply_rules(rules: &[ExtractionRule], text: &str, label: &str) -> Vec<RawMatch> {
    let mut all: Vec<RawMatch> = rules.iter().flat_map(|r| r.matches(text)).collect();
    all.sort_by_key(|m| m.start);
    all.dedup_by(|b, a| a.start == b.start && a.id == b.id);

    let mut seen = HashSet::new();
    all.retain(|m| {
        if m.id.is_empty() || seen.insert(m.id.clone()) {
            return true;
        }
        warn!(
            "Duplicate {} id {} ignored; keeping its first occurrence",
            label, m.id
        );
        false
    });
    all
}

fn read_document(kind: DocumentKind, path: &Path) -> AnalysisResult<String> {
    debug!("Reading {} document {}", kind, path.display());
    std::fs::read_to_string(path).map_err(|source| AnalysisError::DocumentUnreadable {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
