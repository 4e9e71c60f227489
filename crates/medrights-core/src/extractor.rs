//! Fact Extractor - rule-based, purely lexical, no inference.
//!
//! Maps raw text to a total fact set. Each detector independently decides
//! whether to set its target to `yes`; anything untouched keeps the schema
//! default. Detectors run in table order, and a detector whose `requires`
//! facts are not yet `yes` is skipped, so dependency-producing detectors must
//! come first. [`FactExtractor::new`] rejects tables that violate this.

mod detectors;

use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{split_path, FactSchema, FactSet, FactValue};

pub use detectors::standard_detectors;

/// A lexical test over normalized text
#[derive(Debug, Clone)]
pub enum Signal {
    /// True if any literal phrase occurs
    Phrases(Vec<&'static str>),
    /// True if the pattern matches anywhere
    Pattern(Regex),
    /// True if every sub-signal holds
    All(Vec<Signal>),
    /// True if any sub-signal holds
    Any(Vec<Signal>),
    /// Always true; the detector's `requires` carry the whole condition
    Always,
}

impl Signal {
    /// Phrase-set match
    #[must_use]
    pub fn phrases(list: &[&'static str]) -> Self {
        Self::Phrases(list.to_vec())
    }

    /// Pattern match; fails on an invalid expression
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| Error::Schema(format!("invalid detector pattern '{pattern}': {e}")))
    }

    /// Evaluate against already-normalized text
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Phrases(list) => list.iter().any(|p| text.contains(p)),
            Self::Pattern(re) => re.is_match(text),
            Self::All(signals) => signals.iter().all(|s| s.matches(text)),
            Self::Any(signals) => signals.iter().any(|s| s.matches(text)),
            Self::Always => true,
        }
    }
}

#[derive(Debug, Clone)]
enum Target {
    Flag {
        path: &'static str,
        signal: Signal,
    },
    FirstMatch {
        group: &'static str,
        candidates: Vec<(&'static str, Signal)>,
    },
}

/// One entry of the detector table
#[derive(Debug, Clone)]
pub struct Detector {
    target: Target,
    requires: Vec<&'static str>,
}

impl Detector {
    /// Set `path` to `yes` when `signal` matches
    #[must_use]
    pub fn flag(path: &'static str, signal: Signal) -> Self {
        Self {
            target: Target::Flag { path, signal },
            requires: Vec::new(),
        }
    }

    /// Set the first matching member of an exclusive group, in priority order
    #[must_use]
    pub fn first_match(group: &'static str, candidates: Vec<(&'static str, Signal)>) -> Self {
        Self {
            target: Target::FirstMatch { group, candidates },
            requires: Vec::new(),
        }
    }

    /// Only run when every listed fact is already `yes`
    #[must_use]
    pub fn requires(mut self, paths: &[&'static str]) -> Self {
        self.requires.extend_from_slice(paths);
        self
    }

    /// Leaf paths this detector may set
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        match &self.target {
            Target::Flag { path, .. } => vec![(*path).to_string()],
            Target::FirstMatch { group, candidates } => candidates
                .iter()
                .map(|(member, _)| format!("{group}.{member}"))
                .collect(),
        }
    }

    /// Facts that must be `yes` before this detector runs
    #[must_use]
    pub fn dependencies(&self) -> &[&'static str] {
        &self.requires
    }

    fn apply(&self, text: &str, facts: &mut FactSet) {
        if !self.requires.iter().all(|p| facts.is_yes(p)) {
            return;
        }
        match &self.target {
            Target::Flag { path, signal } => {
                if signal.matches(text) {
                    facts.set(path, FactValue::Yes);
                }
            }
            Target::FirstMatch { group, candidates } => {
                if let Some((member, _)) = candidates.iter().find(|(_, s)| s.matches(text)) {
                    facts.set(&format!("{group}.{member}"), FactValue::Yes);
                }
            }
        }
    }
}

/// Deterministic extractor bound to a schema
#[derive(Debug, Clone)]
pub struct FactExtractor {
    schema: FactSchema,
    detectors: Vec<Detector>,
}

impl FactExtractor {
    /// Bind a detector table to a schema, validating targets and ordering
    pub fn new(schema: FactSchema, detectors: Vec<Detector>) -> Result<Self> {
        let mut produced: HashSet<String> = HashSet::new();

        for detector in &detectors {
            for dep in &detector.requires {
                if !schema.contains_path(dep) {
                    return Err(Error::Schema(format!("detector requires undeclared fact '{dep}'")));
                }
                if !produced.contains(*dep) {
                    return Err(Error::Schema(format!(
                        "detector for {:?} requires '{dep}' before any detector produces it",
                        detector.targets()
                    )));
                }
            }

            match &detector.target {
                Target::Flag { path, .. } => {
                    let (group, _) = split_path(path);
                    if schema.is_exclusive_group(group) {
                        return Err(Error::Schema(format!(
                            "'{path}' belongs to an exclusive group and needs a first-match detector"
                        )));
                    }
                }
                Target::FirstMatch { group, .. } => {
                    if !schema.is_exclusive_group(group) {
                        return Err(Error::Schema(format!(
                            "first-match detector targets '{group}', which is not an exclusive group"
                        )));
                    }
                }
            }

            for target in detector.targets() {
                if !schema.contains_path(&target) {
                    return Err(Error::Schema(format!("detector targets undeclared fact '{target}'")));
                }
                if !produced.insert(target.clone()) {
                    return Err(Error::Schema(format!("fact '{target}' has more than one detector")));
                }
            }
        }

        debug!(detectors = detectors.len(), "Fact extractor ready");
        Ok(Self { schema, detectors })
    }

    /// Standard schema with the standard detector table
    pub fn standard() -> Result<Self> {
        Self::new(FactSchema::standard(), standard_detectors()?)
    }

    /// The schema fact sets are built from
    #[must_use]
    pub fn schema(&self) -> &FactSchema {
        &self.schema
    }

    /// Number of detectors in the table
    #[must_use]
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Extract a total fact set from free text
    #[must_use]
    pub fn extract(&self, text: &str) -> FactSet {
        let normalized = normalize(text);
        let mut facts = self.schema.defaults();

        for detector in &self.detectors {
            detector.apply(&normalized, &mut facts);
        }

        debug!(facts_set = facts.yes_paths().len(), "Facts extracted");
        facts
    }
}

/// Case-fold, unify apostrophes, and collapse whitespace runs
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
