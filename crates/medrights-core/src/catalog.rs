//! Rule Catalog
//!
//! A single versioned, declarative list of rules loaded once at startup.
//! Adding or removing a rule is a change to `catalog/rules.toml`, never to
//! control flow.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gate::find_forbidden_word;
use crate::schema::{FactSchema, FactSet};

/// The catalog compiled into the crate
const EMBEDDED_CATALOG: &str = include_str!("../catalog/rules.toml");

/// Regulatory document a rule cites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleSource {
    /// Charter of Patients' Rights (NHRC, 2019)
    Charter,
    /// IMC (Professional Conduct, Etiquette and Ethics) Regulations, 2002
    EthicsCode,
}

impl RuleSource {
    /// Returns the wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charter => "CHARTER",
            Self::EthicsCode => "ETHICS_CODE",
        }
    }
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which verdict list a match lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    /// A patient right was violated
    PrimaryViolation,
    /// A professional duty was breached
    Duty,
    /// Conduct concern with a procedural remedy only
    Procedural,
}

impl RuleCategory {
    /// Returns the wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryViolation => "PRIMARY_VIOLATION",
            Self::Duty => "DUTY",
            Self::Procedural => "PROCEDURAL",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One conjunctive path of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicatePath {
    /// Fact paths that must all be `yes`
    pub all: Vec<String>,
}

impl PredicatePath {
    /// Whether every fact on this path is `yes`
    #[must_use]
    pub fn holds(&self, facts: &FactSet) -> bool {
        self.all.iter().all(|path| facts.is_yes(path))
    }
}

/// A catalog rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique id
    pub id: String,
    /// Cited document
    pub source: RuleSource,
    /// Verdict list
    pub category: RuleCategory,
    /// Clause reference
    pub citation: String,
    /// Plain statements shown with a match
    pub explanation: Vec<String>,
    /// Any-of predicate paths
    pub when: Vec<PredicatePath>,
}

impl Rule {
    /// First predicate path satisfied by `facts`
    #[must_use]
    pub fn satisfied_path(&self, facts: &FactSet) -> Option<&PredicatePath> {
        self.when.iter().find(|path| path.holds(facts))
    }

    /// Whether the predicate holds
    #[must_use]
    pub fn matches(&self, facts: &FactSet) -> bool {
        self.satisfied_path(facts).is_some()
    }
}

/// Catalog metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMeta {
    /// Catalog version, recorded with every audit entry
    pub version: String,
    /// Title
    pub title: String,
}

/// Ordered rule catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalog {
    /// Metadata
    pub meta: CatalogMeta,
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Catalog compiled into the crate, validated against the standard schema
    pub fn standard() -> Result<Self> {
        Self::embedded(&FactSchema::standard())
    }

    /// Catalog compiled into the crate, validated against `schema`
    pub fn embedded(schema: &FactSchema) -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG, schema)
    }

    /// Load and validate a catalog file
    pub fn from_path(path: impl AsRef<Path>, schema: &FactSchema) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Catalog(format!("Failed to read {}: {}", path.display(), e)))?;
        let catalog = Self::from_toml_str(&content, schema)?;
        debug!(path = ?path, rules = catalog.len(), "Rule catalog loaded from file");
        Ok(catalog)
    }

    /// Parse and validate catalog TOML
    pub fn from_toml_str(content: &str, schema: &FactSchema) -> Result<Self> {
        let catalog: Self = toml::from_str(content)
            .map_err(|e| Error::Catalog(format!("Failed to parse catalog: {e}")))?;
        catalog.validate(schema)?;
        debug!(
            version = %catalog.meta.version,
            rules = catalog.len(),
            "Rule catalog ready"
        );
        Ok(catalog)
    }

    /// Check ids, predicates and emitted text
    pub fn validate(&self, schema: &FactSchema) -> Result<()> {
        if self.meta.version.trim().is_empty() {
            return Err(Error::Catalog("catalog version is empty".to_string()));
        }
        for text in [&self.meta.title, &self.meta.version] {
            if let Some(word) = find_forbidden_word(text) {
                return Err(Error::Catalog(format!(
                    "catalog header contains forbidden term '{word}'"
                )));
            }
        }

        let mut ids = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(Error::Catalog("rule with empty id".to_string()));
            }
            if !ids.insert(rule.id.as_str()) {
                return Err(Error::Catalog(format!("duplicate rule id '{}'", rule.id)));
            }
            if rule.citation.trim().is_empty() {
                return Err(Error::Catalog(format!("rule '{}' has no citation", rule.id)));
            }
            if rule.explanation.is_empty() || rule.explanation.iter().any(|l| l.trim().is_empty()) {
                return Err(Error::Catalog(format!(
                    "rule '{}' has an empty explanation",
                    rule.id
                )));
            }
            if rule.when.is_empty() {
                return Err(Error::Catalog(format!("rule '{}' has no predicate", rule.id)));
            }
            for path in &rule.when {
                if path.all.is_empty() {
                    return Err(Error::Catalog(format!(
                        "rule '{}' has an empty predicate path",
                        rule.id
                    )));
                }
                if let Some(fact) = path.all.iter().find(|f| !schema.contains_path(f)) {
                    return Err(Error::Catalog(format!(
                        "rule '{}' references undeclared fact '{}'",
                        rule.id, fact
                    )));
                }
            }

            let emitted = std::iter::once(&rule.id)
                .chain(std::iter::once(&rule.citation))
                .chain(rule.explanation.iter());
            for text in emitted {
                if let Some(word) = find_forbidden_word(text) {
                    return Err(Error::Catalog(format!(
                        "rule '{}' contains forbidden term '{}'",
                        rule.id, word
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rules in catalog order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Find a rule by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rules of one category, in catalog order
    pub fn by_category(&self, category: RuleCategory) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.category == category)
    }

    /// Catalog version
    #[must_use]
    pub fn version(&self) -> &str {
        &self.meta.version
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog has no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
