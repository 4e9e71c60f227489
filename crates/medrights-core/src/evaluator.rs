//! Rule Evaluator
//!
//! Applies every catalog rule exactly once to a fact set and classifies the
//! result. Total over well-formed fact sets: it never fails and never
//! refuses. Malformed input is stopped upstream by the safety gate.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Rule, RuleCatalog, RuleCategory, RuleSource};
use crate::schema::FactSet;

/// Fixed reasons attached to a `NOT_PROVABLE` verdict
pub const NOT_PROVABLE_REASONS: &[&str] = &[
    "No rule in the catalog is satisfied by the facts stated in the description.",
    "The system reaches no determination without an explicit signal for every element of a rule.",
];

/// Verdict classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictType {
    /// At least one primary violation or duty matched
    Provable,
    /// Only procedural remedies matched
    Procedural,
    /// Nothing matched
    NotProvable,
}

impl VerdictType {
    /// Returns the wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provable => "PROVABLE",
            Self::Procedural => "PROCEDURAL",
            Self::NotProvable => "NOT_PROVABLE",
        }
    }
}

impl std::fmt::Display for VerdictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A matched rule as it appears in a verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    /// Rule id
    pub id: String,
    /// Cited document
    pub source: RuleSource,
    /// Clause reference
    pub citation: String,
    /// Plain statements
    pub explanation: Vec<String>,
}

impl From<&Rule> for RuleMatch {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            source: rule.source,
            citation: rule.citation.clone(),
            explanation: rule.explanation.clone(),
        }
    }
}

/// Outcome of one evaluation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    verdict_type: VerdictType,
    primary_violations: Vec<RuleMatch>,
    imc_duties: Vec<RuleMatch>,
    procedural_remedies: Vec<RuleMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reasons: Vec<String>,
}

impl Verdict {
    fn classify(
        primary_violations: Vec<RuleMatch>,
        imc_duties: Vec<RuleMatch>,
        procedural_remedies: Vec<RuleMatch>,
    ) -> Self {
        let verdict_type = if !primary_violations.is_empty() || !imc_duties.is_empty() {
            VerdictType::Provable
        } else if !procedural_remedies.is_empty() {
            VerdictType::Procedural
        } else {
            VerdictType::NotProvable
        };

        let reasons = match verdict_type {
            VerdictType::NotProvable => NOT_PROVABLE_REASONS.iter().map(|r| (*r).to_string()).collect(),
            _ => Vec::new(),
        };

        Self {
            verdict_type,
            primary_violations,
            imc_duties,
            procedural_remedies,
            reasons,
        }
    }

    /// Classification
    #[must_use]
    pub fn verdict_type(&self) -> VerdictType {
        self.verdict_type
    }

    /// Shorthand for a `PROVABLE` verdict
    #[must_use]
    pub fn is_provable(&self) -> bool {
        self.verdict_type == VerdictType::Provable
    }

    /// Matched patient rights
    #[must_use]
    pub fn primary_violations(&self) -> &[RuleMatch] {
        &self.primary_violations
    }

    /// Matched professional duties, one entry per id
    #[must_use]
    pub fn imc_duties(&self) -> &[RuleMatch] {
        &self.imc_duties
    }

    /// Matched procedural remedies
    #[must_use]
    pub fn procedural_remedies(&self) -> &[RuleMatch] {
        &self.procedural_remedies
    }

    /// Reasons, present only for `NOT_PROVABLE`
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Every match across the three lists, in output order
    pub fn matches(&self) -> impl Iterator<Item = &RuleMatch> {
        self.primary_violations
            .iter()
            .chain(self.imc_duties.iter())
            .chain(self.procedural_remedies.iter())
    }

    /// Ids of every match, in output order
    #[must_use]
    pub fn matched_ids(&self) -> Vec<&str> {
        self.matches().map(|m| m.id.as_str()).collect()
    }

    /// Every string this verdict surfaces to a caller
    #[must_use]
    pub fn emitted_text(&self) -> Vec<&str> {
        let mut text = vec![self.verdict_type.as_str()];
        for m in self.matches() {
            text.push(&m.id);
            text.push(m.source.as_str());
            text.push(&m.citation);
            text.extend(m.explanation.iter().map(String::as_str));
        }
        text.extend(self.reasons.iter().map(String::as_str));
        text
    }

    /// JSON form
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// One satisfied rule and the facts that satisfied it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofStep {
    /// Rule id
    pub rule_id: String,
    /// Rule category
    pub category: RuleCategory,
    /// Fact paths of the first satisfied predicate path
    pub facts: Vec<String>,
}

/// How a verdict was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofTrace {
    /// Satisfied rules in catalog order
    pub steps: Vec<ProofStep>,
    /// Fact paths that were `yes`
    pub facts_used: Vec<String>,
    /// Ids of every rule evaluated, in catalog order
    pub rules_evaluated: Vec<String>,
}

impl ProofTrace {
    /// Rule ids in the trace
    #[must_use]
    pub fn rule_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.rule_id.clone()).collect()
    }
}

/// Stateless evaluator over a shared catalog
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    catalog: Arc<RuleCatalog>,
}

impl RuleEvaluator {
    /// Evaluator over the given catalog
    #[must_use]
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog in use
    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Evaluate a fact set
    #[must_use]
    pub fn evaluate(&self, facts: &FactSet) -> Verdict {
        self.evaluate_with_trace(facts).0
    }

    /// Evaluate a fact set and keep the proof trace
    #[must_use]
    pub fn evaluate_with_trace(&self, facts: &FactSet) -> (Verdict, ProofTrace) {
        let mut primary = Vec::new();
        let mut duties = Vec::new();
        let mut procedural = Vec::new();
        let mut seen_duties: HashSet<&str> = HashSet::new();
        let mut steps = Vec::new();

        for rule in self.catalog.rules() {
            let Some(path) = rule.satisfied_path(facts) else {
                continue;
            };

            match rule.category {
                RuleCategory::PrimaryViolation => primary.push(RuleMatch::from(rule)),
                RuleCategory::Duty => {
                    if !seen_duties.insert(rule.id.as_str()) {
                        continue;
                    }
                    duties.push(RuleMatch::from(rule));
                }
                RuleCategory::Procedural => procedural.push(RuleMatch::from(rule)),
            }

            steps.push(ProofStep {
                rule_id: rule.id.clone(),
                category: rule.category,
                facts: path.all.clone(),
            });
        }

        let verdict = Verdict::classify(primary, duties, procedural);
        let trace = ProofTrace {
            steps,
            facts_used: facts.yes_paths(),
            rules_evaluated: self.catalog.rules().iter().map(|r| r.id.clone()).collect(),
        };

        debug!(
            verdict = %verdict.verdict_type(),
            matched = trace.steps.len(),
            "Facts evaluated"
        );

        (verdict, trace)
    }
}

#[cfg(test)]
mod tests;
