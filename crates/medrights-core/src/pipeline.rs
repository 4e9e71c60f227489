//! Query pipeline
//!
//! text → extractor → gate (facts) → evaluator → gate (output).
//! Cloning a pipeline clones `Arc`s, so one instance serves any number of
//! concurrent queries.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::catalog::RuleCatalog;
use crate::error::Result;
use crate::evaluator::{ProofTrace, RuleEvaluator, Verdict, VerdictType};
use crate::explain::{Explainer, ExplanationSandbox};
use crate::extractor::FactExtractor;
use crate::gate::{GateResult, SafetyGate};
use crate::refusal::Refusal;
use crate::schema::{FactSchema, FactSet};

/// Result of one admitted query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Fact set the verdict was computed from
    pub facts: FactSet,
    /// Verdict, already checked for forbidden vocabulary
    pub verdict: Verdict,
    /// How the verdict was reached
    pub trace: ProofTrace,
}

impl Analysis {
    /// Audit record for this query
    #[must_use]
    pub fn audit_trail(&self, query_id: impl Into<String>) -> AuditTrail {
        AuditTrail {
            query_id: query_id.into(),
            facts_used: self.trace.facts_used.clone(),
            rules_evaluated: self.trace.rules_evaluated.clone(),
            verdict_status: Some(self.verdict.verdict_type()),
            proof_ids: self.trace.rule_ids(),
            refusal: None,
        }
    }
}

/// What was used, what was checked, and how the query ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTrail {
    /// Caller-supplied query id
    pub query_id: String,
    /// Fact paths that were `yes`
    pub facts_used: Vec<String>,
    /// Rule ids evaluated
    pub rules_evaluated: Vec<String>,
    /// Verdict type, absent on refusal
    pub verdict_status: Option<VerdictType>,
    /// Ids of satisfied rules
    pub proof_ids: Vec<String>,
    /// Refusal reason (`CODE: detail`), absent on success
    pub refusal: Option<String>,
}

impl AuditTrail {
    /// Audit record for a refused query
    #[must_use]
    pub fn refused(query_id: impl Into<String>, refusal: &Refusal) -> Self {
        Self {
            query_id: query_id.into(),
            facts_used: Vec::new(),
            rules_evaluated: Vec::new(),
            verdict_status: None,
            proof_ids: Vec::new(),
            refusal: Some(refusal.reason()),
        }
    }
}

/// Extractor, evaluator and gate wired together
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: Arc<FactExtractor>,
    evaluator: RuleEvaluator,
    gate: Arc<SafetyGate>,
}

impl Pipeline {
    /// Wire an extractor to a catalog; the gate shares the extractor's schema
    #[must_use]
    pub fn new(extractor: FactExtractor, catalog: Arc<RuleCatalog>) -> Self {
        let gate = SafetyGate::new(extractor.schema().clone());
        Self {
            extractor: Arc::new(extractor),
            evaluator: RuleEvaluator::new(catalog),
            gate: Arc::new(gate),
        }
    }

    /// Standard schema, detectors and embedded catalog
    pub fn standard() -> Result<Self> {
        let extractor = FactExtractor::standard()?;
        let catalog = RuleCatalog::embedded(extractor.schema())?;
        Ok(Self::new(extractor, Arc::new(catalog)))
    }

    /// Schema shared by extractor and gate
    #[must_use]
    pub fn schema(&self) -> &FactSchema {
        self.extractor.schema()
    }

    /// Catalog in use
    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        self.evaluator.catalog()
    }

    /// The safety gate
    #[must_use]
    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    /// Analyze free text
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub fn analyze(&self, text: &str) -> GateResult<Analysis> {
        let facts = self.extractor.extract(text);
        self.conclude(facts)
    }

    /// Evaluate an externally supplied fact record
    #[instrument(skip(self, record))]
    pub fn evaluate_record(&self, record: &Value) -> GateResult<Analysis> {
        let facts = self.gate.admit_record(record)?;
        self.conclude(facts)
    }

    /// Explain an analysis through the sandbox
    pub fn explain(&self, analysis: &Analysis, explainer: &dyn Explainer) -> Result<String> {
        ExplanationSandbox::new((*self.gate).clone()).explain(
            &analysis.verdict,
            &analysis.trace,
            explainer,
        )
    }

    fn conclude(&self, facts: FactSet) -> GateResult<Analysis> {
        self.gate.check_facts(&facts)?;
        let (verdict, trace) = self.evaluator.evaluate_with_trace(&facts);
        self.gate.check_verdict(&verdict)?;
        Ok(Analysis {
            facts,
            verdict,
            trace,
        })
    }
}
