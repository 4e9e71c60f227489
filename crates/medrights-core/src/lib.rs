//! Medrights Core - Deterministic Verdict Engine
//!
//! This crate turns a free-text account of a patient-provider dispute into a
//! verdict citing the Charter of Patients' Rights and the IMC ethics
//! regulations:
//! - Schema: the closed set of fact keys and their defaults
//! - Extractor: lexical detectors from text to a total fact set
//! - Catalog: the versioned declarative rule list
//! - Evaluator: rules applied to facts, classified into a verdict
//! - Gate: fail-closed checks on input records and emitted text
//! - Explain: sandboxed plain-text restatement of a proof
//! - Pipeline: the above wired together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod explain;
pub mod extractor;
pub mod gate;
pub mod pipeline;
pub mod refusal;
pub mod schema;

pub use catalog::{CatalogMeta, PredicatePath, Rule, RuleCatalog, RuleCategory, RuleSource};
pub use error::{Error, Result};
pub use evaluator::{
    ProofStep, ProofTrace, RuleEvaluator, RuleMatch, Verdict, VerdictType, NOT_PROVABLE_REASONS,
};
pub use explain::{
    build_prompt, Explainer, ExplanationInput, ExplanationSandbox, TemplateExplainer,
};
pub use extractor::{Detector, FactExtractor, Signal};
pub use gate::{find_forbidden_word, GateResult, SafetyGate, FORBIDDEN_WORDS};
pub use pipeline::{Analysis, AuditTrail, Pipeline};
pub use refusal::{Refusal, RefusalCode};
pub use schema::{FactEntry, FactKind, FactSchema, FactSet, FactSpec, FactValue};
