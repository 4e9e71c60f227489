//! Explanation sandbox
//!
//! Turns a `PROVABLE` verdict and its proof trace into plain text. The
//! generator is pluggable, but its output always passes the safety gate's
//! vocabulary check before it reaches a caller, and nothing is generated for
//! any other verdict type.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::evaluator::{ProofTrace, Verdict, VerdictType};
use crate::gate::SafetyGate;
use crate::refusal::{Refusal, RefusalCode};

/// What a generator is given to work with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplanationInput {
    /// Always `PROVABLE` once built through the sandbox
    pub verdict_status: VerdictType,
    /// Matched rule ids joined into one conclusion
    pub conclusion_symbol: String,
    /// One line per satisfied rule: `RULE_ID <- fact AND fact`
    pub proof_steps: Vec<String>,
}

impl ExplanationInput {
    /// Build from a verdict and the trace that produced it
    #[must_use]
    pub fn new(verdict: &Verdict, trace: &ProofTrace) -> Self {
        let proof_steps = trace
            .steps
            .iter()
            .map(|step| format!("{} <- {}", step.rule_id, step.facts.join(" AND ")))
            .collect();

        Self {
            verdict_status: verdict.verdict_type(),
            conclusion_symbol: verdict.matched_ids().join(" + "),
            proof_steps,
        }
    }
}

/// Instruction prompt for an external text generator. Internal only.
#[must_use]
pub fn build_prompt(input: &ExplanationInput) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are explaining a mechanically proven result.\n\n");
    prompt.push_str("CONCLUSION SYMBOL:\n");
    prompt.push_str(&input.conclusion_symbol);
    prompt.push_str("\n\nPROOF STEPS:\n");
    for step in &input.proof_steps {
        prompt.push_str("- ");
        prompt.push_str(step);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nSTRICT RULES:\n\
         - Do NOT infer legality, rights, or permissions\n\
         - Do NOT add conditions\n\
         - Do NOT use words like legal, illegal, allowed, permitted\n\
         - Explain only what was checked and found true\n",
    );
    prompt
}

/// Text generator behind the sandbox
pub trait Explainer: Send + Sync {
    /// Generator name, for logs
    fn name(&self) -> &str;

    /// Produce plain text from the input and its prompt
    fn generate(&self, input: &ExplanationInput, prompt: &str) -> Result<String>;
}

/// Deterministic generator that restates the proof
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExplainer;

impl Explainer for TemplateExplainer {
    fn name(&self) -> &str {
        "template"
    }

    fn generate(&self, input: &ExplanationInput, _prompt: &str) -> Result<String> {
        if input.proof_steps.is_empty() {
            return Err(Error::Explanation("no proof steps to restate".to_string()));
        }

        let mut text = format!("Finding: {}\n", input.conclusion_symbol);
        text.push_str("Checked and found true:\n");
        for step in &input.proof_steps {
            text.push_str("  - ");
            text.push_str(step);
            text.push('\n');
        }
        Ok(text)
    }
}

/// Gatekeeper around explanation generators
#[derive(Debug, Clone, Default)]
pub struct ExplanationSandbox {
    gate: SafetyGate,
}

impl ExplanationSandbox {
    /// Sandbox checking output with `gate`
    #[must_use]
    pub fn new(gate: SafetyGate) -> Self {
        Self { gate }
    }

    /// Explain a `PROVABLE` verdict; refuse anything else
    pub fn explain(
        &self,
        verdict: &Verdict,
        trace: &ProofTrace,
        explainer: &dyn Explainer,
    ) -> Result<String> {
        if !verdict.is_provable() {
            let refusal = Refusal::new(
                RefusalCode::ExplanationNotAllowed,
                verdict.verdict_type().as_str(),
            );
            warn!(code = %refusal.code, detail = %refusal.detail, "Explanation refused");
            return Err(refusal.into());
        }

        let input = ExplanationInput::new(verdict, trace);
        let prompt = build_prompt(&input);
        let text = explainer.generate(&input, &prompt)?;
        self.gate.check_text(&text)?;

        debug!(explainer = explainer.name(), chars = text.len(), "Explanation generated");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleCatalog;
    use crate::evaluator::RuleEvaluator;
    use crate::schema::{FactSchema, FactValue};
    use std::sync::Arc;

    struct Scripted(&'static str);

    impl Explainer for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate(&self, _input: &ExplanationInput, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn evaluate(yes: &[&str]) -> (Verdict, ProofTrace) {
        let mut facts = FactSchema::standard().defaults();
        for path in yes {
            facts.set(path, FactValue::Yes);
        }
        RuleEvaluator::new(Arc::new(RuleCatalog::standard().unwrap())).evaluate_with_trace(&facts)
    }

    #[test]
    fn test_template_explains_provable_verdict() {
        let (verdict, trace) = evaluate(&["emergency_case", "treatment_refused"]);
        let text = ExplanationSandbox::default()
            .explain(&verdict, &trace, &TemplateExplainer)
            .unwrap();
        assert!(text.contains("RIGHT_TO_EMERGENCY_MEDICAL_CARE <- emergency_case AND treatment_refused"));
    }

    #[test]
    fn test_refuses_non_provable_verdicts() {
        let cases: [&[&str]; 2] = [&[], &["doctor_involved", "abuse_claimed"]];
        for yes in cases {
            let (verdict, trace) = evaluate(yes);
            let err = ExplanationSandbox::default()
                .explain(&verdict, &trace, &TemplateExplainer)
                .unwrap_err();
            assert_eq!(
                err.as_refusal().map(|r| r.code),
                Some(RefusalCode::ExplanationNotAllowed)
            );
        }
    }

    #[test]
    fn test_generated_text_passes_the_gate() {
        let (verdict, trace) = evaluate(&["overcharged"]);
        let err = ExplanationSandbox::default()
            .explain(&verdict, &trace, &Scripted("You can sue the hospital."))
            .unwrap_err();
        assert_eq!(
            err.as_refusal().map(|r| r.code),
            Some(RefusalCode::ForbiddenWordDetected)
        );
    }

    #[test]
    fn test_prompt_lists_proof_steps() {
        let (verdict, trace) = evaluate(&["overcharged"]);
        let input = ExplanationInput::new(&verdict, &trace);
        assert_eq!(input.conclusion_symbol, "RIGHT_TO_TRANSPARENCY_IN_RATES");

        let prompt = build_prompt(&input);
        assert!(prompt.contains("- RIGHT_TO_TRANSPARENCY_IN_RATES <- overcharged"));
        assert!(prompt.contains("STRICT RULES"));
    }
}
