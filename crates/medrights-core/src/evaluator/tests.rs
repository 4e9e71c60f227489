    use super::*;
    use crate::schema::{FactSchema, FactValue};

    fn evaluator() -> RuleEvaluator {
        RuleEvaluator::new(Arc::new(RuleCatalog::standard().unwrap()))
    }

    fn facts_with(yes: &[&str]) -> FactSet {
        let mut facts = FactSchema::standard().defaults();
        for path in yes {
            assert!(facts.set(path, FactValue::Yes), "{path}");
        }
        facts
    }

    #[test]
    fn test_defaults_are_not_provable() {
        let verdict = evaluator().evaluate(&facts_with(&[]));
        assert_eq!(verdict.verdict_type(), VerdictType::NotProvable);
        assert!(verdict.matched_ids().is_empty());
        assert_eq!(verdict.reasons().len(), NOT_PROVABLE_REASONS.len());
        assert!(!verdict.reasons().is_empty());
    }

    #[test]
    fn test_emergency_refusal_is_provable() {
        let facts = facts_with(&["doctor_involved", "emergency_claimed", "treatment_refused"]);
        let verdict = evaluator().evaluate(&facts);
        assert_eq!(verdict.verdict_type(), VerdictType::Provable);
        assert_eq!(
            verdict.primary_violations()[0].id,
            "RIGHT_TO_EMERGENCY_MEDICAL_CARE"
        );
        assert!(verdict
            .imc_duties()
            .iter()
            .any(|d| d.id == "DUTY_TO_ATTEND_EMERGENCY"));
        assert!(verdict.reasons().is_empty());
    }

    #[test]
    fn test_duty_only_is_provable() {
        let facts = facts_with(&["doctor_involved", "doctor_under_influence"]);
        let verdict = evaluator().evaluate(&facts);
        assert_eq!(verdict.verdict_type(), VerdictType::Provable);
        assert!(verdict.primary_violations().is_empty());
        assert_eq!(verdict.imc_duties().len(), 1);
        assert_eq!(verdict.imc_duties()[0].id, "DUTY_NOT_TO_PRACTICE_UNDER_INFLUENCE");
    }

    #[test]
    fn test_procedural_only() {
        let facts = facts_with(&["doctor_involved", "abuse_claimed"]);
        let verdict = evaluator().evaluate(&facts);
        assert_eq!(verdict.verdict_type(), VerdictType::Procedural);
        assert_eq!(
            verdict.matched_ids(),
            vec!["PROFESSIONAL_MISCONDUCT_BY_DOCTOR", "RIGHT_TO_GRIEVANCE_REDRESSAL"]
        );
        assert!(verdict.reasons().is_empty());
    }

    #[test]
    fn test_abuse_without_doctor_is_not_misconduct() {
        let verdict = evaluator().evaluate(&facts_with(&["abuse_claimed"]));
        assert_eq!(verdict.verdict_type(), VerdictType::NotProvable);
    }

    #[test]
    fn test_duty_with_several_paths_appears_once() {
        let facts = facts_with(&[
            "consent_issue",
            "procedure_performed",
            "risks_not_explained",
            "consent_form_forced",
        ]);
        let verdict = evaluator().evaluate(&facts);
        let consent_duties = verdict
            .imc_duties()
            .iter()
            .filter(|d| d.id == "DUTY_TO_OBTAIN_INFORMED_CONSENT")
            .count();
        assert_eq!(consent_duties, 1);
    }

    #[test]
    fn test_duplicate_duty_entries_collapse() {
        let toml = r#"
[meta]
version = "dup"
title = "Duplicated duty"

[[rules]]
id = "DUTY_OF_CONFIDENTIALITY"
source = "ETHICS_CODE"
category = "DUTY"
citation = "Clause 2.2"
explanation = ["First copy."]

[[rules.when]]
all = ["privacy_breached"]

[[rules]]
id = "DUTY_OF_CONFIDENTIALITY"
source = "ETHICS_CODE"
category = "DUTY"
citation = "Clause 2.2"
explanation = ["Second copy."]

[[rules.when]]
all = ["doctor_involved"]
"#;
        let catalog: RuleCatalog = toml::from_str(toml).unwrap();
        let evaluator = RuleEvaluator::new(Arc::new(catalog));
        let (verdict, trace) =
            evaluator.evaluate_with_trace(&facts_with(&["privacy_breached", "doctor_involved"]));

        assert_eq!(verdict.imc_duties().len(), 1);
        assert_eq!(verdict.imc_duties()[0].explanation, vec!["First copy."]);
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.rules_evaluated.len(), 2);
    }

    #[test]
    fn test_trace_records_first_satisfied_path() {
        let facts = facts_with(&["emergency_case", "emergency_claimed", "admission_denied"]);
        let (verdict, trace) = evaluator().evaluate_with_trace(&facts);
        assert!(verdict.is_provable());

        let step = trace
            .steps
            .iter()
            .find(|s| s.rule_id == "RIGHT_TO_EMERGENCY_MEDICAL_CARE")
            .unwrap();
        assert_eq!(step.category, RuleCategory::PrimaryViolation);
        assert_eq!(step.facts, vec!["emergency_case", "admission_denied"]);
        assert_eq!(
            trace.facts_used,
            vec!["admission_denied", "emergency_case", "emergency_claimed"]
        );
        assert_eq!(trace.rule_ids(), vec!["RIGHT_TO_EMERGENCY_MEDICAL_CARE"]);
    }

    #[test]
    fn test_matches_keep_catalog_order() {
        let facts = facts_with(&["privacy_breached", "records_issue.requested", "records_issue.denied"]);
        let verdict = evaluator().evaluate(&facts);
        let ids: Vec<&str> = verdict.primary_violations().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["RIGHT_TO_RECORDS_AND_REPORTS", "RIGHT_TO_PRIVACY_AND_CONFIDENTIALITY"]
        );
    }

    #[test]
    fn test_json_shape() {
        let provable = evaluator().evaluate(&facts_with(&["overcharged"])).to_json();
        assert_eq!(provable["verdict_type"], "PROVABLE");
        assert_eq!(provable["primary_violations"][0]["source"], "CHARTER");
        assert!(provable["imc_duties"].as_array().unwrap().is_empty());
        assert!(provable.get("reasons").is_none());

        let neutral = evaluator().evaluate(&facts_with(&[])).to_json();
        assert_eq!(neutral["verdict_type"], "NOT_PROVABLE");
        assert_eq!(neutral["reasons"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_emitted_text_covers_every_string() {
        let verdict = evaluator().evaluate(&facts_with(&["referral_commission"]));
        let text = verdict.emitted_text();
        assert!(text.contains(&"PROVABLE"));
        assert!(text.contains(&"DUTY_NOT_TO_ACCEPT_REFERRAL_COMMISSION"));
        assert!(text.contains(&"Charter of Patients' Rights (NHRC, 2019), Clause 12"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = evaluator();
        let facts = facts_with(&["doctor_involved", "mistreatment_claimed", "billing_issue"]);
        let first = serde_json::to_string(&evaluator.evaluate(&facts)).unwrap();
        let second = serde_json::to_string(&evaluator.evaluate(&facts)).unwrap();
        assert_eq!(first, second);
    }
