    use super::*;
    use crate::refusal::RefusalCode;
    use serde_json::json;

    fn gate() -> SafetyGate {
        SafetyGate::new(FactSchema::standard())
    }

    fn valid_record() -> Value {
        FactSchema::standard().defaults().to_json()
    }

    #[test]
    fn test_admits_complete_record() {
        let mut record = valid_record();
        record["emergency_case"] = json!("yes");
        record["records_issue"]["denied"] = json!("no");

        let facts = gate().admit_record(&record).unwrap();
        assert!(facts.is_yes("emergency_case"));
        assert_eq!(facts.get("records_issue.denied"), Some(FactValue::No));
        assert_eq!(facts.leaves().len(), 53);
    }

    #[test]
    fn test_missing_key_refuses() {
        let mut record = valid_record();
        record.as_object_mut().unwrap().remove("emergency_case");

        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::MissingRequiredField);
        assert_eq!(refusal.detail, "emergency_case");
    }

    #[test]
    fn test_missing_group_member_names_the_path() {
        let mut record = valid_record();
        record["records_issue"].as_object_mut().unwrap().remove("denied");

        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::MissingRequiredField);
        assert_eq!(refusal.detail, "records_issue.denied");
    }

    #[test]
    fn test_unknown_key_refuses() {
        let mut record = valid_record();
        record["favourite_colour"] = json!("no");

        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::UnknownField);
        assert_eq!(refusal.detail, "favourite_colour");
    }

    #[test]
    fn test_unknown_group_member_refuses() {
        let mut record = valid_record();
        record["records_issue"]["shredded"] = json!("yes");

        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::UnknownField);
        assert_eq!(refusal.detail, "records_issue.shredded");
    }

    #[test]
    fn test_missing_is_checked_before_unknown() {
        let mut record = valid_record();
        record.as_object_mut().unwrap().remove("doctor_involved");
        record["extra"] = json!("yes");

        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::MissingRequiredField);
    }

    #[test]
    fn test_null_refuses_as_missing_facts() {
        let mut record = valid_record();
        record["privacy_breached"] = Value::Null;
        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::MissingLegalFacts);
        assert_eq!(refusal.detail, "privacy_breached");

        let mut record = valid_record();
        record["records_issue"]["requested"] = Value::Null;
        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::MissingLegalFacts);
        assert_eq!(refusal.detail, "records_issue.requested");
    }

    #[test]
    fn test_invalid_values_refuse() {
        let cases = [
            ("emergency_case", json!("maybe")),
            ("emergency_case", json!(true)),
            ("emergency_case", json!({"nested": "yes"})),
            ("records_issue", json!("yes")),
        ];
        for (key, value) in cases {
            let mut record = valid_record();
            record[key] = value;
            let refusal = gate().admit_record(&record).unwrap_err();
            assert_eq!(refusal.code, RefusalCode::InvalidFactValue, "{key}");
            assert_eq!(refusal.detail, key);
        }
    }

    #[test]
    fn test_exclusive_group_accepts_one_label() {
        let mut record = valid_record();
        record["discrimination_basis"]["caste"] = json!("yes");
        assert!(gate().admit_record(&record).is_ok());

        record["discrimination_basis"]["gender"] = json!("yes");
        let refusal = gate().admit_record(&record).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::InvalidFactValue);
        assert_eq!(refusal.detail, "discrimination_basis");
    }

    #[test]
    fn test_non_object_record_refuses() {
        let refusal = gate().admit_record(&json!(["yes"])).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::InvalidFactValue);
    }

    #[test]
    fn test_check_facts_accepts_schema_defaults() {
        let gate = gate();
        assert!(gate.check_facts(&gate.schema().defaults()).is_ok());
    }

    #[test]
    fn test_check_facts_rejects_foreign_schema() {
        let small = FactSchema::new(vec![crate::schema::FactSpec::flag(
            "doctor_involved",
            FactValue::Unknown,
        )])
        .unwrap();
        let refusal = gate().check_facts(&small.defaults()).unwrap_err();
        assert_eq!(refusal.code, RefusalCode::MissingRequiredField);

        let narrow_gate = SafetyGate::new(small);
        let refusal = narrow_gate
            .check_facts(&FactSchema::standard().defaults())
            .unwrap_err();
        assert_eq!(refusal.code, RefusalCode::UnknownField);
    }

    #[test]
    fn test_forbidden_words_are_substrings() {
        assert_eq!(find_forbidden_word("That is ILLEGAL"), Some("illegal"));
        assert_eq!(find_forbidden_word("You can appeal"), Some("can"));
        assert_eq!(find_forbidden_word("The scan was clear"), Some("can"));
        assert_eq!(find_forbidden_word("This cannot stand"), Some("cannot"));
        assert_eq!(find_forbidden_word("Records must be provided."), None);
    }

    #[test]
    fn test_check_text() {
        let gate = gate();
        assert!(gate.check_text("Emergency medical care must not be delayed.").is_ok());

        let refusal = gate.check_text("You should complain").unwrap_err();
        assert_eq!(refusal.code, RefusalCode::ForbiddenWordDetected);
        assert_eq!(refusal.detail, "should");
    }

    #[test]
    fn test_standard_verdicts_pass_output_check() {
        use crate::catalog::RuleCatalog;
        use crate::evaluator::RuleEvaluator;
        use std::sync::Arc;

        let gate = gate();
        let evaluator = RuleEvaluator::new(Arc::new(RuleCatalog::standard().unwrap()));

        let neutral = evaluator.evaluate(&gate.schema().defaults());
        assert!(gate.check_verdict(&neutral).is_ok());

        let mut facts = gate.schema().defaults();
        for path in gate.schema().paths() {
            if !path.starts_with("discrimination_basis.") {
                facts.set(&path, FactValue::Yes);
            }
        }
        let everything = evaluator.evaluate(&facts);
        assert_eq!(everything.matched_ids().len(), 25);
        assert!(gate.check_verdict(&everything).is_ok());
    }
