//! Safety Gate
//!
//! One gate object, invoked at two fixed checkpoints:
//! - after extraction (or on admission of an external fact record): every
//!   schema key present, nothing undeclared, nothing null, every value valid
//! - before output: no forbidden legal-conclusion vocabulary in any emitted
//!   string
//!
//! Every check fails closed. A failure is a [`Refusal`], logged once here and
//! returned unchanged to the caller.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::evaluator::Verdict;
use crate::refusal::Refusal;
use crate::schema::{FactKind, FactSchema, FactSet, FactValue};

/// Terms that must never reach a caller.
///
/// Matched case-insensitively as substrings. Longer terms precede the terms
/// they contain so the reported word is the most specific one.
pub const FORBIDDEN_WORDS: &[&str] = &[
    "illegal",
    "legal",
    "allowed",
    "permitted",
    "valid",
    "compliant",
    "should",
    "cannot",
    "can",
];

/// Result of a gate check
pub type GateResult<T> = std::result::Result<T, Refusal>;

/// First forbidden term contained in `text`, if any
#[must_use]
pub fn find_forbidden_word(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    FORBIDDEN_WORDS.iter().copied().find(|w| lowered.contains(w))
}

fn refuse(refusal: Refusal) -> Refusal {
    warn!(code = %refusal.code, detail = %refusal.detail, "Safety gate refused");
    refusal
}

/// Validates fact records and emitted text against fixed invariants
#[derive(Debug, Clone, Default)]
pub struct SafetyGate {
    schema: FactSchema,
}

impl SafetyGate {
    /// Gate over the given schema
    #[must_use]
    pub fn new(schema: FactSchema) -> Self {
        Self { schema }
    }

    /// The schema records are admitted against
    #[must_use]
    pub fn schema(&self) -> &FactSchema {
        &self.schema
    }

    /// Admit an externally supplied fact record.
    ///
    /// Checks run in a fixed order over the whole record: missing keys, then
    /// undeclared keys, then nulls, then value shape. The first failure wins.
    pub fn admit_record(&self, record: &Value) -> GateResult<FactSet> {
        let Some(object) = record.as_object() else {
            return Err(refuse(Refusal::invalid_value("<record>")));
        };

        self.check_missing(object).map_err(refuse)?;
        self.check_unknown(object).map_err(refuse)?;
        self.check_nulls(object).map_err(refuse)?;

        let mut facts = self.schema.defaults();
        for spec in self.schema.specs() {
            let value = object.get(spec.key).unwrap_or(&Value::Null);
            match &spec.kind {
                FactKind::Flag { .. } => {
                    let parsed = parse_value(value)
                        .ok_or_else(|| refuse(Refusal::invalid_value(spec.key)))?;
                    facts.set(spec.key, parsed);
                }
                FactKind::Group { members, exclusive } => {
                    let Some(group) = value.as_object() else {
                        return Err(refuse(Refusal::invalid_value(spec.key)));
                    };
                    let mut labels = 0;
                    for (sub, _) in members {
                        let path = format!("{}.{}", spec.key, sub);
                        let parsed = group
                            .get(*sub)
                            .and_then(parse_value)
                            .ok_or_else(|| refuse(Refusal::invalid_value(path.as_str())))?;
                        if parsed.is_yes() {
                            labels += 1;
                        }
                        facts.set(&path, parsed);
                    }
                    if *exclusive && labels > 1 {
                        return Err(refuse(Refusal::invalid_value(spec.key)));
                    }
                }
            }
        }

        debug!(facts = self.schema.leaf_count(), "Fact record admitted");
        Ok(facts)
    }

    fn check_missing(&self, object: &Map<String, Value>) -> GateResult<()> {
        for spec in self.schema.specs() {
            let Some(value) = object.get(spec.key) else {
                return Err(Refusal::missing_field(spec.key));
            };
            if let (FactKind::Group { members, .. }, Some(group)) = (&spec.kind, value.as_object()) {
                for (sub, _) in members {
                    if !group.contains_key(*sub) {
                        return Err(Refusal::missing_field(format!("{}.{}", spec.key, sub)));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_unknown(&self, object: &Map<String, Value>) -> GateResult<()> {
        for (key, value) in object {
            let Some(spec) = self.schema.get(key) else {
                return Err(Refusal::unknown_field(key.as_str()));
            };
            if let (FactKind::Group { members, .. }, Some(group)) = (&spec.kind, value.as_object()) {
                for sub in group.keys() {
                    if !members.iter().any(|(name, _)| *name == sub.as_str()) {
                        return Err(Refusal::unknown_field(format!("{key}.{sub}")));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_nulls(&self, object: &Map<String, Value>) -> GateResult<()> {
        for spec in self.schema.specs() {
            match object.get(spec.key) {
                Some(Value::Null) => return Err(Refusal::missing_fact(spec.key)),
                Some(Value::Object(group)) => {
                    for (sub, value) in group {
                        if value.is_null() {
                            return Err(Refusal::missing_fact(format!("{}.{}", spec.key, sub)));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Re-assert that an extracted fact set is total over the schema
    pub fn check_facts(&self, facts: &FactSet) -> GateResult<()> {
        for path in self.schema.paths() {
            if facts.get(&path).is_none() {
                return Err(refuse(Refusal::missing_field(path)));
            }
        }
        for (path, _) in facts.leaves() {
            if !self.schema.contains_path(&path) {
                return Err(refuse(Refusal::unknown_field(path)));
            }
        }
        for spec in self.schema.specs() {
            if let FactKind::Group {
                members,
                exclusive: true,
            } = &spec.kind
            {
                let labels = members
                    .iter()
                    .filter(|(sub, _)| facts.is_yes(&format!("{}.{}", spec.key, sub)))
                    .count();
                if labels > 1 {
                    return Err(refuse(Refusal::invalid_value(spec.key)));
                }
            }
        }
        Ok(())
    }

    /// Forbidden-vocabulary check over every string a verdict emits
    pub fn check_verdict(&self, verdict: &Verdict) -> GateResult<()> {
        for text in verdict.emitted_text() {
            self.check_text(text)?;
        }
        Ok(())
    }

    /// Forbidden-vocabulary check for any other emitted text
    pub fn check_text(&self, text: &str) -> GateResult<()> {
        match find_forbidden_word(text) {
            Some(word) => Err(refuse(Refusal::forbidden_word(word))),
            None => Ok(()),
        }
    }
}

fn parse_value(value: &Value) -> Option<FactValue> {
    value.as_str()?.parse().ok()
}

#[cfg(test)]
mod tests;
