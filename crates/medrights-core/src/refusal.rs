//! Refusal - the core's sole fail-closed signal
//!
//! A refusal is raised by the safety gate (or the explanation sandbox) and
//! propagates unchanged to the caller. Nothing inside extraction or
//! evaluation catches, retries, or downgrades it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason code carried by every refusal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefusalCode {
    /// A schema-required field is absent from the input record
    MissingRequiredField,
    /// The input record contains a field the schema does not declare
    UnknownField,
    /// An emitted string contains a forbidden legal-conclusion term
    ForbiddenWordDetected,
    /// An explanation was requested for a verdict that is not PROVABLE
    ExplanationNotAllowed,
    /// A fact is null rather than an explicit value
    MissingLegalFacts,
    /// A fact value is outside `yes | no | unknown`, or has the wrong shape
    InvalidFactValue,
}

impl RefusalCode {
    /// Returns the wire representation of the code
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::ForbiddenWordDetected => "FORBIDDEN_WORD_DETECTED",
            Self::ExplanationNotAllowed => "EXPLANATION_NOT_ALLOWED",
            Self::MissingLegalFacts => "MISSING_LEGAL_FACTS",
            Self::InvalidFactValue => "INVALID_FACT_VALUE",
        }
    }
}

impl std::fmt::Display for RefusalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RefusalCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MISSING_REQUIRED_FIELD" => Ok(Self::MissingRequiredField),
            "UNKNOWN_FIELD" => Ok(Self::UnknownField),
            "FORBIDDEN_WORD_DETECTED" => Ok(Self::ForbiddenWordDetected),
            "EXPLANATION_NOT_ALLOWED" => Ok(Self::ExplanationNotAllowed),
            "MISSING_LEGAL_FACTS" => Ok(Self::MissingLegalFacts),
            "INVALID_FACT_VALUE" => Ok(Self::InvalidFactValue),
            _ => Err(format!("unknown refusal code: {s}")),
        }
    }
}

/// Terminal refusal raised by the safety gate
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {detail}")]
pub struct Refusal {
    /// Reason code
    pub code: RefusalCode,
    /// The offending key, word, or verdict type
    pub detail: String,
}

impl Refusal {
    /// Create a refusal with the given code and detail
    #[must_use]
    pub fn new(code: RefusalCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// A schema-required field is missing
    #[must_use]
    pub fn missing_field(key: impl Into<String>) -> Self {
        Self::new(RefusalCode::MissingRequiredField, key)
    }

    /// A field outside the schema was supplied
    #[must_use]
    pub fn unknown_field(key: impl Into<String>) -> Self {
        Self::new(RefusalCode::UnknownField, key)
    }

    /// A forbidden word appeared in emitted text
    #[must_use]
    pub fn forbidden_word(word: impl Into<String>) -> Self {
        Self::new(RefusalCode::ForbiddenWordDetected, word)
    }

    /// A fact was null
    #[must_use]
    pub fn missing_fact(key: impl Into<String>) -> Self {
        Self::new(RefusalCode::MissingLegalFacts, key)
    }

    /// A fact had an unrecognized value or shape
    #[must_use]
    pub fn invalid_value(key: impl Into<String>) -> Self {
        Self::new(RefusalCode::InvalidFactValue, key)
    }

    /// The reason string as logged by callers (`CODE: detail`)
    #[must_use]
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_detail() {
        let refusal = Refusal::missing_field("emergency_case");
        assert_eq!(
            refusal.to_string(),
            "MISSING_REQUIRED_FIELD: emergency_case"
        );
        assert_eq!(refusal.reason(), refusal.to_string());
    }

    #[test]
    fn test_code_round_trip_through_str() {
        for code in [
            RefusalCode::MissingRequiredField,
            RefusalCode::UnknownField,
            RefusalCode::ForbiddenWordDetected,
            RefusalCode::ExplanationNotAllowed,
            RefusalCode::MissingLegalFacts,
            RefusalCode::InvalidFactValue,
        ] {
            assert_eq!(code.as_str().parse::<RefusalCode>().unwrap(), code);
        }
        assert!("SOMETHING_ELSE".parse::<RefusalCode>().is_err());
    }

    #[test]
    fn test_serializes_screaming_snake_case() {
        let refusal = Refusal::unknown_field("extra");
        let json = serde_json::to_value(&refusal).unwrap();
        assert_eq!(json["code"], "UNKNOWN_FIELD");
        assert_eq!(json["detail"], "extra");
    }
}
