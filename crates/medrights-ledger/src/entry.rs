//! Audit entry - one record per query
//!
//! Entries are created once and only ever appended; nothing in the ledger
//! updates or deletes them.

use chrono::{DateTime, Utc};
use medrights_core::{Analysis, AuditTrail, Refusal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a query ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A verdict was produced
    Analysis,
    /// The safety gate refused the query
    Refusal,
}

impl EventType {
    /// Returns the string representation of the event type
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "ANALYSIS",
            Self::Refusal => "REFUSAL",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANALYSIS" => Ok(Self::Analysis),
            "REFUSAL" => Ok(Self::Refusal),
            _ => Err(format!("unknown event type: {s}")),
        }
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id, also the query id of its trail
    pub id: Uuid,
    /// When the query finished
    pub timestamp: DateTime<Utc>,
    /// Outcome
    pub event_type: EventType,
    /// Text as submitted
    pub raw_text: String,
    /// Extracted or admitted facts
    pub facts: Option<serde_json::Value>,
    /// Verdict as returned
    pub verdict: Option<serde_json::Value>,
    /// Refusal reason (`CODE: detail`)
    pub refusal: Option<String>,
    /// What was used and checked
    pub trail: serde_json::Value,
    /// Catalog version the query ran against
    pub system_version: String,
}

impl AuditEntry {
    /// Entry for a completed analysis
    #[must_use]
    pub fn analysis(
        raw_text: impl Into<String>,
        analysis: &Analysis,
        system_version: impl Into<String>,
    ) -> Self {
        let id = Uuid::new_v4();
        let trail = analysis.audit_trail(id.to_string());
        Self {
            id,
            timestamp: Utc::now(),
            event_type: EventType::Analysis,
            raw_text: raw_text.into(),
            facts: Some(analysis.facts.to_json()),
            verdict: Some(analysis.verdict.to_json()),
            refusal: None,
            trail: trail_json(&trail),
            system_version: system_version.into(),
        }
    }

    /// Entry for a refused query
    #[must_use]
    pub fn refusal(
        raw_text: impl Into<String>,
        refusal: &Refusal,
        system_version: impl Into<String>,
    ) -> Self {
        let id = Uuid::new_v4();
        let trail = AuditTrail::refused(id.to_string(), refusal);
        Self {
            id,
            timestamp: Utc::now(),
            event_type: EventType::Refusal,
            raw_text: raw_text.into(),
            facts: None,
            verdict: None,
            refusal: Some(refusal.reason()),
            trail: trail_json(&trail),
            system_version: system_version.into(),
        }
    }

    /// Verdict type recorded in the entry, if any
    #[must_use]
    pub fn verdict_type(&self) -> Option<&str> {
        self.verdict.as_ref()?.get("verdict_type")?.as_str()
    }
}

fn trail_json(trail: &AuditTrail) -> serde_json::Value {
    serde_json::to_value(trail).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrights_core::Pipeline;

    #[test]
    fn test_analysis_entry() {
        let pipeline = Pipeline::standard().unwrap();
        let text = "doctor refused to admit during an emergency";
        let analysis = pipeline.analyze(text).unwrap();

        let entry = AuditEntry::analysis(text, &analysis, "2024.2");
        assert_eq!(entry.event_type, EventType::Analysis);
        assert_eq!(entry.verdict_type(), Some("PROVABLE"));
        assert_eq!(entry.trail["query_id"], entry.id.to_string());
        assert_eq!(entry.facts.as_ref().unwrap()["admission_denied"], "yes");
        assert!(entry.refusal.is_none());
    }

    #[test]
    fn test_refusal_entry() {
        let refusal = Refusal::unknown_field("patient_mood");
        let entry = AuditEntry::refusal("{}", &refusal, "2024.2");
        assert_eq!(entry.event_type, EventType::Refusal);
        assert_eq!(entry.refusal.as_deref(), Some("UNKNOWN_FIELD: patient_mood"));
        assert!(entry.verdict_type().is_none());
        assert_eq!(entry.trail["refusal"], "UNKNOWN_FIELD: patient_mood");
    }

    #[test]
    fn test_event_type_round_trip() {
        for event_type in [EventType::Analysis, EventType::Refusal] {
            assert_eq!(event_type.as_str().parse::<EventType>().unwrap(), event_type);
        }
        assert!("OTHER".parse::<EventType>().is_err());
    }
}
