//! Fact Schema - the closed vocabulary shared by extraction and evaluation
//!
//! A schema is an explicit value: the extractor builds its fact sets from it,
//! the catalog validates rule predicates against it, and the safety gate
//! admits external records against it. Nested groups are addressed with
//! dotted paths (`records_issue.denied`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};

/// Value of a single fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactValue {
    /// An explicit textual signal established the fact
    Yes,
    /// The fact is declared absent
    No,
    /// No signal either way
    Unknown,
}

impl FactValue {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        }
    }

    /// True only for an explicit `yes`
    #[must_use]
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl std::fmt::Display for FactValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FactValue {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("unknown fact value: {s}")),
        }
    }
}

/// Shape of a schema entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactKind {
    /// A single fact with its declared default
    Flag {
        /// Value when no detector fires
        default: FactValue,
    },
    /// A composite record of ordered sub-facts
    Group {
        /// Sub-keys with their defaults, in declaration order
        members: Vec<(&'static str, FactValue)>,
        /// At most one member may be `yes`
        exclusive: bool,
    },
}

/// One top-level entry of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSpec {
    /// Top-level key
    pub key: &'static str,
    /// Flag or group
    pub kind: FactKind,
}

impl FactSpec {
    /// A flat fact
    #[must_use]
    pub fn flag(key: &'static str, default: FactValue) -> Self {
        Self {
            key,
            kind: FactKind::Flag { default },
        }
    }

    /// A nested group whose members may be set independently
    #[must_use]
    pub fn group(key: &'static str, members: &[(&'static str, FactValue)]) -> Self {
        Self {
            key,
            kind: FactKind::Group {
                members: members.to_vec(),
                exclusive: false,
            },
        }
    }

    /// A nested group that carries a single label
    #[must_use]
    pub fn exclusive_group(key: &'static str, members: &[(&'static str, FactValue)]) -> Self {
        Self {
            key,
            kind: FactKind::Group {
                members: members.to_vec(),
                exclusive: true,
            },
        }
    }
}

/// The closed set of recognized fact keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSchema {
    specs: Vec<FactSpec>,
}

impl FactSchema {
    /// Build a schema, rejecting duplicate keys, dotted keys, and empty groups
    pub fn new(specs: Vec<FactSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.key.is_empty() || spec.key.contains('.') {
                return Err(Error::Schema(format!("invalid fact key '{}'", spec.key)));
            }
            if !seen.insert(spec.key) {
                return Err(Error::Schema(format!("duplicate fact key '{}'", spec.key)));
            }
            if let FactKind::Group { members, .. } = &spec.kind {
                if members.is_empty() {
                    return Err(Error::Schema(format!("group '{}' has no members", spec.key)));
                }
                let mut sub_seen = HashSet::new();
                for (sub, _) in members {
                    if sub.is_empty() || sub.contains('.') || !sub_seen.insert(*sub) {
                        return Err(Error::Schema(format!(
                            "invalid or duplicate member '{}' in group '{}'",
                            sub, spec.key
                        )));
                    }
                }
            }
        }
        Ok(Self { specs })
    }

    /// The built-in schema for charter and ethics-code disputes
    #[must_use]
    pub fn standard() -> Self {
        use FactValue::{No, Unknown};

        let specs = vec![
            // Actors
            FactSpec::flag("doctor_involved", Unknown),
            FactSpec::flag("hospital_involved", Unknown),
            FactSpec::flag("staff_involved", Unknown),
            // Emergency
            FactSpec::flag("emergency_claimed", No),
            FactSpec::flag("emergency_case", Unknown),
            FactSpec::flag("treatment_refused", No),
            FactSpec::flag("admission_denied", Unknown),
            FactSpec::flag("payment_demanded", No),
            FactSpec::flag("treatment_delayed", No),
            FactSpec::flag("ambulance_refused", No),
            // Consent
            FactSpec::flag("consent_issue", Unknown),
            FactSpec::flag("procedure_performed", No),
            FactSpec::flag("risks_not_explained", No),
            FactSpec::flag("consent_form_forced", No),
            // Records
            FactSpec::group(
                "records_issue",
                &[
                    ("requested", Unknown),
                    ("denied", Unknown),
                    ("by_doctor", Unknown),
                    ("by_hospital", Unknown),
                ],
            ),
            // Information
            FactSpec::flag("diagnosis_not_explained", No),
            FactSpec::flag("cost_estimate_withheld", No),
            // Privacy and dignity
            FactSpec::flag("privacy_breached", Unknown),
            FactSpec::flag("dignity_violated", No),
            FactSpec::flag("second_opinion_denied", Unknown),
            // Billing
            FactSpec::flag("billing_issue", Unknown),
            FactSpec::flag("overcharged", No),
            FactSpec::flag("rates_not_displayed", No),
            // Discrimination
            FactSpec::flag("discrimination_claimed", Unknown),
            FactSpec::exclusive_group(
                "discrimination_basis",
                &[
                    ("religion", No),
                    ("caste", No),
                    ("gender", No),
                    ("age", No),
                    ("economic_status", No),
                    ("illness", No),
                    ("disability", No),
                ],
            ),
            // Choice of pharmacy and diagnostics
            FactSpec::flag("pharmacy_forced", No),
            FactSpec::flag("lab_forced", No),
            // Referral and transfer
            FactSpec::flag("transfer_refused", No),
            FactSpec::flag("referral_commission", No),
            // Discharge
            FactSpec::flag("discharge_refused", No),
            FactSpec::flag("body_withheld", No),
            // Research
            FactSpec::flag("trial_without_consent", No),
            // Grievance
            FactSpec::flag("grievance_ignored", No),
            // Quality and safety
            FactSpec::flag("negligence_claimed", No),
            FactSpec::flag("unhygienic_conditions", No),
            FactSpec::flag("patient_abandoned", No),
            // Doctor conduct
            FactSpec::flag("doctor_under_influence", No),
            FactSpec::flag("prescription_illegible", No),
            FactSpec::flag("brand_name_forced", No),
            FactSpec::flag("registration_not_displayed", No),
            FactSpec::flag("false_certificate", No),
            // Procedural remedy claims
            FactSpec::flag("mistreatment_claimed", No),
            FactSpec::flag("abuse_claimed", No),
            FactSpec::flag("unethical_behavior_claimed", No),
        ];

        Self { specs }
    }

    /// Top-level entries in declaration order
    #[must_use]
    pub fn specs(&self) -> &[FactSpec] {
        &self.specs
    }

    /// Find a top-level entry
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FactSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Every leaf path in declaration order (`key` or `group.member`)
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for spec in &self.specs {
            match &spec.kind {
                FactKind::Flag { .. } => paths.push(spec.key.to_string()),
                FactKind::Group { members, .. } => {
                    for (sub, _) in members {
                        paths.push(format!("{}.{}", spec.key, sub));
                    }
                }
            }
        }
        paths
    }

    /// Number of leaf facts
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.specs
            .iter()
            .map(|s| match &s.kind {
                FactKind::Flag { .. } => 1,
                FactKind::Group { members, .. } => members.len(),
            })
            .sum()
    }

    /// Whether a leaf path is declared
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        self.default_of(path).is_some()
    }

    /// Declared default of a leaf path
    #[must_use]
    pub fn default_of(&self, path: &str) -> Option<FactValue> {
        let (key, sub) = split_path(path);
        let spec = self.get(key)?;
        match (&spec.kind, sub) {
            (FactKind::Flag { default }, None) => Some(*default),
            (FactKind::Group { members, .. }, Some(sub)) => members
                .iter()
                .find(|(name, _)| *name == sub)
                .map(|(_, default)| *default),
            _ => None,
        }
    }

    /// Whether a group key is declared exclusive
    #[must_use]
    pub fn is_exclusive_group(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|s| &s.kind),
            Some(FactKind::Group {
                exclusive: true,
                ..
            })
        )
    }

    /// A total fact set holding every declared default
    #[must_use]
    pub fn defaults(&self) -> FactSet {
        let mut entries = BTreeMap::new();
        for spec in &self.specs {
            let entry = match &spec.kind {
                FactKind::Flag { default } => FactEntry::Value(*default),
                FactKind::Group { members, .. } => FactEntry::Group(
                    members
                        .iter()
                        .map(|(sub, default)| ((*sub).to_string(), *default))
                        .collect(),
                ),
            };
            entries.insert(spec.key.to_string(), entry);
        }
        FactSet { entries }
    }
}

impl Default for FactSchema {
    fn default() -> Self {
        Self::standard()
    }
}

/// Split `group.member` into its parts; a flat key has no member
#[must_use]
pub fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((key, sub)) => (key, Some(sub)),
        None => (path, None),
    }
}

/// A top-level fact-set entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactEntry {
    /// Flat fact
    Value(FactValue),
    /// Nested group
    Group(BTreeMap<String, FactValue>),
}

/// Complete structured representation of a case
///
/// Totality holds by construction: fact sets are only created from a
/// schema's defaults and then refined. Nothing outside the crate can mutate
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FactSet {
    entries: BTreeMap<String, FactEntry>,
}

impl FactSet {
    /// Value at a leaf path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<FactValue> {
        let (key, sub) = split_path(path);
        match (self.entries.get(key)?, sub) {
            (FactEntry::Value(value), None) => Some(*value),
            (FactEntry::Group(members), Some(sub)) => members.get(sub).copied(),
            _ => None,
        }
    }

    /// True only when the path exists and is `yes`
    #[must_use]
    pub fn is_yes(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| v.is_yes())
    }

    /// Top-level entries in sorted key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FactEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every leaf path with its value, sorted
    #[must_use]
    pub fn leaves(&self) -> Vec<(String, FactValue)> {
        let mut leaves = Vec::new();
        for (key, entry) in &self.entries {
            match entry {
                FactEntry::Value(value) => leaves.push((key.clone(), *value)),
                FactEntry::Group(members) => {
                    for (sub, value) in members {
                        leaves.push((format!("{key}.{sub}"), *value));
                    }
                }
            }
        }
        leaves
    }

    /// Leaf paths whose value is `yes`, sorted
    #[must_use]
    pub fn yes_paths(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .filter(|(_, v)| v.is_yes())
            .map(|(path, _)| path)
            .collect()
    }

    /// Number of top-level entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON form with nested groups
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Overwrite an existing leaf; returns false when the path is absent
    pub(crate) fn set(&mut self, path: &str, value: FactValue) -> bool {
        let (key, sub) = split_path(path);
        match (self.entries.get_mut(key), sub) {
            (Some(FactEntry::Value(slot)), None) => {
                *slot = value;
                true
            }
            (Some(FactEntry::Group(members)), Some(sub)) => match members.get_mut(sub) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}
