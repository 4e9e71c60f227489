//! Plain-text rendering
//!
//! Every string produced here is checked by the safety gate before the CLI
//! prints it.

use medrights_core::{Analysis, RuleCatalog, RuleMatch, VerdictType};
use std::fmt::Write;

/// Human-readable form of an analysis
pub fn analysis(analysis: &Analysis) -> String {
    let verdict = &analysis.verdict;
    let mut out = String::new();
    let _ = writeln!(out, "Verdict: {}", verdict.verdict_type());

    section(&mut out, "Patient rights (Charter)", verdict.primary_violations());
    section(
        &mut out,
        "Professional duties (IMC regulations)",
        verdict.imc_duties(),
    );
    section(&mut out, "Procedural remedies", verdict.procedural_remedies());

    if verdict.verdict_type() == VerdictType::NotProvable {
        out.push_str("\nReasons:\n");
        for reason in verdict.reasons() {
            let _ = writeln!(out, "  - {reason}");
        }
    }

    if !analysis.trace.facts_used.is_empty() {
        let _ = writeln!(out, "\nFacts found: {}", analysis.trace.facts_used.join(", "));
    }
    out
}

fn section(out: &mut String, title: &str, matches: &[RuleMatch]) {
    if matches.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}:");
    for m in matches {
        let _ = writeln!(out, "  {} [{}] {}", m.id, m.source, m.citation);
        for line in &m.explanation {
            let _ = writeln!(out, "      {line}");
        }
    }
}

/// Catalog listing: one row per rule
pub fn catalog(catalog: &RuleCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (version {}, {} rules)\n",
        catalog.meta.title,
        catalog.version(),
        catalog.len()
    );
    let _ = writeln!(
        out,
        "{:<48} {:<18} {:<12} CITATION",
        "ID", "CATEGORY", "SOURCE"
    );
    for rule in catalog.rules() {
        let _ = writeln!(
            out,
            "{:<48} {:<18} {:<12} {}",
            rule.id,
            rule.category.as_str(),
            rule.source.as_str(),
            rule.citation
        );
    }
    out
}
