//! Query commands
//!
//! `medrights analyze [TEXT]`: verdict for a free-text account
//! `medrights evaluate --facts FILE`: verdict for a JSON fact record

use super::Context;
use crate::render;
use anyhow::{Context as _, Result};
use medrights_core::{Analysis, GateResult, SafetyGate, TemplateExplainer};
use medrights_ledger::AuditEntry;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

/// Exit code for a refused query
const REFUSED: u8 = 2;

/// Run `analyze`
pub async fn analyze(
    ctx: &Context,
    text: Option<String>,
    json: bool,
    explain: bool,
) -> Result<ExitCode> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let outcome = ctx.pipeline.analyze(&text);
    finish(ctx, &text, outcome, json, explain).await
}

/// Run `evaluate`
pub async fn evaluate(ctx: &Context, facts: &Path, json: bool) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(facts)
        .with_context(|| format!("Failed to read {}", facts.display()))?;
    let record: serde_json::Value =
        serde_json::from_str(&raw).context("Fact record is not valid JSON")?;

    let outcome = ctx.pipeline.evaluate_record(&record);
    finish(ctx, &raw, outcome, json, false).await
}

async fn finish(
    ctx: &Context,
    raw: &str,
    outcome: GateResult<Analysis>,
    json: bool,
    explain: bool,
) -> Result<ExitCode> {
    let checked = match outcome {
        Ok(analysis) => {
            output(ctx.pipeline.gate(), &analysis, json)?.map(|rendered| (analysis, rendered))
        }
        Err(refusal) => Err(refusal),
    };

    let (analysis, rendered) = match checked {
        Ok(checked) => checked,
        Err(refusal) => {
            ctx.record(AuditEntry::refusal(raw, &refusal, ctx.system_version()))
                .await;
            println!("REFUSED: {refusal}");
            return Ok(ExitCode::from(REFUSED));
        }
    };
    ctx.record(AuditEntry::analysis(raw, &analysis, ctx.system_version()))
        .await;
    println!("{rendered}");

    if explain {
        match ctx.pipeline.explain(&analysis, &TemplateExplainer) {
            Ok(text) => println!("\nExplanation:\n{text}"),
            Err(e) => match e.as_refusal() {
                Some(refusal) => {
                    println!("REFUSED: {refusal}");
                    return Ok(ExitCode::from(REFUSED));
                }
                None => return Err(e.into()),
            },
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Rendered analysis, or the refusal raised by the vocabulary check
fn output(gate: &SafetyGate, analysis: &Analysis, json: bool) -> Result<GateResult<String>> {
    let rendered = if json {
        serde_json::to_string_pretty(analysis)?
    } else {
        render::analysis(analysis)
    };
    Ok(gate.check_text(&rendered).map(|()| rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use medrights_ledger::{EventType, JsonlAuditLog};
    use tempfile::TempDir;

    const EMERGENCY: &str = "doctor refused to admit during an emergency";

    fn context(dir: &TempDir) -> Context {
        let mut config = AppConfig::default();
        config.audit.jsonl_path = Some(dir.path().join("audit.log").display().to_string());
        config.audit.sqlite_path = Some(dir.path().join("history.db").display().to_string());
        Context::new(config).unwrap()
    }

    fn tainted(ctx: &Context) -> Analysis {
        let mut analysis = ctx.pipeline.analyze(EMERGENCY).unwrap();
        analysis.trace.facts_used.push("scanned_twice".to_string());
        analysis
    }

    #[test]
    fn test_output_is_checked() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let gate = ctx.pipeline.gate();

        let clean = ctx.pipeline.analyze(EMERGENCY).unwrap();
        assert!(output(gate, &clean, false).unwrap().is_ok());
        assert!(output(gate, &clean, true).unwrap().is_ok());

        for json in [false, true] {
            let refusal = output(gate, &tainted(&ctx), json).unwrap().unwrap_err();
            assert_eq!(refusal.reason(), "FORBIDDEN_WORD_DETECTED: can");
        }
    }

    #[tokio::test]
    async fn test_refused_output_is_audited_as_refusal() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let code = finish(&ctx, EMERGENCY, Ok(tainted(&ctx)), false, false)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::from(REFUSED));

        let entries = JsonlAuditLog::open(dir.path().join("audit.log"))
            .await
            .unwrap()
            .read_all()
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, EventType::Refusal);
        assert_eq!(
            entries[0].refusal.as_deref(),
            Some("FORBIDDEN_WORD_DETECTED: can")
        );
    }

    #[tokio::test]
    async fn test_clean_output_is_audited_as_analysis() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let analysis = ctx.pipeline.analyze(EMERGENCY).unwrap();

        let code = finish(&ctx, EMERGENCY, Ok(analysis), true, false)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let entries = JsonlAuditLog::open(dir.path().join("audit.log"))
            .await
            .unwrap()
            .read_all()
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, EventType::Analysis);
    }
}
