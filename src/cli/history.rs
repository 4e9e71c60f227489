//! `medrights history`: recent audited queries from the SQLite history

use super::Context;
use anyhow::Result;
use medrights_ledger::{AuditEntry, SqliteHistory};
use std::process::ExitCode;

const PREVIEW_CHARS: usize = 60;

/// Run `history`
pub async fn run(ctx: &Context, limit: i64) -> Result<ExitCode> {
    let db_path = ctx.config.audit.sqlite_path();
    if !db_path.exists() {
        println!("No history yet ({} not found)", db_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let history = SqliteHistory::from_path(&db_path).await?;
    let entries = history.recent(limit).await?;
    println!(
        "{} of {} recorded queries\n",
        entries.len(),
        history.count().await?
    );
    for entry in &entries {
        println!("{}", row(entry));
    }
    Ok(ExitCode::SUCCESS)
}

fn row(entry: &AuditEntry) -> String {
    let outcome = match (&entry.refusal, entry.verdict_type()) {
        (Some(reason), _) => reason.clone(),
        (None, Some(verdict_type)) => verdict_type.to_string(),
        (None, None) => "-".to_string(),
    };
    format!(
        "{}  {}  {:<8}  {:<40}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        &entry.id.to_string()[..8],
        entry.event_type.as_str(),
        outcome,
        preview(&entry.raw_text)
    )
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrights_core::{Pipeline, Refusal};

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("a\n  b\tc"), "a b c");
        let long = "x".repeat(PREVIEW_CHARS + 5);
        let out = preview(&long);
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_row_shows_outcome() {
        let pipeline = Pipeline::standard().unwrap();
        let text = "doctor refused to admit during an emergency";
        let analysis = pipeline.analyze(text).unwrap();
        let line = row(&AuditEntry::analysis(text, &analysis, "test"));
        assert!(line.contains("ANALYSIS"));
        assert!(line.contains("PROVABLE"));

        let refused = AuditEntry::refusal("{}", &Refusal::unknown_field("mood"), "test");
        assert!(row(&refused).contains("UNKNOWN_FIELD: mood"));
    }
}
