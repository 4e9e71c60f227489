//! JSONL audit log - one JSON object per line, append-only

use crate::entry::AuditEntry;
use crate::error::{Error, Result};
use crate::sink::AuditSink;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Append-only audit log file
pub struct JsonlAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditLog {
    /// Open (or create) a log at `path`, creating parent directories
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        debug!(path = %path.display(), "JSONL audit log opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Log file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry back, oldest first
    pub async fn read_all(&self) -> Result<Vec<AuditEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| Error::Serialization(format!("invalid audit line: {e}")))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl AuditSink for JsonlAuditLog {
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line =
            serde_json::to_string(entry).map_err(|e| Error::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(event_type = %entry.event_type, "Audit entry appended");
        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
