//! Audit sink trait and default locations

use crate::entry::AuditEntry;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Trait for audit storage backends
///
/// Backends only ever append. Implementations must be shareable across
/// concurrent queries.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one entry
    async fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// Sink name (for logging)
    fn name(&self) -> &str;
}

/// Forwards every entry to each configured sink
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutSink {
    /// Empty fan-out
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of sinks
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait::async_trait]
impl AuditSink for FanoutSink {
    /// Appends to every sink; the first failure is returned after all sinks ran
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.append(entry).await {
                warn!(sink = sink.name(), error = %e, "Audit append failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

/// Default data directory (`~/.medrights`)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".medrights"))
        .unwrap_or_else(|| PathBuf::from(".medrights"))
}

/// Default SQLite history path
pub fn default_db_path() -> PathBuf {
    default_data_dir().join("history.db")
}

/// Default JSONL audit log path
pub fn default_audit_path() -> PathBuf {
    default_data_dir().join("audit.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use medrights_core::Refusal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    #[async_trait::async_trait]
    impl AuditSink for Counting {
        async fn append(&self, _entry: &AuditEntry) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl AuditSink for Broken {
        async fn append(&self, _entry: &AuditEntry) -> Result<()> {
            Err(Error::Database("offline".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn entry() -> AuditEntry {
        AuditEntry::refusal("x", &Refusal::missing_field("doctor_involved"), "test")
    }

    #[tokio::test]
    async fn test_fanout_reaches_every_sink() {
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        let fanout = FanoutSink::new()
            .with(counter.clone())
            .with(counter.clone());
        assert_eq!(fanout.len(), 2);

        fanout.append(&entry()).await.unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fanout_continues_past_failure() {
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        let fanout = FanoutSink::new()
            .with(Arc::new(Broken))
            .with(counter.clone());

        let result = fanout.append(&entry()).await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_paths() {
        assert!(default_data_dir().to_string_lossy().contains("medrights"));
        assert!(default_db_path().ends_with("history.db"));
        assert!(default_audit_path().ends_with("audit.log"));
    }
}
