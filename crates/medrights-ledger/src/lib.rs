//! Medrights Ledger - Audit Persistence
//!
//! Append-only records of every query, kept outside the verdict core:
//! - Entry: the audit record and its event type
//! - Sink: the trait every backend implements
//! - Jsonl: one JSON object per line in a local file
//! - Sqlite: queryable interaction history

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod jsonl;
pub mod sink;
pub mod sqlite;

pub use entry::{AuditEntry, EventType};
pub use error::{Error, Result};
pub use jsonl::JsonlAuditLog;
pub use sink::{default_audit_path, default_data_dir, default_db_path, AuditSink, FanoutSink};
pub use sqlite::SqliteHistory;
