//! Error types for medrights-core
//!
//! Refusals are the only errors a query can produce. The other variants are
//! setup failures (a malformed catalog or detector table) surfaced at startup.

use crate::refusal::Refusal;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The safety gate refused the query
    #[error("refused: {0}")]
    Refusal(#[from] Refusal),

    /// Rule catalog failed to load or validate
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Detector table is inconsistent with the fact schema
    #[error("schema error: {0}")]
    Schema(String),

    /// Explanation generator failed
    #[error("explanation error: {0}")]
    Explanation(String),
}

impl Error {
    /// Returns the refusal if this error is one
    #[must_use]
    pub fn as_refusal(&self) -> Option<&Refusal> {
        match self {
            Self::Refusal(refusal) => Some(refusal),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refusal::RefusalCode;

    #[test]
    fn test_refusal_converts_and_is_recoverable() {
        let error: Error = Refusal::forbidden_word("should").into();
        let refusal = error.as_refusal().unwrap();
        assert_eq!(refusal.code, RefusalCode::ForbiddenWordDetected);
        assert!(error.to_string().contains("FORBIDDEN_WORD_DETECTED"));
    }

    #[test]
    fn test_setup_errors_are_not_refusals() {
        let error = Error::Catalog("duplicate rule id".to_string());
        assert!(error.as_refusal().is_none());
        assert_eq!(error.to_string(), "catalog error: duplicate rule id");
    }
}
