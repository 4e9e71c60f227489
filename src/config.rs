//! Configuration loading
//!
//! Embedded defaults, then optional files, then environment.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version stamped on audit records
    #[serde(default)]
    pub system_version: Option<String>,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rule catalog source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// External catalog file; embedded catalog when `None`
    #[serde(default)]
    pub path: Option<String>,
}

/// Audit sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub jsonl_path: Option<String>,
    #[serde(default)]
    pub sqlite_path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_path: None,
            sqlite_path: None,
        }
    }
}

impl AuditConfig {
    /// JSONL log location
    pub fn jsonl_path(&self) -> PathBuf {
        self.jsonl_path
            .as_ref()
            .map_or_else(medrights_ledger::default_audit_path, PathBuf::from)
    }

    /// SQLite history location
    pub fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .as_ref()
            .map_or_else(medrights_ledger::default_db_path, PathBuf::from)
    }
}

/// Logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_filter() -> String {
    "medrights=info".to_string()
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("MEDRIGHTS_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority)
        // MEDRIGHTS_AUDIT__ENABLED, single "_" after the prefix
        .add_source(
            Environment::with_prefix("MEDRIGHTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(overrides: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults() {
        let config = from_toml("");
        assert!(config.system_version.is_none());
        assert!(config.catalog.path.is_none());
        assert!(config.audit.enabled);
        assert!(config.audit.jsonl_path().ends_with("audit.log"));
        assert!(config.audit.sqlite_path().ends_with("history.db"));
        assert_eq!(config.logging.filter, "medrights=info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = from_toml(
            r#"
            system_version = "test-1"

            [catalog]
            path = "rules/custom.toml"

            [audit]
            enabled = false
            jsonl_path = "/tmp/medrights/audit.log"
            "#,
        );
        assert_eq!(config.system_version.as_deref(), Some("test-1"));
        assert_eq!(config.catalog.path.as_deref(), Some("rules/custom.toml"));
        assert!(!config.audit.enabled);
        assert_eq!(
            config.audit.jsonl_path(),
            PathBuf::from("/tmp/medrights/audit.log")
        );
        assert_eq!(config.logging.filter, "medrights=info");
    }

    #[test]
    fn test_empty_config_uses_serde_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(config.audit.enabled);
        assert_eq!(config.logging.filter, "medrights=info");
    }
}
