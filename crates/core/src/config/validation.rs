//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `namespace` is empty or contains `-`
    /// - `version` is empty
    /// - `api_prefix` or `static_prefix` does not start and end with `/`
    /// - `offline_path` is not absolute or is missing from `precache`
    /// - a `precache` entry is not an absolute path
    /// - `origin` is not http(s)
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `user_agent` or `app_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(invalid("namespace", "must not be empty"));
        }
        if self.namespace.contains('-') {
            return Err(invalid("namespace", "must not contain '-'"));
        }
        if self.version.is_empty() {
            return Err(invalid("version", "must not be empty"));
        }

        for (field, prefix) in [("api_prefix", &self.api_prefix), ("static_prefix", &self.static_prefix)] {
            if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
                return Err(invalid(field, "must start and end with '/'"));
            }
        }

        if !self.offline_path.starts_with('/') {
            return Err(invalid("offline_path", "must be an absolute path"));
        }
        if let Some(path) = self.precache.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "precache".into(),
                reason: format!("'{path}' is not an absolute path"),
            });
        }
        if !self.precache.contains(&self.offline_path) {
            return Err(invalid("offline_path", "must be listed in precache"));
        }

        if !matches!(self.origin.scheme(), "http" | "https") {
            return Err(invalid("origin", "must be an http or https URL"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.app_name.is_empty() {
            return Err(invalid("app_name", "must not be empty"));
        }

        if let Some(max_entry) = self.max_entry_bytes
            && max_entry > self.max_bytes
        {
            tracing::warn!(
                max_entry_bytes = max_entry,
                max_bytes = self.max_bytes,
                "max_entry_bytes exceeds max_bytes; the fetch limit applies first"
            );
        }

        Ok(())
    }
}
