//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WAYSIDE_*)
//! 2. TOML config file (if WAYSIDE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::Generation;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WAYSIDE_*)
/// 2. TOML config file (if WAYSIDE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Namespace shared by every generation of this agent's stores.
    ///
    /// Set via WAYSIDE_NAMESPACE environment variable.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Version of the current generation.
    ///
    /// Set via WAYSIDE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin the precache manifest paths are resolved against.
    ///
    /// Set via WAYSIDE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: Url,

    /// Path to SQLite cache database.
    ///
    /// Set via WAYSIDE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path prefix of server data requests.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Path prefix of the build output's static assets.
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    /// Document served when a navigation cannot be satisfied.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Paths fetched into the static store before a generation may serve.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via WAYSIDE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via WAYSIDE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Largest body a single store entry may hold. Unlimited when unset.
    #[serde(default)]
    pub max_entry_bytes: Option<usize>,

    /// Title of notifications whose payload carries none.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    #[serde(default = "default_notification_badge")]
    pub notification_badge: String,

    /// Dedup tag of notifications whose payload carries none.
    #[serde(default = "default_notification_tag")]
    pub notification_tag: String,

    /// Vibration pattern in milliseconds (on, off, on, ...).
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,
}

fn default_namespace() -> String {
    "community".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_origin() -> Url {
    Url::parse("http://localhost:3000").expect("default origin is a valid URL")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wayside-cache.sqlite")
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_static_prefix() -> String {
    "/_next/static/".into()
}

fn default_offline_path() -> String {
    "/offline".into()
}

fn default_precache() -> Vec<String> {
    vec!["/".into(), "/offline".into(), "/manifest.json".into(), "/icons/icon-192x192.png".into()]
}

fn default_user_agent() -> String {
    "wayside/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_app_name() -> String {
    "Community".into()
}

fn default_notification_icon() -> String {
    "/icons/icon-192x192.png".into()
}

fn default_notification_badge() -> String {
    "/icons/badge-72x72.png".into()
}

fn default_notification_tag() -> String {
    "community-notification".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            version: default_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            api_prefix: default_api_prefix(),
            static_prefix: default_static_prefix(),
            offline_path: default_offline_path(),
            precache: default_precache(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_entry_bytes: None,
            app_name: default_app_name(),
            notification_icon: default_notification_icon(),
            notification_badge: default_notification_badge(),
            notification_tag: default_notification_tag(),
            vibrate: default_vibrate(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The generation this configuration serves.
    pub fn generation(&self) -> Generation {
        Generation::new(&self.namespace, &self.version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WAYSIDE_`
    /// 2. TOML file from `WAYSIDE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WAYSIDE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WAYSIDE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
