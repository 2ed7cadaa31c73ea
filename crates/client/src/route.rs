//! Route classification.
//!
//! Every observed request gets exactly one label. Rules are checked in
//! order and the first match wins:
//!
//! 1. method other than GET → `Ignored`
//! 2. scheme other than http/https → `Ignored`
//! 3. path under the API prefix → `Api`
//! 4. known asset extension, or path under the build output prefix → `StaticAsset`
//! 5. document load → `Navigation`
//! 6. anything else → `Default`

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use wayside_core::{AgentRequest, AppConfig, RequestMode};

static ASSET_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(js|css|png|jpg|jpeg|gif|svg|ico|woff|woff2|ttf|eot|webp|avif)$")
        .expect("asset extension pattern is valid")
});

/// The label assigned to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteClass {
    Api,
    StaticAsset,
    Navigation,
    Default,
    /// Never intercepted, never cached.
    Ignored,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Api => "api",
            RouteClass::StaticAsset => "static-asset",
            RouteClass::Navigation => "navigation",
            RouteClass::Default => "default",
            RouteClass::Ignored => "ignored",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefixes that drive classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRules {
    pub api_prefix: String,
    pub static_prefix: String,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self { api_prefix: "/api/".into(), static_prefix: "/_next/static/".into() }
    }
}

impl From<&AppConfig> for RouteRules {
    fn from(config: &AppConfig) -> Self {
        Self { api_prefix: config.api_prefix.clone(), static_prefix: config.static_prefix.clone() }
    }
}

impl RouteRules {
    /// Classify a request. Total and side-effect free.
    pub fn classify(&self, request: &AgentRequest) -> RouteClass {
        if !request.is_get() {
            return RouteClass::Ignored;
        }
        if !matches!(request.url.scheme(), "http" | "https") {
            return RouteClass::Ignored;
        }

        let path = request.url.path();
        if path.starts_with(&self.api_prefix) {
            RouteClass::Api
        } else if is_static_asset(path) || path.starts_with(&self.static_prefix) {
            RouteClass::StaticAsset
        } else if request.mode == RequestMode::Navigate {
            RouteClass::Navigation
        } else {
            RouteClass::Default
        }
    }
}

/// Whether the path ends in one of the known asset extensions.
pub fn is_static_asset(path: &str) -> bool {
    ASSET_EXTENSION.is_match(path)
}
