//! Click routing: pick the open view to focus for a notification target.

use serde::{Deserialize, Serialize};

/// An open client view (tab or window) of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientView {
    pub id: String,
    /// Current location of the view.
    pub url: String,
}

/// What the click handler did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ClickOutcome {
    Focused { id: String, url: String },
    Opened { url: String },
}

/// First view whose location contains `target`.
pub fn find_view<'a>(views: &'a [ClientView], target: &str) -> Option<&'a ClientView> {
    views.iter().find(|view| view.url.contains(target))
}
