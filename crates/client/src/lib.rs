//! Client side of wayside: the request-interception agent.
//!
//! This crate provides the route classifier, the caching strategies, the
//! interception dispatcher, generation lifecycle, and the push notification
//! channel. Storage comes from `wayside-core`; the network is reached through
//! the [`Fetcher`] trait.

pub mod agent;
pub mod fetch;
pub mod interceptor;
pub mod lifecycle;
pub mod notify;
pub mod route;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{Agent, Registration, RegistrationReport};
pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use interceptor::{Interception, Interceptor};
pub use lifecycle::{ActivationReport, InstallReport, Lifecycle, PrecacheManifest};
pub use notify::{
    ClickOutcome, ClientView, ClientViews, Notification, NotificationChannel, NotificationClick, NotificationDefaults,
    NotificationPayload, Notifier, PushPayload,
};
pub use route::{RouteClass, RouteRules};
pub use strategy::{ResponseSource, Served, Strategy, StrategyEngine};
