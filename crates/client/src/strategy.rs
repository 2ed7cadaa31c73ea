//! Caching strategies.
//!
//! Each strategy maps a request and its target store to a response, and may
//! write to the store on the way. None of them ever fail: network failures
//! turn into cache lookups or a synthesized `503 Offline`, a response the
//! server sent but the fetcher refused (over the size cap) becomes a `502`,
//! and store read or write failures are logged and otherwise ignored.
//!
//! | strategy                 | network | store                                    |
//! |--------------------------|---------|------------------------------------------|
//! | network-first            | first   | fallback on transport failure            |
//! | cache-first              | on miss | answered directly when present           |
//! | stale-while-revalidate   | always  | answered directly, refreshed in the background |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wayside_core::{AgentRequest, AgentResponse, CacheStorage, Error};

use crate::fetch::Fetcher;

/// The strategy applied to a route class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network-first",
            Strategy::CacheFirst => "cache-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Live from the network, including non-ok statuses.
    Network,
    /// Replayed from the target store.
    Cache,
    /// The stored offline fallback document.
    Fallback,
    /// A placeholder: `503 Offline`, or `502` for an unusable response.
    Synthesized,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Fallback => "fallback",
            ResponseSource::Synthesized => "synthesized",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: AgentResponse,
    pub source: ResponseSource,
}

impl Served {
    fn network(response: AgentResponse) -> Self {
        Self { response, source: ResponseSource::Network }
    }

    fn cache(response: AgentResponse) -> Self {
        Self { response, source: ResponseSource::Cache }
    }

    fn offline() -> Self {
        Self { response: AgentResponse::offline(), source: ResponseSource::Synthesized }
    }

    /// The server answered but its response could not be used, e.g. it exceeded the size cap.
    fn rejected(request: &AgentRequest, error: &Error) -> Self {
        tracing::warn!(url = %request.url, error = %error, "response rejected");
        Self { response: AgentResponse::bad_gateway(error.to_string()), source: ResponseSource::Synthesized }
    }
}

/// Where to find the document substituted for unsatisfiable navigations.
#[derive(Debug, Clone)]
pub struct OfflineFallback {
    pub store: String,
    pub request: AgentRequest,
}

/// Runs strategies against a shared store registry and network.
#[derive(Clone)]
pub struct StrategyEngine {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
}

impl StrategyEngine {
    pub fn new(storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { storage, fetcher }
    }

    /// Try the network; fall back to the store only when the network is unreachable.
    ///
    /// Ok responses are stored before being returned. Non-ok responses are
    /// returned as-is and never stored.
    pub async fn network_first(&self, request: &AgentRequest, store: &str) -> Served {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(store, request, &response).await;
                }
                Served::network(response)
            }
            Err(e) if e.is_network() => {
                tracing::debug!(url = %request.url, store, error = %e, "network failed, trying cache");
                match self.lookup(store, request).await {
                    Some(cached) => Served::cache(cached),
                    None => Served::offline(),
                }
            }
            Err(e) => Served::rejected(request, &e),
        }
    }

    /// Answer from the store without touching the network when possible.
    pub async fn cache_first(&self, request: &AgentRequest, store: &str) -> Served {
        if let Some(cached) = self.lookup(store, request).await {
            tracing::debug!(url = %request.url, store, "cache hit");
            return Served::cache(cached);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(store, request, &response).await;
                }
                Served::network(response)
            }
            Err(e) if e.is_network() => {
                tracing::debug!(url = %request.url, store, error = %e, "cache miss and network failed");
                Served::offline()
            }
            Err(e) => Served::rejected(request, &e),
        }
    }

    /// Answer from the store immediately and refresh it in the background.
    ///
    /// The refresh is a detached task: on a hit nothing waits for it, and its
    /// write only benefits the next request for the same URL. On a miss the
    /// caller waits for the same task, and an unreachable network yields the
    /// offline fallback document, or `503 Offline` if that is not stored either.
    pub async fn stale_while_revalidate(
        &self, request: &AgentRequest, store: &str, fallback: Option<&OfflineFallback>,
    ) -> Served {
        let cached = self.lookup(store, request).await;

        let revalidation = {
            let engine = self.clone();
            let request = request.clone();
            let store = store.to_string();
            tokio::spawn(async move { engine.revalidate(&request, &store).await })
        };

        if let Some(cached) = cached {
            tracing::debug!(url = %request.url, store, "serving cached navigation, revalidating");
            return Served::cache(cached);
        }

        match revalidation.await {
            Ok(Ok(response)) => Served::network(response),
            Ok(Err(e)) if e.is_network() => {
                tracing::debug!(url = %request.url, error = %e, "navigation failed, serving offline fallback");
                self.offline_fallback(fallback).await
            }
            Ok(Err(e)) => Served::rejected(request, &e),
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "revalidation task did not complete");
                self.offline_fallback(fallback).await
            }
        }
    }

    async fn revalidate(&self, request: &AgentRequest, store: &str) -> Result<AgentResponse, Error> {
        let response = self.fetcher.fetch(request).await?;
        if response.is_ok() {
            self.store(store, request, &response).await;
        }
        Ok(response)
    }

    async fn offline_fallback(&self, fallback: Option<&OfflineFallback>) -> Served {
        let Some(fallback) = fallback else {
            return Served::offline();
        };
        match self.lookup(&fallback.store, &fallback.request).await {
            Some(document) => Served { response: document, source: ResponseSource::Fallback },
            None => Served::offline(),
        }
    }

    /// Store lookup that treats read failures as misses.
    async fn lookup(&self, store: &str, request: &AgentRequest) -> Option<AgentResponse> {
        match self.storage.lookup(store, request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, store, error = %e, "cache read failed");
                None
            }
        }
    }

    /// Store write whose failure never reaches the caller.
    async fn store(&self, store: &str, request: &AgentRequest, response: &AgentResponse) {
        if let Err(e) = self.storage.put(store, request, response).await {
            tracing::warn!(url = %request.url, store, error = %e, "cache write failed");
        }
    }
}
