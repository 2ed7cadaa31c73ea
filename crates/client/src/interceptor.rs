//! Interception dispatcher.
//!
//! The single entry point for every outgoing request of the client. Hosts
//! register an [`Interceptor`] in front of their HTTP client or proxy and
//! forward any request it declines.

use std::sync::Arc;

use wayside_core::{AgentRequest, AppConfig, CacheStorage, Generation, StoreNames, StorePurpose};

use crate::fetch::Fetcher;
use crate::route::{RouteClass, RouteRules};
use crate::strategy::{OfflineFallback, Served, Strategy, StrategyEngine};

/// Outcome of offering a request to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Not the agent's business: send the request to the network unmodified.
    Passthrough,
    /// The agent produced the response.
    Respond { route: RouteClass, strategy: Strategy, served: Served },
}

/// Strategy and target store for a route class, `None` for ignored requests.
pub fn plan(route: RouteClass) -> Option<(Strategy, StorePurpose)> {
    match route {
        RouteClass::Api => Some((Strategy::NetworkFirst, StorePurpose::Api)),
        RouteClass::StaticAsset => Some((Strategy::CacheFirst, StorePurpose::Static)),
        RouteClass::Navigation => Some((Strategy::StaleWhileRevalidate, StorePurpose::Dynamic)),
        RouteClass::Default => Some((Strategy::NetworkFirst, StorePurpose::Dynamic)),
        RouteClass::Ignored => None,
    }
}

/// Routes classified requests to their strategy and store.
pub struct Interceptor {
    generation: Generation,
    stores: StoreNames,
    rules: RouteRules,
    offline_path: String,
    engine: StrategyEngine,
}

impl Interceptor {
    pub fn new(generation: Generation, rules: RouteRules, offline_path: impl Into<String>, engine: StrategyEngine) -> Self {
        let stores = generation.stores();
        Self { generation, stores, rules, offline_path: offline_path.into(), engine }
    }

    pub fn from_config(config: &AppConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(
            config.generation(),
            RouteRules::from(config),
            config.offline_path.clone(),
            StrategyEngine::new(storage, fetcher),
        )
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn stores(&self) -> &StoreNames {
        &self.stores
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Handle one outgoing request.
    pub async fn handle(&self, request: &AgentRequest) -> Interception {
        let route = self.rules.classify(request);
        let Some((strategy, purpose)) = plan(route) else {
            tracing::trace!(method = %request.method, url = %request.url, "passthrough");
            return Interception::Passthrough;
        };

        let store = self.stores.get(purpose);
        let served = match strategy {
            Strategy::NetworkFirst => self.engine.network_first(request, store).await,
            Strategy::CacheFirst => self.engine.cache_first(request, store).await,
            Strategy::StaleWhileRevalidate => {
                let fallback = self.offline_fallback(request);
                self.engine
                    .stale_while_revalidate(request, store, fallback.as_ref())
                    .await
            }
        };

        tracing::debug!(
            url = %request.url,
            route = %route,
            strategy = %strategy,
            store,
            source = %served.source,
            status = served.response.status,
            "intercepted"
        );

        Interception::Respond { route, strategy, served }
    }

    /// The precached offline document on the request's own origin.
    fn offline_fallback(&self, request: &AgentRequest) -> Option<OfflineFallback> {
        let url = request.url.join(&self.offline_path).ok()?;
        Some(OfflineFallback { store: self.stores.static_assets.clone(), request: AgentRequest::get(url) })
    }
}
