//! One generation of the agent, and the slot that decides which generation serves.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use wayside_core::{AgentRequest, AppConfig, CacheStorage, Error, Generation};

use crate::fetch::Fetcher;
use crate::interceptor::{Interception, Interceptor};
use crate::lifecycle::{ActivationReport, InstallReport, Lifecycle, PrecacheManifest};

/// Dispatcher and lifecycle of a single generation.
pub struct Agent {
    interceptor: Interceptor,
    lifecycle: Lifecycle,
}

impl Agent {
    pub fn new(interceptor: Interceptor, lifecycle: Lifecycle) -> Self {
        Self { interceptor, lifecycle }
    }

    /// Build the generation described by `config`.
    pub fn from_config(config: &AppConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>) -> Self {
        let interceptor = Interceptor::from_config(config, storage.clone(), fetcher.clone());
        let lifecycle = Lifecycle::new(config.generation(), PrecacheManifest::from(config), storage, fetcher);
        Self { interceptor, lifecycle }
    }

    pub fn generation(&self) -> &Generation {
        self.interceptor.generation()
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install().await
    }

    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        self.lifecycle.activate().await
    }

    pub async fn handle(&self, request: &AgentRequest) -> Interception {
        self.interceptor.handle(request).await
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReport {
    pub install: InstallReport,
    pub activation: ActivationReport,
    /// Generation that served before the cutover, if any.
    pub replaced: Option<String>,
}

/// Holds the generation currently serving traffic.
///
/// A new generation only replaces the active one after its install
/// succeeded. Requests are handled under the read lock and activation runs
/// under the write lock, so activation waits for in-flight requests and
/// requests arriving during cutover are served by the new generation.
///
/// A detached stale-while-revalidate refresh started by the old generation
/// can still finish after activation; its write recreates the old dynamic
/// store, which the next activation deletes.
#[derive(Default)]
pub struct Registration {
    active: RwLock<Option<Arc<Agent>>>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `agent`, then activate it and make it the serving generation.
    ///
    /// If install fails the previously active generation keeps serving and
    /// the install error is returned.
    pub async fn register(&self, agent: Agent) -> Result<RegistrationReport, Error> {
        let install = match agent.install().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(generation = %agent.generation(), error = %e, "install failed, keeping current generation");
                return Err(e);
            }
        };

        let mut active = self.active.write().await;
        let activation = agent.activate().await?;
        let replaced = active.replace(Arc::new(agent)).map(|previous| previous.generation().tag());

        tracing::info!(
            generation = %install.generation,
            replaced = replaced.as_deref().unwrap_or("none"),
            "generation now serving"
        );

        Ok(RegistrationReport { install, activation, replaced })
    }

    /// The generation currently serving, if one was registered.
    pub async fn active(&self) -> Option<Arc<Agent>> {
        self.active.read().await.clone()
    }

    /// Offer a request to the serving generation. With none registered every
    /// request passes through.
    pub async fn handle(&self, request: &AgentRequest) -> Interception {
        let active = self.active.read().await;
        match active.as_ref() {
            Some(agent) => agent.handle(request).await,
            None => Interception::Passthrough,
        }
    }
}
