//! Generation lifecycle: install and activate.
//!
//! ### Install
//! Fetches every precache manifest entry and writes them into the new
//! generation's static store in one transaction. A transport failure or a
//! non-ok status on any entry fails the install and writes nothing.
//!
//! ### Activate
//! Deletes every store in the agent's namespace that is not one of the
//! current generation's three stores. Each deletion is attempted on its own;
//! a failure is logged and the remaining deletions still run.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use url::Url;
use wayside_core::{AgentRequest, AgentResponse, AppConfig, CacheStorage, Error, Generation};

use crate::fetch::Fetcher;

/// Paths that must be resolvable from the static store before a generation serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecacheManifest {
    origin: Url,
    paths: Vec<String>,
}

impl PrecacheManifest {
    pub fn new(origin: Url, paths: Vec<String>) -> Self {
        Self { origin, paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// One `GET` per manifest path, in manifest order.
    pub fn requests(&self) -> Result<Vec<AgentRequest>, Error> {
        self.paths
            .iter()
            .map(|path| {
                self.origin
                    .join(path)
                    .map(AgentRequest::get)
                    .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
            })
            .collect()
    }
}

impl From<&AppConfig> for PrecacheManifest {
    fn from(config: &AppConfig) -> Self {
        Self::new(config.origin.clone(), config.precache.clone())
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub generation: String,
    pub store: String,
    pub entries: usize,
}

/// Result of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    pub generation: String,
    /// Stale stores that were removed.
    pub deleted: Vec<String>,
    /// Stale stores whose deletion failed; retried on the next activation.
    pub failed: Vec<String>,
}

/// Install/activate steps for one generation.
pub struct Lifecycle {
    generation: Generation,
    manifest: PrecacheManifest,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
}

impl Lifecycle {
    pub fn new(
        generation: Generation, manifest: PrecacheManifest, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self { generation, manifest, storage, fetcher }
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Populate the static store from the precache manifest, all or nothing.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let store = self.generation.stores().static_assets;
        let requests = self.manifest.requests()?;

        tracing::info!(generation = %self.generation, entries = requests.len(), "installing");

        let responses = try_join_all(requests.iter().map(|request| self.precache_fetch(request))).await?;
        let entries: Vec<(AgentRequest, AgentResponse)> = requests.into_iter().zip(responses).collect();

        self.storage
            .put_all(&store, &entries)
            .await
            .map_err(|e| Error::PrecacheFailed(format!("writing {store}: {e}")))?;
        self.storage.open_store(&store).await?;

        tracing::info!(generation = %self.generation, store = %store, entries = entries.len(), "installed");

        Ok(InstallReport { generation: self.generation.tag(), store, entries: entries.len() })
    }

    async fn precache_fetch(&self, request: &AgentRequest) -> Result<AgentResponse, Error> {
        let response = self
            .fetcher
            .fetch(request)
            .await
            .map_err(|e| Error::PrecacheFailed(format!("{}: {e}", request.url)))?;
        if !response.is_ok() {
            return Err(Error::PrecacheFailed(format!("{} returned {}", request.url, response.status)));
        }
        Ok(response)
    }

    /// Delete every store left behind by earlier generations of this namespace.
    ///
    /// Only listing the stores can fail; individual deletions are best effort.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let names = self.storage.store_names().await?;
        let mut report = ActivationReport { generation: self.generation.tag(), ..Default::default() };

        for name in names.into_iter().filter(|name| self.generation.is_stale(name)) {
            match self.storage.delete_store(&name).await {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted stale store");
                    report.deleted.push(name);
                }
                Err(e) => {
                    tracing::warn!(store = %name, error = %e, "failed to delete stale store");
                    report.failed.push(name);
                }
            }
        }

        tracing::info!(
            generation = %self.generation,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "activated"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyStorage, ORIGIN, StubFetcher, get, ok};
    use wayside_core::{CacheDb, StorePurpose};

    const MANIFEST: [&str; 4] = ["/", "/offline", "/manifest.json", "/icons/icon-192x192.png"];

    fn manifest() -> PrecacheManifest {
        PrecacheManifest::new(Url::parse(ORIGIN).unwrap(), MANIFEST.iter().map(|p| p.to_string()).collect())
    }

    fn routed_fetcher() -> Arc<StubFetcher> {
        let fetcher = Arc::new(StubFetcher::new());
        for path in MANIFEST {
            fetcher.route(path, ok(&format!("body of {path}")));
        }
        fetcher
    }

    fn lifecycle(version: &str, storage: Arc<dyn CacheStorage>, fetcher: Arc<StubFetcher>) -> Lifecycle {
        Lifecycle::new(Generation::new("community", version), manifest(), storage, fetcher)
    }

    #[test]
    fn test_manifest_requests() {
        let requests = manifest().requests().unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].url.as_str(), "https://community.example/");
        assert_eq!(requests[1].url.as_str(), "https://community.example/offline");
        assert!(requests.iter().all(|r| r.is_get()));
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let lifecycle = lifecycle("v2", Arc::new(db.clone()), routed_fetcher());

        let report = lifecycle.install().await.unwrap();
        assert_eq!(report.store, "community-v2-static");
        assert_eq!(report.entries, 4);

        for path in MANIFEST {
            let stored = db.lookup("community-v2-static", &get(path)).await.unwrap();
            assert_eq!(stored.unwrap().text(), format!("body of {path}"));
        }
    }

    #[tokio::test]
    async fn test_install_fails_on_network_error_and_writes_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = routed_fetcher();
        fetcher.set_offline(true);
        let lifecycle = lifecycle("v2", Arc::new(db.clone()), fetcher);

        let result = lifecycle.install().await;
        assert!(matches!(result, Err(Error::PrecacheFailed(_))));
        assert!(db.store_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_fails_on_error_status() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = routed_fetcher();
        fetcher.route("/manifest.json", AgentResponse::new(404, "missing"));
        let lifecycle = lifecycle("v2", Arc::new(db.clone()), fetcher);

        let result = lifecycle.install().await;
        assert!(matches!(result, Err(Error::PrecacheFailed(msg)) if msg.contains("404")));
        assert!(db.lookup("community-v2-static", &get("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_install_fails_when_store_rejects_entry() {
        let db = CacheDb::open_in_memory().await.unwrap().with_max_entry_bytes(Some(4));
        let lifecycle = lifecycle("v2", Arc::new(db.clone()), routed_fetcher());

        assert!(matches!(lifecycle.install().await, Err(Error::PrecacheFailed(_))));
        assert!(db.lookup("community-v2-static", &get("/")).await.unwrap().is_none());
        assert!(db.store_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_empty_manifest_still_creates_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let lifecycle = Lifecycle::new(
            Generation::new("community", "v2"),
            PrecacheManifest::new(Url::parse(ORIGIN).unwrap(), Vec::new()),
            Arc::new(db.clone()),
            routed_fetcher(),
        );

        assert_eq!(lifecycle.install().await.unwrap().entries, 0);
        assert_eq!(db.store_names().await.unwrap(), vec!["community-v2-static".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_keeps_only_current_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in [
            "community-v1-static",
            "community-v1-dynamic",
            "community-v1-api",
            "community-v2-static",
            "community-v2-dynamic",
            "community-v2-api",
            "community-v2-legacy",
            "othersite-v1-static",
            "workbox-runtime",
        ] {
            db.open_store(name).await.unwrap();
        }
        let lifecycle = lifecycle("v2", Arc::new(db.clone()), routed_fetcher());

        let report = lifecycle.activate().await.unwrap();
        assert_eq!(
            report.deleted,
            vec!["community-v1-static", "community-v1-dynamic", "community-v1-api", "community-v2-legacy"]
        );
        assert!(report.failed.is_empty());

        let generation = Generation::new("community", "v2");
        let remaining = db.store_names().await.unwrap();
        assert_eq!(
            remaining,
            vec![
                generation.store_name(StorePurpose::Static),
                generation.store_name(StorePurpose::Dynamic),
                generation.store_name(StorePurpose::Api),
                "othersite-v1-static".to_string(),
                "workbox-runtime".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_activate_deletion_failures_are_independent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["community-v1-static", "community-v1-dynamic", "community-v1-api"] {
            db.open_store(name).await.unwrap();
        }
        let storage = Arc::new(FlakyStorage::new(db.clone(), &["community-v1-dynamic"]));
        let lifecycle = lifecycle("v2", storage, routed_fetcher());

        let report = lifecycle.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["community-v1-static", "community-v1-api"]);
        assert_eq!(report.failed, vec!["community-v1-dynamic"]);
        assert_eq!(db.store_names().await.unwrap(), vec!["community-v1-dynamic".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_with_no_stale_stores() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let lifecycle = lifecycle("v1", Arc::new(db), routed_fetcher());
        let report = lifecycle.activate().await.unwrap();
        assert!(report.deleted.is_empty());
        assert_eq!(report.generation, "community-v1");
    }
}
