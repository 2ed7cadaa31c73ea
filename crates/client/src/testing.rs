//! Test doubles shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;
use wayside_core::{AgentRequest, AgentResponse, CacheDb, CacheStorage, Error};

use crate::fetch::Fetcher;

pub(crate) const ORIGIN: &str = "https://community.example";

pub(crate) fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub(crate) fn get(path: &str) -> AgentRequest {
    AgentRequest::get(url(path))
}

pub(crate) fn navigate(path: &str) -> AgentRequest {
    AgentRequest::navigate(url(path))
}

pub(crate) fn ok(body: &str) -> AgentResponse {
    AgentResponse::new(200, body.to_string()).with_header("content-type", "text/html")
}

/// Serves canned responses by URL; unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct StubFetcher {
    routes: Mutex<HashMap<String, AgentResponse>>,
    oversized: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, path: &str, response: AgentResponse) {
        self.routes.lock().unwrap().insert(url(path).to_string(), response);
    }

    /// Answer `path` with a body over the size cap.
    pub(crate) fn route_oversized(&self, path: &str) {
        self.oversized.lock().unwrap().insert(url(path).to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &AgentRequest) -> Result<AgentResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }
        if self.oversized.lock().unwrap().contains(request.url.as_str()) {
            return Err(Error::FetchTooLarge(format!("{}: body exceeds limit", request.url)));
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| AgentResponse::new(404, "Not Found")))
    }
}

/// SQLite storage whose deletes fail for selected store names.
pub(crate) struct FlakyStorage {
    pub(crate) inner: CacheDb,
    failing_deletes: HashSet<String>,
}

impl FlakyStorage {
    pub(crate) fn new(inner: CacheDb, failing_deletes: &[&str]) -> Self {
        Self { inner, failing_deletes: failing_deletes.iter().map(|s| s.to_string()).collect() }
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open_store(&self, name: &str) -> Result<(), Error> {
        self.inner.open_store(name).await
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.inner.store_names().await
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        if self.failing_deletes.contains(name) {
            return Err(Error::InvalidInput(format!("{name} is locked")));
        }
        self.inner.delete_store(name).await
    }

    async fn lookup(&self, store: &str, request: &AgentRequest) -> Result<Option<AgentResponse>, Error> {
        self.inner.lookup(store, request).await
    }

    async fn put(&self, store: &str, request: &AgentRequest, response: &AgentResponse) -> Result<(), Error> {
        self.inner.put(store, request, response).await
    }

    async fn put_all(&self, store: &str, entries: &[(AgentRequest, AgentResponse)]) -> Result<(), Error> {
        self.inner.put_all(store, entries).await
    }
}
