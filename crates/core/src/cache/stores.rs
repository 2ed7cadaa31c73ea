//! Store and entry operations.
//!
//! Provides the SQLite side of the store registry: creating, listing and
//! deleting named stores, and reading and writing entries inside them.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{AgentRequest, AgentResponse};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Entry count and payload size of one store.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreStats {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
    pub bytes: u64,
}

/// A response as persisted in the `entries` table.
#[derive(Debug, Clone)]
struct StoredEntry {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
    response_url: Option<String>,
}

impl StoredEntry {
    fn new(request: &AgentRequest, response: &AgentResponse) -> Result<Self, Error> {
        let url = request.cache_url();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
        Ok(Self {
            key_hash: compute_cache_key(&request.method, &url),
            method: request.method.to_ascii_uppercase(),
            url,
            status: response.status,
            headers_json,
            body: response.body.to_vec(),
            response_url: response.url.clone(),
        })
    }

    fn into_response(self) -> Result<AgentResponse, Error> {
        let headers: Vec<(String, String)> =
            serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry(format!("{}: {e}", self.url)))?;
        Ok(AgentResponse { status: self.status, headers, body: Bytes::from(self.body), url: self.response_url })
    }
}

fn upsert_entry(conn: &rusqlite::Connection, store: &str, entry: &StoredEntry, now: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
        params![store, now],
    )?;
    conn.execute(
        "INSERT INTO entries (store, key_hash, method, url, status, headers_json, body, response_url, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(store, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            response_url = excluded.response_url,
            stored_at = excluded.stored_at",
        params![
            store,
            &entry.key_hash,
            &entry.method,
            &entry.url,
            entry.status,
            &entry.headers_json,
            &entry.body,
            &entry.response_url,
            now,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Create a store if it does not exist yet.
    pub async fn create_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List store names in creation order.
    pub async fn list_stores(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and its entries in one transaction.
    ///
    /// Returns false if the store did not exist.
    pub async fn drop_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE store = ?1", params![name])?;
                let removed = tx.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Get the entry stored under `key_hash` in `store`.
    pub async fn get_entry(&self, store: &str, key_hash: &str) -> Result<Option<AgentResponse>, Error> {
        let store = store.to_string();
        let key_hash = key_hash.to_string();
        let entry = self
            .conn
            .call(move |conn| -> Result<Option<StoredEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key_hash, method, url, status, headers_json, body, response_url
                     FROM entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok(StoredEntry {
                        key_hash: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        status: row.get(3)?,
                        headers_json: row.get(4)?,
                        body: row.get(5)?,
                        response_url: row.get(6)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        entry.map(StoredEntry::into_response).transpose()
    }

    /// Per-store entry counts and body sizes, in creation order.
    pub async fn store_stats(&self) -> Result<Vec<StoreStats>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreStats>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.created_at, COUNT(e.key_hash), COALESCE(SUM(LENGTH(e.body)), 0)
                     FROM stores s LEFT JOIN entries e ON e.store = s.name
                     GROUP BY s.name ORDER BY MIN(s.rowid)",
                )?;
                let stats = stmt
                    .query_map([], |row| {
                        Ok(StoreStats {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                            bytes: row.get::<_, i64>(3)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stats)
            })
            .await
            .map_err(Error::from)
    }

    async fn write_entries(&self, store: &str, entries: Vec<StoredEntry>) -> Result<(), Error> {
        let store = store.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    upsert_entry(&tx, &store, entry, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open_store(&self, name: &str) -> Result<(), Error> {
        self.create_store(name).await
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.list_stores().await
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        self.drop_store(name).await
    }

    async fn lookup(&self, store: &str, request: &AgentRequest) -> Result<Option<AgentResponse>, Error> {
        let key_hash = compute_cache_key(&request.method, &request.cache_url());
        self.get_entry(store, &key_hash).await
    }

    async fn put(&self, store: &str, request: &AgentRequest, response: &AgentResponse) -> Result<(), Error> {
        self.check_quota(request.url.as_str(), response.body.len())?;
        let entry = StoredEntry::new(request, response)?;
        self.write_entries(store, vec![entry]).await
    }

    async fn put_all(&self, store: &str, entries: &[(AgentRequest, AgentResponse)]) -> Result<(), Error> {
        let mut rows = Vec::with_capacity(entries.len());
        for (request, response) in entries {
            self.check_quota(request.url.as_str(), response.body.len())?;
            rows.push(StoredEntry::new(request, response)?);
        }
        self.write_entries(store, rows).await
    }
}
