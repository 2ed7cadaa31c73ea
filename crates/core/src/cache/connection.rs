//! Database connection management with pragma configuration.
//!
//! Opens the SQLite database backing every cache store, applies the WAL
//! pragmas, and runs migrations before the handle is handed out.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations on a
/// background thread. Cloning is cheap and shares the same connection.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
    pub(crate) max_entry_bytes: Option<usize>,
}

impl CacheDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Reject entries whose body is larger than `max` bytes with `QUOTA_EXCEEDED`.
    pub fn with_max_entry_bytes(mut self, max: Option<usize>) -> Self {
        self.max_entry_bytes = max;
        self
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn, max_entry_bytes: None })
    }

    pub(crate) fn check_quota(&self, url: &str, len: usize) -> Result<(), Error> {
        match self.max_entry_bytes {
            Some(max) if len > max => Err(Error::QuotaExceeded(format!("{url}: {len} bytes exceeds {max}"))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let version = db
            .conn
            .call(|conn| conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0)))
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_quota_check() {
        let db = CacheDb::open_in_memory().await.unwrap().with_max_entry_bytes(Some(8));
        assert!(db.check_quota("https://example.com/", 8).is_ok());
        assert!(matches!(db.check_quota("https://example.com/", 9), Err(Error::QuotaExceeded(_))));
    }

    #[tokio::test]
    async fn test_no_quota_by_default() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.check_quota("https://example.com/", usize::MAX).is_ok());
    }
}
