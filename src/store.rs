//! Blob persistence for the channel registry.
//!
//! The registry is read once at startup and written once at shutdown under
//! [`REGISTRY_KEY`]. Where it lives depends on `DATASTORE_PATH`:
//!
//! - `postgres://...` / `postgresql://...`: a `blobs` table in PostgreSQL
//! - an existing directory: one file per key inside it
//! - anything else (including empty): nothing is persisted

use crate::channels::ChannelRegistry;
use crate::detect::EngineBuilder;
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Key the channel registry snapshot is stored under
pub const REGISTRY_KEY: &str = "channel_registry.json";

/// Key/value storage for opaque blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

// ==================== Local directory ====================

/// Stores each key as a file in a directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            anyhow::bail!("Datastore directory does not exist: {}", dir.display());
        }
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            anyhow::bail!("Invalid blob key: '{}'", key);
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(format!("Failed to read {}", path.display())),
        }
    }

    async fn set(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        // Write next to the target and rename so readers never see a partial file
        let tmp = self.dir.join(format!(".{}.tmp", key));
        tokio::fs::write(&tmp, data)
            .await
            .context(format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .context(format!("Failed to move blob into {}", path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.dir.display())
    }
}

// ==================== PostgreSQL ====================

/// Stores blobs in a `blobs` table.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect (retrying transient failures) and create the table if needed.
    pub async fn connect(url: &str, retry: &RetryConfig) -> Result<Self> {
        let pool = with_retry(retry, "Database connection", || async {
            PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await
                .context("Failed to connect to PostgreSQL")
        })
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY,
                data BYTEA NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .context("Failed to create blobs table")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl BlobStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT data FROM blobs WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Failed to read blob '{}'", key))?;
        Ok(row.map(|(data,)| data))
    }

    async fn set(&self, key: &str, data: &[u8]) -> Result<()> {
        sqlx::query(
            "INSERT INTO blobs (key, data, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at",
        )
        .bind(key)
        .bind(data)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context(format!("Failed to write blob '{}'", key))?;
        Ok(())
    }

    fn describe(&self) -> String {
        "PostgreSQL".to_string()
    }
}

// ==================== No-op ====================

/// Persists nothing; every `get` misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl BlobStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "no-op (nothing persisted)".to_string()
    }
}

/// Pick a store for `location`.
pub async fn open_store(location: &str) -> Result<Box<dyn BlobStore>> {
    let location = location.trim();

    if location.starts_with("postgres://") || location.starts_with("postgresql://") {
        let store = PostgresStore::connect(location, &RetryConfig::database()).await?;
        return Ok(Box::new(store));
    }

    if !location.is_empty() && Path::new(location).is_dir() {
        return Ok(Box::new(LocalStore::new(location)?));
    }

    if !location.is_empty() {
        warn!(
            "DATASTORE_PATH '{}' is neither a database URL nor a directory; channel settings will not be persisted",
            location
        );
    }
    Ok(Box::new(NoopStore))
}

/// Build a registry from the stored snapshot.
///
/// A missing blob gives an empty registry. Any other failure (unreadable
/// store, corrupt blob, unknown language) is returned so the caller never
/// runs, and later saves, a registry that does not reflect what was stored.
pub async fn restore_registry(
    store: &dyn BlobStore,
    builder: Arc<dyn EngineBuilder>,
) -> Result<ChannelRegistry> {
    let mut registry = ChannelRegistry::new(builder);
    match store.get(REGISTRY_KEY).await? {
        Some(bytes) => {
            registry
                .hydrate(&bytes)
                .context("Failed to restore channel registry")?;
            info!(
                "Loaded {} auto-translation channels from {}",
                registry.len(),
                store.describe()
            );
        }
        None => info!("No saved channel registry in {}; starting empty", store.describe()),
    }
    Ok(registry)
}

/// Serialize `registry` and write it to the store.
pub async fn save_registry(store: &dyn BlobStore, registry: &ChannelRegistry) -> Result<()> {
    let bytes = registry.serialize()?;
    store.set(REGISTRY_KEY, &bytes).await?;
    info!(
        "Saved {} auto-translation channels to {}",
        registry.len(),
        store.describe()
    );
    Ok(())
}
