//! Content-addressed composition cache.
//!
//! [`CacheStore`] is the key-value collaborator (bytes with expiry);
//! [`CompositionCache`] layers typed plan entries, TTL policy and corruption
//! handling on top of it. Two stores ship with the crate: an in-memory map
//! and a directory of JSON files written atomically.

use crate::config::{CacheConfig, MAX_CACHE_TTL_HOURS, MAX_FALLBACK_TTL_MINUTES};
use crate::types::*;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;

/// Key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Ten years; longer TTLs are clamped
const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 3600;

fn expiry_after(ttl_seconds: u64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64)
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Clone, Debug)]
struct MemoryValue {
    bytes: Vec<u8>,
    expires_at: DateTime<Utc>,
}

/// Process-local store, used for tests and `backend = "memory"`
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, MemoryValue>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove entries expired as of `now`, returning how many were removed
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, v| now <= v.expires_at);
        before - entries.len()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(v) if now <= v.expires_at => return Ok(Some(v.bytes.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it so the map does not grow without bound
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|v| now > v.expires_at) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MemoryValue {
                bytes: value,
                expires_at: expiry_after(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// File store
// ============================================================================

/// On-disk wrapper around a stored value
#[derive(Debug, Serialize, Deserialize)]
struct FileEnvelope {
    expires_at: DateTime<Utc>,
    payload: String,
}

/// One JSON file per key under a directory
///
/// Writes go to a locked temp file in the same directory, are synced, then
/// renamed over the target, so readers see either the old entry or the new
/// one.
#[derive(Clone, Debug)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Cache(format!("invalid cache key {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Remove expired and unreadable entries, returning how many were removed
    pub async fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(Utc::now()).await
    }

    /// Remove entries expired as of `now` and any unreadable files
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let dir = self.dir.clone();
        run_blocking(move || purge_dir(&dir, now)).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Cache(format!("cache task failed: {}", e)))?
}

fn read_envelope(path: &Path) -> Result<Option<FileEnvelope>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_envelope(path: &Path, envelope: &FileEnvelope) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Cache(format!("cache path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(serde_json::to_string(envelope)?.as_bytes())?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn purge_dir(dir: &Path, now: DateTime<Utc>) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stale = match read_envelope(&path) {
            Ok(Some(envelope)) => now > envelope.expires_at,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Removing unreadable cache file {:?}: {}", path, e);
                true
            }
        };
        if stale {
            remove_if_present(&path)?;
            removed += 1;
        }
    }

    tracing::info!("Purged {} cache entries from {:?}", removed, dir);
    Ok(removed)
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        run_blocking(move || match read_envelope(&path)? {
            Some(envelope) if Utc::now() > envelope.expires_at => {
                remove_if_present(&path)?;
                Ok(None)
            }
            Some(envelope) => Ok(Some(envelope.payload.into_bytes())),
            None => Ok(None),
        })
        .await
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()> {
        let path = self.path_for(key)?;
        let payload = String::from_utf8(value)
            .map_err(|e| Error::Cache(format!("cache payload is not UTF-8: {}", e)))?;
        let envelope = FileEnvelope {
            expires_at: expiry_after(ttl_seconds),
            payload,
        };
        run_blocking(move || write_envelope(&path, &envelope)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        run_blocking(move || remove_if_present(&path)).await
    }
}

// ============================================================================
// Composition cache
// ============================================================================

/// Diagnostic fields stored with an entry; never part of the lookup
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheAudit {
    pub goal: Goal,
    pub structure: TrainingStructure,
    pub focus: FocusArea,
    pub seed: u64,
    pub schema_version: String,
}

impl CacheAudit {
    pub fn from_blueprint(blueprint: &Blueprint) -> Self {
        Self {
            goal: blueprint.goal,
            structure: blueprint.structure,
            focus: blueprint.focus,
            seed: blueprint.seed,
            schema_version: blueprint.schema_version.clone(),
        }
    }
}

/// A cached plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub inputs_hash: String,
    pub plan: WorkoutPlan,
    pub provenance: PlanProvenance,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub audit: CacheAudit,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Typed plan cache over a [`CacheStore`]
///
/// Generated plans live for `ttl`; fallback plans for the shorter
/// `fallback_ttl` so a transient outage is not pinned for a whole day.
#[derive(Clone)]
pub struct CompositionCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    fallback_ttl: Duration,
}

impl CompositionCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration, fallback_ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            fallback_ttl,
        }
    }

    /// Build from configuration; TTLs beyond the configured caps are clamped
    pub fn from_config(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        let hours = config.ttl_hours.min(MAX_CACHE_TTL_HOURS) as i64;
        let minutes = config.fallback_ttl_minutes.min(MAX_FALLBACK_TTL_MINUTES) as i64;
        let ttl = Duration::try_hours(hours).unwrap_or_else(|| Duration::hours(24));
        let fallback_ttl = Duration::try_minutes(minutes).unwrap_or_else(|| Duration::minutes(30));
        Self::new(store, ttl, fallback_ttl)
    }

    /// Cache backed by a fresh in-memory store with default TTLs
    pub fn in_memory() -> Self {
        Self::from_config(Arc::new(MemoryCacheStore::new()), &CacheConfig::default())
    }

    pub fn ttl_for(&self, provenance: PlanProvenance) -> Duration {
        match provenance {
            PlanProvenance::Generated => self.ttl,
            PlanProvenance::Fallback => self.fallback_ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.get_at(key, Utc::now()).await
    }

    /// Look up a live entry as of `now`
    ///
    /// Store failures and corrupt entries are misses; corrupt entries are
    /// also deleted.
    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding corrupt cache entry {}: {}", key, e);
                self.invalidate(key).await;
                return None;
            }
        };

        if entry.inputs_hash != key {
            tracing::warn!("Cache entry under {} belongs to {}", key, entry.inputs_hash);
            self.invalidate(key).await;
            return None;
        }
        if entry.is_expired_at(now) {
            tracing::debug!("Cache entry {} expired at {}", key, entry.expires_at);
            return None;
        }
        Some(entry)
    }

    pub async fn put(
        &self,
        key: &str,
        plan: WorkoutPlan,
        provenance: PlanProvenance,
        audit: CacheAudit,
    ) -> Result<CacheEntry> {
        self.put_at(key, plan, provenance, audit, Utc::now()).await
    }

    /// Store a plan created at `now`, replacing any previous entry
    pub async fn put_at(
        &self,
        key: &str,
        plan: WorkoutPlan,
        provenance: PlanProvenance,
        audit: CacheAudit,
        now: DateTime<Utc>,
    ) -> Result<CacheEntry> {
        let ttl = self.ttl_for(provenance);
        let entry = CacheEntry {
            inputs_hash: key.to_string(),
            plan,
            provenance,
            created_at: now,
            expires_at: now + ttl,
            audit,
        };

        let bytes = serde_json::to_vec(&entry)?;
        let ttl_seconds = u64::try_from(ttl.num_seconds()).unwrap_or(0);
        self.store.put(key, bytes, ttl_seconds).await?;

        tracing::debug!(
            "Cached {:?} plan under {} until {}",
            provenance,
            key,
            entry.expires_at
        );
        Ok(entry)
    }

    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!("Failed to delete cache entry {}: {}", key, e);
        }
    }
}
