//! Named response stores backing the offline cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::Response;

/// Entries older than this are flagged stale in status output. Nothing is
/// evicted on age.
const CACHE_STALE_MINUTES: i64 = 60 * 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub type CachedResponse = CachedData<Response>;

/// Backend for named response stores keyed by request URL.
///
/// Implementations must tolerate concurrent access to different keys;
/// concurrent writes to the same key resolve as last write wins.
pub trait CacheStorage: Send + Sync {
    /// Open the store `name`, creating it if missing.
    fn open(&self, name: &str) -> Result<()>;

    /// Names of all existing stores.
    fn cache_names(&self) -> Result<Vec<String>>;

    /// Delete a store and all of its entries. Returns whether it existed.
    fn delete_cache(&self, name: &str) -> Result<bool>;

    fn get(&self, name: &str, key: &str) -> Result<Option<CachedResponse>>;

    /// Store a response, creating the store if needed.
    fn put(&self, name: &str, key: &str, response: &Response) -> Result<()>;

    /// All entries of a store, ordered by key.
    fn entries(&self, name: &str) -> Result<Vec<(String, CachedResponse)>>;
}

// ============================================================================
// In-memory storage
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    caches: RwLock<HashMap<String, HashMap<String, CachedResponse>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, HashMap<String, CachedResponse>>> {
        self.caches.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, HashMap<String, CachedResponse>>> {
        self.caches.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStorage for MemoryStorage {
    fn open(&self, name: &str) -> Result<()> {
        self.write().entry(name.to_string()).or_default();
        Ok(())
    }

    fn cache_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn delete_cache(&self, name: &str) -> Result<bool> {
        Ok(self.write().remove(name).is_some())
    }

    fn get(&self, name: &str, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self
            .read()
            .get(name)
            .and_then(|cache| cache.get(key))
            .cloned())
    }

    fn put(&self, name: &str, key: &str, response: &Response) -> Result<()> {
        self.write()
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), CachedData::new(response.clone()));
        Ok(())
    }

    fn entries(&self, name: &str) -> Result<Vec<(String, CachedResponse)>> {
        let mut entries: Vec<(String, CachedResponse)> = self
            .read()
            .get(name)
            .map(|cache| cache.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

// ============================================================================
// On-disk storage
// ============================================================================

#[derive(Serialize, Deserialize)]
struct DiskEntry {
    key: String,
    #[serde(flatten)]
    cached: CachedResponse,
}

/// One directory per store under `root`, one JSON file per entry.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            anyhow::bail!("Invalid cache name: {:?}", name);
        }
        Ok(self.root.join(name))
    }

    fn entry_path(&self, name: &str, key: &str) -> Result<PathBuf> {
        Ok(self
            .cache_dir(name)?
            .join(format!("{}.json", entry_file_stem(key))))
    }

    fn read_entry(path: &std::path::Path) -> Result<DiskEntry> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache entry: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", path.display()))
    }
}

/// Distinguishes temp files of concurrent writers within this process
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// SHA256 of the key, hex encoded: stable, fixed-length file names.
fn entry_file_stem(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

impl CacheStorage for DiskStorage {
    fn open(&self, name: &str) -> Result<()> {
        let dir = self.cache_dir(name)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to open cache: {}", name))?;
        Ok(())
    }

    fn cache_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).context("Failed to list caches")? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_cache(&self, name: &str) -> Result<bool> {
        let dir = self.cache_dir(name)?;
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to delete cache: {}", name))?;
        debug!(cache = name, "Deleted cache directory");
        Ok(true)
    }

    fn get(&self, name: &str, key: &str) -> Result<Option<CachedResponse>> {
        let path = self.entry_path(name, key)?;
        if !path.exists() {
            return Ok(None);
        }
        let entry = Self::read_entry(&path)?;
        if entry.key != key {
            return Ok(None);
        }
        Ok(Some(entry.cached))
    }

    fn put(&self, name: &str, key: &str, response: &Response) -> Result<()> {
        self.open(name)?;
        let path = self.entry_path(name, key)?;
        let entry = DiskEntry {
            key: key.to_string(),
            cached: CachedData::new(response.clone()),
        };
        let contents = serde_json::to_string_pretty(&entry)?;
        // Write then rename so readers never see a partial entry. Each
        // writer gets its own temp file; the last rename wins.
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}-{}.tmp", std::process::id(), seq));
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache entry for {}", key))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to write cache entry for {}", key));
        }
        Ok(())
    }

    fn entries(&self, name: &str) -> Result<Vec<(String, CachedResponse)>> {
        let dir = self.cache_dir(name)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir).with_context(|| format!("Failed to list cache: {}", name))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let entry = Self::read_entry(&path)?;
            entries.push((entry.key, entry.cached));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_dir;
    use chrono::Duration;

    fn response(body: &str) -> Response {
        Response::new("http://localhost:3000/", 200, body)
    }

    fn exercise(storage: &dyn CacheStorage) {
        storage.open("smartneighbor-v2").unwrap();
        storage.open("smartneighbor-v3").unwrap();
        assert_eq!(
            storage.cache_names().unwrap(),
            vec!["smartneighbor-v2".to_string(), "smartneighbor-v3".to_string()]
        );

        let key = "http://localhost:3000/dashboard";
        assert!(storage.get("smartneighbor-v3", key).unwrap().is_none());

        storage.put("smartneighbor-v3", key, &response("first")).unwrap();
        storage.put("smartneighbor-v3", key, &response("second")).unwrap();
        let cached = storage.get("smartneighbor-v3", key).unwrap().unwrap();
        assert_eq!(cached.data.text(), "second");

        // Stores are independent
        assert!(storage.get("smartneighbor-v2", key).unwrap().is_none());

        assert!(storage.delete_cache("smartneighbor-v2").unwrap());
        assert!(!storage.delete_cache("smartneighbor-v2").unwrap());
        assert_eq!(storage.cache_names().unwrap(), vec!["smartneighbor-v3".to_string()]);

        let entries = storage.entries("smartneighbor-v3").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, key);
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn test_disk_storage() {
        let dir = test_dir("disk-storage");
        let storage = DiskStorage::new(dir.clone()).unwrap();
        exercise(&storage);

        // Survives reopening
        let reopened = DiskStorage::new(dir.clone()).unwrap();
        let cached = reopened
            .get("smartneighbor-v3", "http://localhost:3000/dashboard")
            .unwrap()
            .unwrap();
        assert_eq!(cached.data.text(), "second");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_disk_storage_rejects_path_names() {
        let dir = test_dir("disk-names");
        let storage = DiskStorage::new(dir.clone()).unwrap();
        assert!(storage.open("../escape").is_err());
        assert!(storage.open("").is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_put_creates_missing_store() {
        let storage = MemoryStorage::new();
        storage.put("fresh", "http://localhost:3000/", &response("x")).unwrap();
        assert_eq!(storage.cache_names().unwrap(), vec!["fresh".to_string()]);
    }

    #[test]
    fn test_age_display() {
        let mut cached = CachedData::new(());
        assert_eq!(cached.age_display(), "just now");
        assert!(!cached.is_stale());

        cached.cached_at = Utc::now() - Duration::minutes(45);
        assert_eq!(cached.age_display(), "45m ago");

        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(cached.age_display(), "3d ago");
        assert!(cached.is_stale());

        // Clock skew
        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_entry_file_names() {
        let dir = test_dir("disk-file-names");
        let storage = DiskStorage::new(dir.clone()).unwrap();
        let path = storage
            .entry_path("smartneighbor-v3", "http://localhost:3000/")
            .unwrap();
        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert_eq!(stem.len(), 64);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(
            entry_file_stem("http://localhost:3000/"),
            entry_file_stem("http://localhost:3000/dashboard")
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_disk_concurrent_same_key_puts() {
        let dir = test_dir("disk-concurrent");
        let storage = DiskStorage::new(dir.clone()).unwrap();
        let key = "http://localhost:3000/dashboard";

        for round in 0..20 {
            let failures: usize = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|i| {
                        let storage = &storage;
                        scope.spawn(move || {
                            let body = format!("round {} writer {}", round, i);
                            storage.put("smartneighbor-v3", key, &response(&body)).is_err() as usize
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).sum()
            });
            assert_eq!(failures, 0, "round {}", round);

            let cached = storage.get("smartneighbor-v3", key).unwrap().unwrap();
            assert!(cached.data.text().starts_with(&format!("round {} writer", round)));
        }

        // No temp files are left behind
        let entries = storage.entries("smartneighbor-v3").unwrap();
        assert_eq!(entries.len(), 1);
        let files = std::fs::read_dir(dir.join("smartneighbor-v3")).unwrap().count();
        assert_eq!(files, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
