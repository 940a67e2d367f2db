//! Process-wide holder for the current `Dataset`.
//!
//! The dataset is loaded on first access and then reused until one of:
//! the entry is older than the TTL, the source file's modification time
//! changed, or a caller forces `refresh` / `invalidate`. Failed loads are
//! returned to the caller and never stored.

use crate::dataset::Dataset;
use crate::engine::MetricsEngine;
use crate::error::LoadError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug)]
struct CacheEntry {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
    source_modified: Option<SystemTime>,
}

#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    ttl: Duration,
    engine: MetricsEngine,
    slot: RwLock<Option<CacheEntry>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration, engine: MetricsEngine) -> Self {
        Self {
            path: path.into(),
            ttl,
            engine,
            slot: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The current dataset, loading it if the slot is empty or stale.
    ///
    /// Loading runs outside the lock. Two callers that both find the slot
    /// stale will both load; whichever stores last wins, and since loads are
    /// deterministic over the same file the results are interchangeable.
    pub fn get(&self) -> Result<Arc<Dataset>, LoadError> {
        {
            let slot = self.read_slot();
            if let Some(entry) = slot.as_ref() {
                if self.is_fresh(entry) {
                    tracing::debug!("Dataset cache hit.");
                    return Ok(Arc::clone(&entry.dataset));
                }
                tracing::debug!("Dataset cache entry is stale; reloading.");
            } else {
                tracing::debug!("Dataset cache is empty; loading.");
            }
        }
        self.reload()
    }

    /// Forces a reload regardless of freshness.
    pub fn refresh(&self) -> Result<Arc<Dataset>, LoadError> {
        tracing::info!(path = %self.path.display(), "Dataset refresh requested.");
        self.reload()
    }

    /// Drops the cached dataset; the next `get` loads again.
    pub fn invalidate(&self) {
        *self.write_slot() = None;
        tracing::debug!("Dataset cache invalidated.");
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot().is_some()
    }

    fn reload(&self) -> Result<Arc<Dataset>, LoadError> {
        let source_modified = modified_time(&self.path);
        let dataset = Arc::new(self.engine.load(&self.path)?);

        *self.write_slot() = Some(CacheEntry {
            dataset: Arc::clone(&dataset),
            loaded_at: Instant::now(),
            source_modified,
        });
        Ok(dataset)
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.loaded_at.elapsed() < self.ttl && modified_time(&self.path) == entry.source_modified
    }

    // A panic while holding the lock cannot leave a half-written entry: the
    // slot is only ever replaced whole.
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<CacheEntry>> {
        self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<CacheEntry>> {
        self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Date,Brand,ASIN,Amount,Sales,Price,Rate,产品支数,出墨方式,笔头类型,包装方式,线宽,是否双头,Ink_Color,价格档位";

    fn fixture() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "202401,Ohuhu,A1,100,10,10,0.5,12,Pump,Fine,Box,0.7mm,Yes,Black,Mid").unwrap();
        writeln!(file, "202402,Arteza,B1,50,5,10,0.4,24,Valve,Broad,Bag,2mm,No,24 Colors,Low").unwrap();
        file.flush().unwrap();
        file
    }

    fn cache(path: &Path, ttl: Duration) -> DatasetCache {
        DatasetCache::new(path, ttl, MetricsEngine::default())
    }

    #[test]
    fn second_get_within_ttl_is_the_same_dataset() {
        let file = fixture();
        let cache = cache(file.path(), Duration::from_secs(3600));

        assert!(!cache.is_loaded());
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.records().len(), 2);
    }

    #[test]
    fn refresh_builds_a_new_dataset() {
        let file = fixture();
        let cache = cache(file.path(), Duration::from_secs(3600));

        let first = cache.get().unwrap();
        let refreshed = cache.refresh().unwrap();
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert!(Arc::ptr_eq(&refreshed, &cache.get().unwrap()));
    }

    #[test]
    fn zero_ttl_reloads_every_time() {
        let file = fixture();
        let cache = cache(file.path(), Duration::ZERO);

        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_empties_the_slot() {
        let file = fixture();
        let cache = cache(file.path(), Duration::from_secs(3600));

        let first = cache.get().unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());
        assert!(!Arc::ptr_eq(&first, &cache.get().unwrap()));
    }

    #[test]
    fn changed_source_file_is_reloaded() {
        let file = fixture();
        let cache = cache(file.path(), Duration::from_secs(3600));

        let first = cache.get().unwrap();
        assert_eq!(first.records().len(), 2);
        let before = modified_time(file.path()).unwrap();

        let mut rewritten = fs::File::create(file.path()).unwrap();
        writeln!(rewritten, "{HEADER}").unwrap();
        writeln!(rewritten, "202401,Ohuhu,A1,100,10,10,0.5,12,Pump,Fine,Box,0.7mm,Yes,Black,Mid").unwrap();
        writeln!(rewritten, "202402,Ohuhu,A1,90,9,10,0.5,12,Pump,Fine,Box,0.7mm,Yes,Black,Mid").unwrap();
        writeln!(rewritten, "202403,Arteza,B1,50,5,10,0.4,24,Valve,Broad,Bag,2mm,No,24 Colors,Low").unwrap();
        rewritten.flush().unwrap();
        // Coarse filesystem clocks may not register a rewrite within the same tick.
        rewritten.set_modified(before + Duration::from_secs(10)).unwrap();
        drop(rewritten);

        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.records().len(), 3);
        assert_eq!(second.total_months(), 3);
        assert!(Arc::ptr_eq(&second, &cache.get().unwrap()));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.csv");
        let cache = cache(&path, Duration::from_secs(3600));

        assert!(matches!(cache.get(), Err(LoadError::NotFound(_))));
        assert!(!cache.is_loaded());

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "202401,Ohuhu,A1,100,10,10,0.5,12,Pump,Fine,Box,0.7mm,Yes,Black,Mid").unwrap();
        drop(file);

        assert_eq!(cache.get().unwrap().records().len(), 1);
    }
}
