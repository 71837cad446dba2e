//! The reference-counted classpath-scan cache.

use crate::key::{canonical_urls, classpath_key};
use crate::scanner::{ClasspathScanner, ScanResult};
use langsrv_error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct Entry {
    scan: Arc<ScanResult>,
    url_set: HashSet<PathBuf>,
    refcount: usize,
}

/// A handle to a (possibly shared) classpath scan. Every `acquire` must
/// be paired with a [`ClasspathScanCache::release`] of the handle it
/// returned.
#[derive(Clone)]
pub struct ScanHandle {
    pub key: String,
    pub scan: Arc<ScanResult>,
    /// `Some(paths)` when this scan was reused from a broader classpath
    /// than the requester's own — downstream symbol lookups must filter
    /// to these paths (plus runtime symbols) so they don't leak another
    /// scope's classes into this one.
    pub own_files: Option<HashSet<PathBuf>>,
}

/// Process-wide cache of external classpath scans, reused across scopes
/// whose classpaths are identical, one a superset of the other, or
/// sufficiently overlapping.
pub struct ClasspathScanCache {
    entries: Mutex<HashMap<String, Entry>>,
    cache_dir: Option<PathBuf>,
    persist_to_disk: bool,
    overlap_threshold: f64,
}

impl ClasspathScanCache {
    pub fn new(cache_dir: Option<PathBuf>, persist_to_disk: bool, overlap_threshold: f64) -> Self {
        Self { entries: Mutex::new(HashMap::new()), cache_dir, persist_to_disk, overlap_threshold }
    }

    /// `<user cache dir>/.<product>/cache/classgraph/`.
    pub fn default_cache_dir(product: &str) -> Option<PathBuf> {
        dirs::cache_dir().map(|base| base.join(format!(".{product}")).join("cache").join("classgraph"))
    }

    pub fn acquire(&self, urls: &[PathBuf], scanner: &dyn ClasspathScanner) -> CoreResult<ScanHandle> {
        let requested_set: HashSet<PathBuf> = canonical_urls(urls).into_iter().collect();
        let key = classpath_key(urls);

        {
            let mut entries = self.entries.lock();

            if let Some(entry) = entries.get_mut(&key) {
                entry.refcount += 1;
                return Ok(ScanHandle { key, scan: entry.scan.clone(), own_files: None });
            }

            let superset_key = entries
                .iter()
                .find(|(_, e)| e.url_set.len() > requested_set.len() && requested_set.is_subset(&e.url_set))
                .map(|(k, _)| k.clone());
            if let Some(found) = superset_key {
                if let Some(entry) = entries.get_mut(&found) {
                    entry.refcount += 1;
                    return Ok(ScanHandle { key: found, scan: entry.scan.clone(), own_files: Some(requested_set) });
                }
            }

            if !requested_set.is_empty() {
                let best = entries
                    .iter()
                    .map(|(k, e)| {
                        let overlap = requested_set.intersection(&e.url_set).count();
                        (k.clone(), overlap as f64 / requested_set.len() as f64)
                    })
                    .max_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((found, ratio)) = best {
                    if ratio >= self.overlap_threshold {
                        if let Some(entry) = entries.get_mut(&found) {
                            entry.refcount += 1;
                            return Ok(ScanHandle { key: found, scan: entry.scan.clone(), own_files: Some(requested_set) });
                        }
                    }
                }
            }
        }

        // Scanning can hit disk or spawn an external process; never do it
        // while holding the cache's own lock.
        let scan = self.load_or_scan(&key, &requested_set, scanner)?;

        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(&key) {
            // Another acquire raced us to the same miss; join it instead
            // of overwriting its (identical) scan.
            entry.refcount += 1;
            return Ok(ScanHandle { key, scan: entry.scan.clone(), own_files: None });
        }
        entries.insert(key.clone(), Entry { scan: scan.clone(), url_set: requested_set, refcount: 1 });
        Ok(ScanHandle { key, scan, own_files: None })
    }

    pub fn release(&self, handle: &ScanHandle) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(&handle.key) {
            entry.refcount = entry.refcount.saturating_sub(1);
            if entry.refcount == 0 {
                entries.remove(&handle.key);
            }
        }
    }

    /// Drops every cached scan whose classpath contains a path under
    /// `project_root`, and deletes their disk-persisted copies.
    pub fn invalidate_under(&self, project_root: &Path) {
        let mut entries = self.entries.lock();
        let stale: Vec<String> =
            entries.iter().filter(|(_, e)| e.url_set.iter().any(|p| p.starts_with(project_root))).map(|(k, _)| k.clone()).collect();
        for key in &stale {
            entries.remove(key);
        }
        drop(entries);

        if self.persist_to_disk {
            for key in &stale {
                if let Some(path) = self.disk_path(key) {
                    let _ = std::fs::remove_file(path);
                }
            }
        }
    }

    pub fn refcount(&self, key: &str) -> usize {
        self.entries.lock().get(key).map(|e| e.refcount).unwrap_or(0)
    }

    fn disk_path(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }

    fn load_or_scan(&self, key: &str, requested: &HashSet<PathBuf>, scanner: &dyn ClasspathScanner) -> CoreResult<Arc<ScanResult>> {
        if self.persist_to_disk {
            if let Some(path) = self.disk_path(key) {
                match std::fs::read(&path) {
                    Ok(bytes) => match serde_json::from_slice::<ScanResult>(&bytes) {
                        Ok(result) => return Ok(Arc::new(result)),
                        Err(err) => {
                            tracing::warn!(classpath_key = key, error = %err, "corrupt classpath cache entry, discarding");
                            let _ = std::fs::remove_file(&path);
                        }
                    },
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => return Err(CoreError::io(path, err)),
                }
            }
        }

        let urls: Vec<PathBuf> = requested.iter().cloned().collect();
        let result = scanner.scan(&urls)?;

        if self.persist_to_disk {
            if let Some(path) = self.disk_path(key) {
                if let Err(err) = write_atomic(&path, &result) {
                    tracing::warn!(classpath_key = key, error = %err, "failed to persist classpath cache entry");
                }
            }
        }

        Ok(Arc::new(result))
    }
}

fn write_atomic(path: &Path, value: &ScanResult) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec(value).map_err(std::io::Error::other)?;
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ClasspathSymbol, SymbolKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingScanner {
        calls: AtomicUsize,
    }

    impl ClasspathScanner for CountingScanner {
        fn scan(&self, urls: &[PathBuf]) -> CoreResult<ScanResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ScanResult {
                symbols: urls
                    .iter()
                    .map(|p| ClasspathSymbol {
                        simple_name: "Foo".to_string(),
                        qualified_name: "pkg.Foo".to_string(),
                        package: "pkg".to_string(),
                        kind: SymbolKind::Class,
                        owning_path: Some(p.clone()),
                    })
                    .collect(),
            })
        }
    }

    #[test]
    fn exact_hit_reuses_scan_without_rescanning() {
        let cache = ClasspathScanCache::new(None, false, 0.9);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let urls = vec![PathBuf::from("/a"), PathBuf::from("/b")];

        let h1 = cache.acquire(&urls, &scanner).unwrap();
        let h2 = cache.acquire(&urls, &scanner).unwrap();
        assert_eq!(h1.key, h2.key);
        assert!(h2.own_files.is_none());
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.refcount(&h1.key), 2);
    }

    #[test]
    fn superset_hit_reuses_with_own_files_filter() {
        let cache = ClasspathScanCache::new(None, false, 0.9);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let wide = vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")];
        let narrow = vec![PathBuf::from("/a"), PathBuf::from("/b")];

        cache.acquire(&wide, &scanner).unwrap();
        let handle = cache.acquire(&narrow, &scanner).unwrap();
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1, "superset hit avoids a second scan");
        assert!(handle.own_files.is_some());
    }

    #[test]
    fn overlap_below_threshold_forces_a_rescan() {
        let cache = ClasspathScanCache::new(None, false, 0.90);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let a = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        let mostly_different = vec![PathBuf::from("/c"), PathBuf::from("/d"), PathBuf::from("/e")];

        cache.acquire(&a, &scanner).unwrap();
        cache.acquire(&mostly_different, &scanner).unwrap();
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn release_evicts_at_zero_refcount() {
        let cache = ClasspathScanCache::new(None, false, 0.9);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let urls = vec![PathBuf::from("/a")];
        let handle = cache.acquire(&urls, &scanner).unwrap();
        assert_eq!(cache.refcount(&handle.key), 1);
        cache.release(&handle);
        assert_eq!(cache.refcount(&handle.key), 0);
    }

    #[test]
    fn disk_persistence_round_trips_and_avoids_rescanning_after_eviction() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ClasspathScanCache::new(Some(dir.path().to_path_buf()), true, 0.9);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let urls = vec![PathBuf::from("/a")];

        let h1 = cache.acquire(&urls, &scanner).unwrap();
        cache.release(&h1);
        assert_eq!(cache.refcount(&h1.key), 0);

        let h2 = cache.acquire(&urls, &scanner).unwrap();
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1, "second acquire reads the persisted scan instead of rescanning");
        assert_eq!(h1.key, h2.key);
    }

    #[test]
    fn corrupt_disk_cache_is_discarded_and_treated_as_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ClasspathScanCache::new(Some(dir.path().to_path_buf()), true, 0.9);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let urls = vec![PathBuf::from("/a")];
        let key = classpath_key(&urls);
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join(format!("{key}.json")), b"not json").unwrap();

        let handle = cache.acquire(&urls, &scanner).unwrap();
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1);
        assert!(!handle.scan.symbols.is_empty());
    }

    #[test]
    fn invalidate_under_drops_matching_entries() {
        let cache = ClasspathScanCache::new(None, false, 0.9);
        let scanner = CountingScanner { calls: AtomicUsize::new(0) };
        let urls = vec![PathBuf::from("/project/lib/a.jar")];
        let handle = cache.acquire(&urls, &scanner).unwrap();
        cache.invalidate_under(Path::new("/project"));
        assert_eq!(cache.refcount(&handle.key), 0);
    }
}
