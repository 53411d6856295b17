//! In-memory cache for the loaded price history.
//!
//! There is only ever one dataset, so the cache is a single slot. The slot's
//! lock is held while a fill runs: concurrent callers wait and then reuse the
//! stored result instead of issuing their own fetch.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::data::loader::Dataset;
use crate::error::PipelineError;

/// How a single lookup interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Return a fresh cached entry if present; otherwise load and store.
    #[default]
    Use,
    /// Always load, and store the new result.
    Refresh,
    /// Always load; neither read nor write the cache.
    Bypass,
}

/// Loader signature accepted by [`SeriesCache::get_or_load`].
pub type LoadFn<'a> = &'a dyn Fn() -> Result<Dataset, PipelineError>;

/// Cache seam for the query service.
pub trait SeriesCache {
    fn get_or_load(&self, mode: CacheMode, load: LoadFn<'_>) -> Result<Arc<Dataset>, PipelineError>;

    /// Drop any cached entry (manual cache bust).
    fn invalidate(&self);
}

#[derive(Debug)]
struct Entry {
    data: Arc<Dataset>,
    filled_at: Instant,
}

/// Single-slot cache with an optional time-to-live.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// `None` keeps the entry for the life of the process.
    ttl: Option<Duration>,
    slot: Mutex<Option<Entry>>,
}

impl MemoryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cache that keeps its entry until invalidated.
    pub fn for_process() -> Self {
        Self::new(None)
    }

    /// Whether a non-expired entry is present.
    pub fn is_warm(&self) -> bool {
        self.lock().as_ref().is_some_and(|entry| self.is_fresh(entry))
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => entry.filled_at.elapsed() < ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Entry>> {
        // A panic during a previous fill leaves the slot untouched; keep using it.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SeriesCache for MemoryCache {
    fn get_or_load(&self, mode: CacheMode, load: LoadFn<'_>) -> Result<Arc<Dataset>, PipelineError> {
        if mode == CacheMode::Bypass {
            tracing::debug!("cache bypassed");
            return load().map(Arc::new);
        }

        let mut slot = self.lock();

        if mode == CacheMode::Use {
            if let Some(entry) = slot.as_ref().filter(|entry| self.is_fresh(entry)) {
                tracing::debug!(age_ms = entry.filled_at.elapsed().as_millis() as u64, "cache hit");
                return Ok(Arc::clone(&entry.data));
            }
        }

        tracing::debug!(?mode, "cache fill");
        let data = Arc::new(load()?);
        *slot = Some(Entry {
            data: Arc::clone(&data),
            filled_at: Instant::now(),
        });
        Ok(data)
    }

    fn invalidate(&self) {
        tracing::debug!("cache invalidated");
        *self.lock() = None;
    }
}

/// Cache that never stores anything. Every lookup loads.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl SeriesCache for NoCache {
    fn get_or_load(&self, _mode: CacheMode, load: LoadFn<'_>) -> Result<Arc<Dataset>, PipelineError> {
        load().map(Arc::new)
    }

    fn invalidate(&self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::data::loader::LoadReport;
    use crate::domain::TimeSeries;

    fn dataset() -> Dataset {
        Dataset {
            series: TimeSeries::default(),
            report: LoadReport::default(),
            source: "test".to_string(),
        }
    }

    fn counting_load(counter: &AtomicUsize) -> impl Fn() -> Result<Dataset, PipelineError> + '_ {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(dataset())
        }
    }

    #[test]
    fn use_mode_returns_same_object_within_window() {
        let cache = MemoryCache::for_process();
        let calls = AtomicUsize::new(0);
        let load = counting_load(&calls);

        let a = cache.get_or_load(CacheMode::Use, &load).unwrap();
        let b = cache.get_or_load(CacheMode::Use, &load).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_warm());
    }

    #[test]
    fn expired_entries_are_reloaded() {
        let cache = MemoryCache::new(Some(Duration::ZERO));
        let calls = AtomicUsize::new(0);
        let load = counting_load(&calls);

        let a = cache.get_or_load(CacheMode::Use, &load).unwrap();
        let b = cache.get_or_load(CacheMode::Use, &load).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn refresh_replaces_and_bypass_does_not_store() {
        let cache = MemoryCache::for_process();
        let calls = AtomicUsize::new(0);
        let load = counting_load(&calls);

        let first = cache.get_or_load(CacheMode::Use, &load).unwrap();
        let refreshed = cache.get_or_load(CacheMode::Refresh, &load).unwrap();
        assert!(!Arc::ptr_eq(&first, &refreshed));

        let bypassed = cache.get_or_load(CacheMode::Bypass, &load).unwrap();
        assert!(!Arc::ptr_eq(&refreshed, &bypassed));

        let cached = cache.get_or_load(CacheMode::Use, &load).unwrap();
        assert!(Arc::ptr_eq(&refreshed, &cached));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let cache = MemoryCache::for_process();
        let calls = AtomicUsize::new(0);
        let load = counting_load(&calls);

        cache.get_or_load(CacheMode::Use, &load).unwrap();
        cache.invalidate();
        assert!(!cache.is_warm());
        cache.get_or_load(CacheMode::Use, &load).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let cache = MemoryCache::for_process();
        let failing = || -> Result<Dataset, PipelineError> { Err(PipelineError::Fetch("offline".to_string())) };
        assert!(cache.get_or_load(CacheMode::Use, &failing).is_err());
        assert!(!cache.is_warm());

        let calls = AtomicUsize::new(0);
        cache.get_or_load(CacheMode::Use, &counting_load(&calls)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_callers_share_one_fill() {
        let cache = Arc::new(MemoryCache::for_process());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    let load = || -> Result<Dataset, PipelineError> {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Ok(dataset())
                    };
                    cache.get_or_load(CacheMode::Use, &load).unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn no_cache_always_loads() {
        let calls = AtomicUsize::new(0);
        let load = counting_load(&calls);
        NoCache.get_or_load(CacheMode::Use, &load).unwrap();
        NoCache.get_or_load(CacheMode::Use, &load).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
