//! Memoization of pagination results for the editor's preview loop.
//!
//! The engine is stateless; this layer sits in front of it. Entries are keyed on the full
//! letter body, closing and config, so a lookup can never return another letter's layout.
//! The least recently used layout is evicted first.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use crate::layout::config::PaginationConfig;
use crate::layout::Pagination;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LayoutKey {
    body: String,
    closing: String,
    config: PaginationConfig,
}

type Entries = LruCache<LayoutKey, Arc<Pagination>>;

pub struct LayoutCache {
    /// `None` when caching is disabled.
    entries: Option<Mutex<Entries>>,
}

impl LayoutCache {
    /// A cache holding at most `capacity` layouts. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| lock(entries).len())
    }

    /// Returns the cached layout for these inputs, or runs `compute` and stores it.
    ///
    /// `compute` runs outside the lock.
    pub fn get_or_compute<F>(
        &self,
        body: &str,
        closing: &str,
        config: &PaginationConfig,
        compute: F,
    ) -> Arc<Pagination>
    where
        F: FnOnce() -> Pagination,
    {
        let Some(entries) = &self.entries else {
            return Arc::new(compute());
        };

        let key = LayoutKey {
            body: body.to_string(),
            closing: closing.to_string(),
            config: *config,
        };

        if let Some(layout) = lock(entries).get(&key).cloned() {
            debug!(body_len = body.len(), "Layout cache hit");
            return layout;
        }

        let layout = Arc::new(compute());
        lock(entries).put(key, Arc::clone(&layout));
        layout
    }
}

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::paginate;
    use std::cell::Cell;

    fn compute_counted(calls: &Cell<u32>, body: &str) -> Pagination {
        calls.set(calls.get() + 1);
        paginate(body, "", &PaginationConfig::default())
    }

    #[test]
    fn test_hit_returns_same_layout_without_recompute() {
        let cache = LayoutCache::new(4);
        let calls = Cell::new(0);
        let config = PaginationConfig::default();

        let first = cache.get_or_compute("<p>a</p>", "", &config, || {
            compute_counted(&calls, "<p>a</p>")
        });
        let second = cache.get_or_compute("<p>a</p>", "", &config, || {
            compute_counted(&calls, "<p>a</p>")
        });

        assert_eq!(calls.get(), 1);
        assert_eq!(*first, *second);
        assert_eq!(*first, paginate("<p>a</p>", "", &config));
    }

    #[test]
    fn test_config_change_is_a_miss() {
        let cache = LayoutCache::new(4);
        let calls = Cell::new(0);
        let narrow = PaginationConfig {
            chars_per_line: 40,
            ..PaginationConfig::default()
        };

        cache.get_or_compute("<p>a</p>", "", &PaginationConfig::default(), || {
            compute_counted(&calls, "<p>a</p>")
        });
        cache.get_or_compute("<p>a</p>", "", &narrow, || {
            compute_counted(&calls, "<p>a</p>")
        });

        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_oldest_entry_evicted_at_capacity() {
        let cache = LayoutCache::new(2);
        let calls = Cell::new(0);
        let config = PaginationConfig::default();

        for body in ["<p>1</p>", "<p>2</p>", "<p>3</p>"] {
            cache.get_or_compute(body, "", &config, || compute_counted(&calls, body));
        }
        assert_eq!(cache.len(), 2);

        // "<p>1</p>" was evicted and must be recomputed.
        cache.get_or_compute("<p>1</p>", "", &config, || {
            compute_counted(&calls, "<p>1</p>")
        });
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_recently_used_entry_survives_eviction() {
        let cache = LayoutCache::new(2);
        let calls = Cell::new(0);
        let config = PaginationConfig::default();

        for body in ["<p>1</p>", "<p>2</p>", "<p>1</p>", "<p>3</p>"] {
            cache.get_or_compute(body, "", &config, || compute_counted(&calls, body));
        }
        assert_eq!(calls.get(), 3);

        // "<p>1</p>" was touched before "<p>3</p>" arrived, so "<p>2</p>" went instead.
        cache.get_or_compute("<p>1</p>", "", &config, || {
            compute_counted(&calls, "<p>1</p>")
        });
        assert_eq!(calls.get(), 3);
        cache.get_or_compute("<p>2</p>", "", &config, || {
            compute_counted(&calls, "<p>2</p>")
        });
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let cache = LayoutCache::new(0);
        let calls = Cell::new(0);
        let config = PaginationConfig::default();
        for _ in 0..3 {
            cache.get_or_compute("<p>a</p>", "", &config, || {
                compute_counted(&calls, "<p>a</p>")
            });
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.len(), 0);
    }
}
