use std::sync::Arc;

use crate::config::Config;
use crate::layout::LayoutCache;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Memoized pagination results, shared across requests.
    pub layout_cache: Arc<LayoutCache>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let layout_cache = Arc::new(LayoutCache::new(config.layout_cache_entries));
        AppState {
            config,
            layout_cache,
        }
    }
}
