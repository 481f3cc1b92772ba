use std::str::FromStr;

use anyhow::{Context, Result};

use crate::layout::config::{
    PaginationConfig, DEFAULT_CHARS_PER_LINE, DEFAULT_CLOSING_RESERVE,
    DEFAULT_FIRST_PAGE_CAPACITY, DEFAULT_MIDDLE_PAGE_CAPACITY,
};

const DEFAULT_LAYOUT_CACHE_ENTRIES: usize = 32;
const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is set but unparseable, or the page geometry is invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default page geometry; requests may override it per call.
    pub layout: PaginationConfig,
    /// Memoized layouts kept for the editor preview loop. 0 disables the cache.
    pub layout_cache_entries: usize,
    /// Largest accepted `letterBody`, in bytes.
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let layout = PaginationConfig {
            first_page_capacity: env_or("LAYOUT_FIRST_PAGE_CAPACITY", DEFAULT_FIRST_PAGE_CAPACITY)?,
            middle_page_capacity: env_or(
                "LAYOUT_MIDDLE_PAGE_CAPACITY",
                DEFAULT_MIDDLE_PAGE_CAPACITY,
            )?,
            closing_reserve: env_or("LAYOUT_CLOSING_RESERVE", DEFAULT_CLOSING_RESERVE)?,
            chars_per_line: env_or("LAYOUT_CHARS_PER_LINE", DEFAULT_CHARS_PER_LINE)?,
        };
        layout
            .validate()
            .context("LAYOUT_* environment variables describe an invalid page geometry")?;

        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            layout,
            layout_cache_entries: env_or("LAYOUT_CACHE_ENTRIES", DEFAULT_LAYOUT_CACHE_ENTRIES)?,
            max_body_bytes: env_or("LETTER_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            layout: PaginationConfig::default(),
            layout_cache_entries: DEFAULT_LAYOUT_CACHE_ENTRIES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Reads and parses `key`, falling back to `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
