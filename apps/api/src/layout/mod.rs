// Letter pagination engine.
// Normalizer -> Packer -> Flagger: a pure, synchronous pipeline from letter HTML to pages.
// HTML parsing is CPU-bound and not Send; callers run it inside tokio::task::spawn_blocking.

pub mod cache;
pub mod config;
pub mod normalizer;
pub mod packer;
pub mod regions;

use serde::{Deserialize, Serialize};

pub use cache::LayoutCache;
pub use config::{PaginationConfig, PaginationOverrides};
pub use packer::PageDescriptor;

/// The laid-out letter body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub pages: Vec<PageDescriptor>,
    /// Estimated lines of the closing block, 0 when there is none.
    pub closing_line_cost: u32,
    /// True when the closing block is larger than `closing_reserve`.
    pub closing_exceeds_reserve: bool,
}

/// Lays out a letter body across pages. Deterministic; never fails.
pub fn paginate(body: &str, closing: &str, config: &PaginationConfig) -> Pagination {
    let blocks = normalizer::normalize(body, config.chars_per_line);
    let closing_block = normalizer::normalize_closing(closing, config.chars_per_line);

    let packed = packer::pack(&blocks, closing_block.as_ref(), config);
    let pages = regions::flag(packer::number_pages(packed));

    let closing_line_cost = closing_block.as_ref().map_or(0, |b| b.line_cost);
    Pagination {
        pages,
        closing_line_cost,
        closing_exceeds_reserve: closing_line_cost > config.closing_reserve,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
