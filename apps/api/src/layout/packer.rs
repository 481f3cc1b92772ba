//! Page Packer — greedy first-fit assignment of blocks to pages.
//!
//! # Capacity rules
//! - Page 1 gets `first_page_capacity`, every later page `middle_page_capacity`.
//! - When everything still to be placed (current block included) fits within the nominal
//!   capacity of the page being built, and no page-break marker lies ahead, that page may be
//!   the last one: its capacity drops by `closing_reserve` so the closing block has room.
//! - The look-ahead compares against the nominal capacity only. The reserve is never
//!   chained across pages.
//! - A block that does not fit on an empty page is placed anyway (accepted overflow).
//!   No content is ever dropped.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::config::PaginationConfig;
use crate::layout::normalizer::Block;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One page's worth of blocks, before numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedPage {
    pub content: String,
    pub line_count: u32,
    pub block_count: usize,
    /// Effective capacity in force when the last block was placed.
    pub line_capacity: u32,
    /// True when an oversized block was accepted past the capacity.
    pub overflowed: bool,
}

impl PackedPage {
    fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    fn place(&mut self, block: &Block, capacity: u32) {
        self.content.push_str(&block.markup);
        self.line_count += block.line_cost;
        self.block_count += 1;
        self.line_capacity = capacity;
    }
}

/// A printable page as handed to the renderer.
///
/// `show_*` region flags are filled in by `layout::regions::flag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    /// 1-based position in the page sequence.
    pub page_number: usize,
    pub content: String,
    pub line_count: u32,
    pub line_capacity: u32,
    pub block_count: usize,
    pub overflowed: bool,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub show_meta: bool,
    pub show_recipient: bool,
    pub show_subject: bool,
    pub show_salutation: bool,
    pub show_closing: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Packing
// ────────────────────────────────────────────────────────────────────────────

/// Assigns blocks to pages in order. Always returns at least one page.
///
/// `closing` is only inspected to report when it will not fit in the reserve;
/// it is rendered by the closing region, not packed into page content.
pub fn pack(
    blocks: &[Block],
    closing: Option<&Block>,
    config: &PaginationConfig,
) -> Vec<PackedPage> {
    if let Some(closing) = closing {
        if closing.line_cost > config.closing_reserve {
            warn!(
                closing_lines = closing.line_cost,
                reserve = config.closing_reserve,
                "Closing block is larger than the reserved space; last page may overflow"
            );
        }
    }

    if blocks.iter().all(Block::is_page_break) {
        return vec![PackedPage {
            line_capacity: config
                .first_page_capacity
                .saturating_sub(config.closing_reserve),
            ..PackedPage::default()
        }];
    }

    let remaining_cost = remaining_costs(blocks);

    let mut pages: Vec<PackedPage> = Vec::new();
    let mut current = PackedPage::default();
    let mut building_first = true;
    let mut i = 0;

    while i < blocks.len() {
        let block = &blocks[i];

        if block.is_page_break() {
            if !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                building_first = false;
            }
            i += 1;
            continue;
        }

        let nominal = config.nominal_capacity(building_first);
        let may_be_last = remaining_cost[i].is_some_and(|cost| cost <= nominal);
        let effective = if may_be_last {
            nominal.saturating_sub(config.closing_reserve)
        } else {
            nominal
        };

        if current.line_count + block.line_cost <= effective {
            current.place(block, effective);
            i += 1;
        } else if current.is_empty() {
            warn!(
                block_index = i,
                line_cost = block.line_cost,
                capacity = effective,
                "Block exceeds page capacity; placing it alone on its page"
            );
            current.place(block, effective);
            current.overflowed = true;
            pages.push(std::mem::take(&mut current));
            building_first = false;
            i += 1;
        } else {
            // Block retried against a fresh page on the next iteration.
            pages.push(std::mem::take(&mut current));
            building_first = false;
        }
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    pages
}

/// Final pass: page numbers and first/last markers once the total is known.
pub fn number_pages(packed: Vec<PackedPage>) -> Vec<PageDescriptor> {
    let total = packed.len();
    packed
        .into_iter()
        .enumerate()
        .map(|(index, page)| PageDescriptor {
            page_number: index + 1,
            content: page.content,
            line_count: page.line_count,
            line_capacity: page.line_capacity,
            block_count: page.block_count,
            overflowed: page.overflowed,
            is_first_page: index == 0,
            is_last_page: index + 1 == total,
            show_meta: false,
            show_recipient: false,
            show_subject: false,
            show_salutation: false,
            show_closing: false,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// `out[i]` = total line cost of `blocks[i..]`, or `None` when a page-break marker lies
/// ahead (the remainder can then never share a page).
fn remaining_costs(blocks: &[Block]) -> Vec<Option<u32>> {
    let mut out = vec![None; blocks.len()];
    let mut acc = Some(0u32);
    for (i, block) in blocks.iter().enumerate().rev() {
        acc = match acc {
            Some(_) if block.is_page_break() => None,
            Some(total) => Some(total.saturating_add(block.line_cost)),
            None => None,
        };
        out[i] = acc;
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
