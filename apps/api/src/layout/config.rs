//! Pagination parameters for the letterhead page geometry.
//!
//! All four values encode assumptions about one font size and one printable page
//! (A4, letterhead header/footer, 11pt body). They are estimates in *rendered lines*,
//! not exact measurements, and must be retuned together if the template changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FIRST_PAGE_CAPACITY: u32 = 22;
pub const DEFAULT_MIDDLE_PAGE_CAPACITY: u32 = 35;
pub const DEFAULT_CLOSING_RESERVE: u32 = 10;
pub const DEFAULT_CHARS_PER_LINE: u32 = 90;

// ────────────────────────────────────────────────────────────────────────────
// Config type
// ────────────────────────────────────────────────────────────────────────────

/// Line budgets and text width used by the normalizer and the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Body lines available on page 1 (front matter takes the rest).
    pub first_page_capacity: u32,
    /// Body lines available on every following page.
    pub middle_page_capacity: u32,
    /// Lines held back on the final page for the closing and signature block.
    pub closing_reserve: u32,
    /// Characters that fit on one rendered line.
    pub chars_per_line: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            first_page_capacity: DEFAULT_FIRST_PAGE_CAPACITY,
            middle_page_capacity: DEFAULT_MIDDLE_PAGE_CAPACITY,
            closing_reserve: DEFAULT_CLOSING_RESERVE,
            chars_per_line: DEFAULT_CHARS_PER_LINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("closingReserve ({reserve}) must be smaller than middlePageCapacity ({capacity})")]
    ReserveTooLarge { reserve: u32, capacity: u32 },
}

impl PaginationConfig {
    /// Rejects geometries the packer cannot make progress with.
    ///
    /// A reserve equal to or above the full-page capacity would leave the last page with
    /// no room at all, so every final block would be an accepted overflow.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_page_capacity == 0 {
            return Err(ConfigError::Zero("firstPageCapacity"));
        }
        if self.middle_page_capacity == 0 {
            return Err(ConfigError::Zero("middlePageCapacity"));
        }
        if self.chars_per_line == 0 {
            return Err(ConfigError::Zero("charsPerLine"));
        }
        if self.closing_reserve >= self.middle_page_capacity {
            return Err(ConfigError::ReserveTooLarge {
                reserve: self.closing_reserve,
                capacity: self.middle_page_capacity,
            });
        }
        Ok(())
    }

    /// Nominal capacity of a page before any closing reserve is applied.
    pub fn nominal_capacity(&self, is_first_page: bool) -> u32 {
        if is_first_page {
            self.first_page_capacity
        } else {
            self.middle_page_capacity
        }
    }

    /// Returns a copy with every `Some` field of `overrides` applied, validated.
    pub fn with_overrides(&self, overrides: &PaginationOverrides) -> Result<Self, ConfigError> {
        let merged = Self {
            first_page_capacity: overrides
                .first_page_capacity
                .unwrap_or(self.first_page_capacity),
            middle_page_capacity: overrides
                .middle_page_capacity
                .unwrap_or(self.middle_page_capacity),
            closing_reserve: overrides.closing_reserve.unwrap_or(self.closing_reserve),
            chars_per_line: overrides.chars_per_line.unwrap_or(self.chars_per_line),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Per-request adjustments sent by the editor when previewing another page geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOverrides {
    pub first_page_capacity: Option<u32>,
    pub middle_page_capacity: Option<u32>,
    pub closing_reserve: Option<u32>,
    pub chars_per_line: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
