use serde::{Deserialize, Serialize};

use crate::layout::{PageDescriptor, PaginationConfig, PaginationOverrides};
use crate::letters::front_matter::LetterRegions;

/// A letter as sent by the letterhead editor. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LetterDocument {
    /// Rich-text HTML of the letter body.
    pub letter_body: String,
    /// Sign-off text, rendered with the signature on the last page.
    pub closing: String,
    pub reference_no: String,
    /// `YYYY-MM-DD`, RFC 3339, or free text.
    pub letter_date: String,
    pub recipient_name: String,
    /// Newline-separated address lines.
    pub recipient_address: String,
    pub subject: String,
    pub salutation: String,
    pub show_signature: bool,
    pub signature_url: Option<String>,
    pub show_seal: bool,
    pub seal_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaginateRequest {
    pub document: LetterDocument,
    #[serde(default)]
    pub layout: Option<PaginationOverrides>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateResponse {
    pub page_count: usize,
    pub pages: Vec<PageDescriptor>,
    pub regions: LetterRegions,
    /// The geometry the pages were laid out with, overrides applied.
    pub layout: PaginationConfig,
    pub closing_line_cost: u32,
    pub closing_exceeds_reserve: bool,
}
