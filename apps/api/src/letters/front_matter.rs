//! Region content for the letter template.
//!
//! Pages only say *where* a region may appear (`show_*` flags). This module decides
//! whether the region has anything to show: a region whose fields are all blank is
//! `None` and the renderer skips it.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::letters::models::LetterDocument;

const DISPLAY_DATE_FORMAT: &str = "%d %B %Y";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterRegions {
    pub meta: Option<MetaRegion>,
    pub recipient: Option<RecipientRegion>,
    pub subject: Option<String>,
    pub salutation: Option<String>,
    pub closing: Option<ClosingRegion>,
}

/// Reference number and date block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRegion {
    pub reference_no: Option<String>,
    pub letter_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientRegion {
    pub name: Option<String>,
    pub address_lines: Vec<String>,
}

/// Closing text plus the optional signature and company seal images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingRegion {
    pub markup: Option<String>,
    pub show_signature: bool,
    pub signature_url: Option<String>,
    pub show_seal: bool,
    pub seal_url: Option<String>,
}

pub fn resolve_regions(doc: &LetterDocument) -> LetterRegions {
    let reference_no = non_blank(&doc.reference_no);
    let letter_date = non_blank(&doc.letter_date).map(|d| format_letter_date(&d));
    let meta = (reference_no.is_some() || letter_date.is_some()).then_some(MetaRegion {
        reference_no,
        letter_date,
    });

    let name = non_blank(&doc.recipient_name);
    let address_lines: Vec<String> = doc
        .recipient_address
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    let recipient = (name.is_some() || !address_lines.is_empty())
        .then_some(RecipientRegion { name, address_lines });

    let markup = non_blank(&doc.closing);
    let signature_url = doc.signature_url.as_deref().and_then(non_blank);
    let seal_url = doc.seal_url.as_deref().and_then(non_blank);
    let closing = (markup.is_some() || doc.show_signature || doc.show_seal).then(|| ClosingRegion {
        markup,
        show_signature: doc.show_signature,
        signature_url: signature_url.filter(|_| doc.show_signature),
        show_seal: doc.show_seal,
        seal_url: seal_url.filter(|_| doc.show_seal),
    });

    LetterRegions {
        meta,
        recipient,
        subject: non_blank(&doc.subject),
        salutation: non_blank(&doc.salutation),
        closing,
    }
}

/// Formats `2024-03-05` (or an RFC 3339 timestamp) as `05 March 2024`.
/// Anything else is passed through unchanged.
pub fn format_letter_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format(DISPLAY_DATE_FORMAT).to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return timestamp
            .date_naive()
            .format(DISPLAY_DATE_FORMAT)
            .to_string();
    }
    trimmed.to_string()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
