//! Region Flagger — which fixed letter regions each page shows.
//!
//! Purely positional: front matter (meta, recipient, subject, salutation) on the first
//! page, closing and signature on the last. Whether a region has anything to show is
//! decided separately from the document's fields.

use crate::layout::packer::PageDescriptor;

pub fn flag(pages: Vec<PageDescriptor>) -> Vec<PageDescriptor> {
    pages
        .into_iter()
        .map(|mut page| {
            let front = page.is_first_page;
            page.show_meta = front;
            page.show_recipient = front;
            page.show_subject = front;
            page.show_salutation = front;
            page.show_closing = page.is_last_page;
            page
        })
        .collect()
}
