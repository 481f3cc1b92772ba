// Letterhead API: request/response records, front-matter regions and HTTP handlers.
// All layout work is delegated to crate::layout.

pub mod front_matter;
pub mod handlers;
pub mod models;
