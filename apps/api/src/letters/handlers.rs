//! Axum route handlers for the Letterhead API.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::layout::{paginate, PaginationConfig};
use crate::letters::front_matter::resolve_regions;
use crate::letters::models::{PaginateRequest, PaginateResponse};
use crate::state::AppState;

/// GET /api/v1/letters/layout-config
///
/// Returns the default page geometry, so the editor can show what it will be laid out with.
pub async fn handle_layout_config(State(state): State<AppState>) -> Json<PaginationConfig> {
    Json(state.config.layout)
}

/// POST /api/v1/letters/paginate
///
/// Lays the letter body out across pages and resolves the front-matter and closing
/// regions. Called on every editor change, so results are memoized.
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(request): Json<PaginateRequest>,
) -> Result<Json<PaginateResponse>, AppError> {
    let document = request.document;

    if document.letter_body.len() > state.config.max_body_bytes {
        return Err(AppError::Validation(format!(
            "letterBody is {} bytes; the maximum is {}",
            document.letter_body.len(),
            state.config.max_body_bytes
        )));
    }

    let layout = match &request.layout {
        Some(overrides) => state.config.layout.with_overrides(overrides)?,
        None => state.config.layout,
    };

    // HTML parsing is CPU-bound and not Send; keep it off the async executor.
    let cache = Arc::clone(&state.layout_cache);
    let body = document.letter_body.clone();
    let closing = document.closing.clone();
    let pagination = tokio::task::spawn_blocking(move || {
        cache.get_or_compute(&body, &closing, &layout, || {
            paginate(&body, &closing, &layout)
        })
    })
    .await
    .map_err(|e| {
        AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}"))
    })?;

    let regions = resolve_regions(&document);

    let overflowed = pagination.pages.iter().filter(|p| p.overflowed).count();
    info!(
        pages = pagination.pages.len(),
        overflowed,
        closing_exceeds_reserve = pagination.closing_exceeds_reserve,
        "Letter paginated"
    );
    debug!(cached_layouts = state.layout_cache.len(), "Layout cache size");

    Ok(Json(PaginateResponse {
        page_count: pagination.pages.len(),
        pages: pagination.pages.clone(),
        regions,
        layout,
        closing_line_cost: pagination.closing_line_cost,
        closing_exceeds_reserve: pagination.closing_exceeds_reserve,
    }))
}
