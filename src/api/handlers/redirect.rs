//! Handler for short code redirects.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::location::encode_location;

/// Redirects a short code to its long URL.
///
/// # Endpoint
///
/// `GET /api/v1/{short_code}`
///
/// # Request Flow
///
/// 1. Check cache for the short code
/// 2. On miss (or corrupted entry), query the store and repopulate the cache
/// 3. Return 301 Moved Permanently with the percent-encoded long URL as `Location`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 500 Internal Server Error if the store or cache fails.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.mapping_service.resolve(&short_code).await?;

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, encode_location(&long_url))],
    ))
}
