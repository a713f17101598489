//! Handler for the shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short code for a long URL, creating the mapping on first use.
///
/// # Endpoint
///
/// `POST /api/v1/short`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// ```json
/// { "shortCode": "0000x1Z" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if `url` is missing or empty.
/// Returns 500 Internal Server Error if the store, cache or code generator fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let short_code = state
        .mapping_service
        .resolve_or_create(&payload.url)
        .await?;

    Ok(Json(ShortenResponse { short_code }))
}
