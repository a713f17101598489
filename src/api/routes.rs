//! API route configuration.

use crate::api::handlers::{redirect_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Mapping routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `POST /short`         - Resolve or create the short code for a long URL
/// - `GET  /{short_code}`  - Permanent redirect to the long URL
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/short", post(shorten_handler))
        .route("/{short_code}", get(redirect_handler))
}
