//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL.
///
/// A missing `url` deserializes to an empty string so it is reported by
/// validation like an empty one.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The long URL; any non-empty text is accepted.
    #[serde(default)]
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
}

/// Short code assigned to the requested URL.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_code: String,
}
