//! HTTP client for the uid-generator service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::generator::{CodeGenerator, GeneratorError};
use crate::utils::base62::encode_fixed;

/// Response body of the uid service: `{"uid": 12345}`.
#[derive(Debug, Deserialize)]
struct UidResponse {
    uid: u64,
}

/// Fetches globally unique integers from a uid service and encodes them as
/// fixed-width base62 short codes.
///
/// One `GET` per code. Non-2xx statuses, transport errors and malformed bodies
/// all fail the call; nothing is retried.
pub struct UidGenClient {
    client: reqwest::Client,
    endpoint: String,
}

impl UidGenClient {
    /// Builds a client for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Decodes a uid service response body into a short code.
    fn code_from_body(body: &[u8]) -> Result<String, GeneratorError> {
        let response: UidResponse = serde_json::from_slice(body)
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        Ok(encode_fixed(response.uid))
    }
}

#[async_trait]
impl CodeGenerator for UidGenClient {
    async fn next_code(&self) -> Result<String, GeneratorError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        let code = Self::code_from_body(&body)?;
        debug!(code = %code, "Received uid from generator");
        Ok(code)
    }
}
