//! Short code generator contract.

use async_trait::async_trait;

/// Errors raised while obtaining a fresh short code.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("code generator unavailable: {0}")]
    Unavailable(String),
    #[error("code generator returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

/// Source of globally unique, opaque short codes.
///
/// Every call returns a code never handed out before. Failures are fatal to
/// the create path; callers do not retry.
///
/// # Implementations
///
/// - [`crate::infrastructure::generator::UidGenClient`] - remote uid service
/// - [`crate::infrastructure::generator::RandomCodeGenerator`] - local randomness
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Returns one fresh short code.
    async fn next_code(&self) -> Result<String, GeneratorError>;
}
