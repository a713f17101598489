//! Repository trait for mapping storage.

use crate::domain::entities::UrlMapping;
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage of [`UrlMapping`] rows.
///
/// Lookups return rows in store order, capped at `limit`. No uniqueness is
/// guaranteed on either column: callers ask for more than one row so they can
/// notice duplicates.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryMappingRepository`] - process-local
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Finds up to `limit` mappings whose long URL equals `long_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_long_url(
        &self,
        long_url: &str,
        limit: i64,
    ) -> Result<Vec<UrlMapping>, AppError>;

    /// Finds up to `limit` mappings whose short code equals `short_code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_short_code(
        &self,
        short_code: &str,
        limit: i64,
    ) -> Result<Vec<UrlMapping>, AppError>;

    /// Appends a mapping row unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, mapping: &UrlMapping) -> Result<(), AppError>;

    /// Inserts `mapping` unless a row for the same long URL already exists.
    ///
    /// Atomic with respect to other `insert_if_absent` calls for the same long
    /// URL. Returns the mapping that is stored after the call: either the
    /// pre-existing row or `mapping` itself.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert_if_absent(&self, mapping: &UrlMapping) -> Result<UrlMapping, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
