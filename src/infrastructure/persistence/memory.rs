//! In-memory implementation of the mapping repository.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::entities::UrlMapping;
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Append-only, insertion-ordered mapping store held in process memory.
///
/// Like the PostgreSQL table it enforces no uniqueness, so duplicate rows can
/// be seeded with [`InMemoryMappingRepository::push`]. Lookups return rows in
/// insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMappingRepository {
    rows: RwLock<Vec<UrlMapping>>,
}

impl InMemoryMappingRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row directly, bypassing the repository contract.
    pub fn push(&self, mapping: UrlMapping) {
        self.rows.write().push(mapping);
    }

    /// Number of rows stored.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn find_by<F>(&self, limit: i64, predicate: F) -> Vec<UrlMapping>
    where
        F: Fn(&UrlMapping) -> bool,
    {
        let limit = usize::try_from(limit).unwrap_or(0);
        self.rows
            .read()
            .iter()
            .filter(|m| predicate(m))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn find_by_long_url(
        &self,
        long_url: &str,
        limit: i64,
    ) -> Result<Vec<UrlMapping>, AppError> {
        Ok(self.find_by(limit, |m| m.long_url == long_url))
    }

    async fn find_by_short_code(
        &self,
        short_code: &str,
        limit: i64,
    ) -> Result<Vec<UrlMapping>, AppError> {
        Ok(self.find_by(limit, |m| m.short_code == short_code))
    }

    async fn insert(&self, mapping: &UrlMapping) -> Result<(), AppError> {
        self.push(mapping.clone());
        Ok(())
    }

    async fn insert_if_absent(&self, mapping: &UrlMapping) -> Result<UrlMapping, AppError> {
        let mut rows = self.rows.write();

        if let Some(existing) = rows.iter().find(|m| m.long_url == mapping.long_url) {
            return Ok(existing.clone());
        }

        rows.push(mapping.clone());
        Ok(mapping.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
