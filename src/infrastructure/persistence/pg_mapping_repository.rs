//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::UrlMapping;
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// PostgreSQL repository over the `urls (url, short)` table.
///
/// The table has no unique constraints. Lookups carry no `ORDER BY`, so when
/// duplicates exist the first row is whatever the planner returns first.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn into_mappings(rows: Vec<(String, String)>) -> Vec<UrlMapping> {
    rows.into_iter()
        .map(|(url, short)| UrlMapping::new(url, short))
        .collect()
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn find_by_long_url(
        &self,
        long_url: &str,
        limit: i64,
    ) -> Result<Vec<UrlMapping>, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT url, short FROM urls WHERE url = $1 LIMIT $2",
        )
        .bind(long_url)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(into_mappings(rows))
    }

    async fn find_by_short_code(
        &self,
        short_code: &str,
        limit: i64,
    ) -> Result<Vec<UrlMapping>, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT url, short FROM urls WHERE short = $1 LIMIT $2",
        )
        .bind(short_code)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(into_mappings(rows))
    }

    async fn insert(&self, mapping: &UrlMapping) -> Result<(), AppError> {
        sqlx::query("INSERT INTO urls (url, short) VALUES ($1, $2)")
            .bind(&mapping.long_url)
            .bind(&mapping.short_code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn insert_if_absent(&self, mapping: &UrlMapping) -> Result<UrlMapping, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializes creators of the same URL until commit; the lock is
        // released with the transaction, including on rollback.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&mapping.long_url)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, (String, String)>(
            "SELECT url, short FROM urls WHERE url = $1 LIMIT 1",
        )
        .bind(&mapping.long_url)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((url, short)) = existing {
            tx.commit().await?;
            return Ok(UrlMapping::new(url, short));
        }

        sqlx::query("INSERT INTO urls (url, short) VALUES ($1, $2)")
            .bind(&mapping.long_url)
            .bind(&mapping.short_code)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(mapping.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
