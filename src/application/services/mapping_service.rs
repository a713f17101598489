//! Mapping resolution and creation service.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::entities::UrlMapping;
use crate::domain::generator::CodeGenerator;
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::MappingCache;

/// Rows requested per store lookup; a second row reveals a duplicate.
const LOOKUP_LIMIT: i64 = 2;

/// How a missing mapping is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    /// Plain insert. Concurrent creators of one URL may each add a row.
    #[default]
    AtLeastOnce,
    /// Atomic insert-if-absent keyed by long URL; concurrent creators converge.
    InsertIfAbsent,
}

impl FromStr for CreateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "at_least_once" => Ok(Self::AtLeastOnce),
            "insert_if_absent" => Ok(Self::InsertIfAbsent),
            other => Err(format!(
                "expected 'at_least_once' or 'insert_if_absent', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for CreateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeastOnce => f.write_str("at_least_once"),
            Self::InsertIfAbsent => f.write_str("insert_if_absent"),
        }
    }
}

/// Resolves long URLs to short codes (creating mappings on first sight) and
/// short codes back to long URLs.
///
/// Both directions read the cache first, fall back to the store, and write the
/// answer back into the cache keyed by the lookup input. There is no locking
/// across the cache and the store; with [`CreateMode::AtLeastOnce`] two
/// concurrent first requests for one URL can create two rows, which later
/// lookups detect and log.
pub struct MappingService {
    repository: Arc<dyn MappingRepository>,
    cache: MappingCache,
    generator: Arc<dyn CodeGenerator>,
    create_mode: CreateMode,
}

impl MappingService {
    /// Creates a new mapping service.
    pub fn new(
        repository: Arc<dyn MappingRepository>,
        cache: MappingCache,
        generator: Arc<dyn CodeGenerator>,
        create_mode: CreateMode,
    ) -> Self {
        Self {
            repository,
            cache,
            generator,
            create_mode,
        }
    }

    /// Returns the short code for `long_url`, creating a mapping if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `long_url` is empty.
    /// Returns [`AppError::Internal`] if the cache, the store or the generator fails.
    pub async fn resolve_or_create(&self, long_url: &str) -> Result<String, AppError> {
        if long_url.is_empty() {
            return Err(AppError::bad_request(
                "url must not be empty",
                json!({ "field": "url" }),
            ));
        }

        if let Some(short_code) = self.cache.short_code_for(long_url).await? {
            return Ok(short_code);
        }

        let rows = self
            .repository
            .find_by_long_url(long_url, LOOKUP_LIMIT)
            .await?;

        if let Some(mapping) = first_row(rows, "url", long_url) {
            self.cache.store_short_code(long_url, &mapping.short_code).await?;
            return Ok(mapping.short_code);
        }

        let short_code = self.generator.next_code().await?;
        let candidate = UrlMapping::new(long_url, short_code);

        let mapping = match self.create_mode {
            CreateMode::AtLeastOnce => {
                self.repository.insert(&candidate).await?;
                candidate.clone()
            }
            CreateMode::InsertIfAbsent => self.repository.insert_if_absent(&candidate).await?,
        };

        if mapping.short_code == candidate.short_code {
            metrics::counter!("mapping_created_total").increment(1);
            info!(url = %long_url, short = %mapping.short_code, "Created mapping");
        } else {
            info!(
                url = %long_url,
                short = %mapping.short_code,
                discarded = %candidate.short_code,
                "Mapping created concurrently, reusing stored code"
            );
        }

        self.cache.store_short_code(long_url, &mapping.short_code).await?;
        Ok(mapping.short_code)
    }

    /// Returns the long URL for `short_code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping has this short code.
    /// Returns [`AppError::Internal`] if the cache or the store fails.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        if let Some(long_url) = self.cache.long_url_for(short_code).await? {
            return Ok(long_url);
        }

        let rows = self
            .repository
            .find_by_short_code(short_code, LOOKUP_LIMIT)
            .await?;

        let Some(mapping) = first_row(rows, "short", short_code) else {
            return Err(AppError::not_found(
                "No short url",
                json!({ "short_code": short_code }),
            ));
        };

        self.cache.store_long_url(short_code, &mapping.long_url).await?;
        Ok(mapping.long_url)
    }
}

/// Picks the first row in store order, warning when the lookup was ambiguous.
fn first_row(rows: Vec<UrlMapping>, column: &'static str, value: &str) -> Option<UrlMapping> {
    if rows.len() > 1 {
        warn!(column, value = %value, "Non unique mapping, using first row");
        metrics::counter!("mapping_non_unique_total", "lookup" => column).increment(1);
    }

    rows.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generator::{GeneratorError, MockCodeGenerator};
    use crate::domain::repositories::MockMappingRepository;
    use crate::infrastructure::cache::{CacheService, CacheSlot, MemoryCache, code_key, url_key};
    use crate::infrastructure::generator::RandomCodeGenerator;
    use crate::infrastructure::persistence::InMemoryMappingRepository;
    use crate::testing::LogCapture;
    use tracing::Level;

    const URL: &str = "https://example.com/a";

    fn service_with(
        repository: impl MappingRepository + 'static,
        cache: Arc<MemoryCache>,
        generator: impl CodeGenerator + 'static,
        create_mode: CreateMode,
    ) -> MappingService {
        MappingService::new(
            Arc::new(repository),
            MappingCache::new(cache),
            Arc::new(generator),
            create_mode,
        )
    }

    fn generator_returning(code: &'static str) -> MockCodeGenerator {
        let mut generator = MockCodeGenerator::new();
        generator
            .expect_next_code()
            .times(1)
            .returning(move || Ok(code.to_string()));
        generator
    }

    fn unused_generator() -> MockCodeGenerator {
        let mut generator = MockCodeGenerator::new();
        generator.expect_next_code().times(0);
        generator
    }

    #[tokio::test]
    async fn test_resolve_or_create_cache_hit_skips_store() {
        let cache = Arc::new(MemoryCache::new());
        cache.set(&url_key(URL), "cached").await.unwrap();

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url().times(0);
        repo.expect_insert().times(0);

        let service = service_with(repo, cache, unused_generator(), CreateMode::AtLeastOnce);

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_resolve_or_create_store_hit_populates_cache() {
        let cache = Arc::new(MemoryCache::new());

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url()
            .withf(|url, limit| url == URL && *limit == 2)
            .times(1)
            .returning(|_, _| Ok(vec![UrlMapping::new(URL, "stored")]));
        repo.expect_insert().times(0);

        let service = service_with(
            repo,
            cache.clone(),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "stored");
        assert_eq!(cache.get(&url_key(URL)).await.unwrap(), Some("stored".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_or_create_creates_on_miss() {
        let cache = Arc::new(MemoryCache::new());

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_, _| Ok(vec![]));
        repo.expect_insert()
            .withf(|m| m.long_url == URL && m.short_code == "x1")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_insert_if_absent().times(0);

        let service = service_with(
            repo,
            cache.clone(),
            generator_returning("x1"),
            CreateMode::AtLeastOnce,
        );

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "x1");
        assert_eq!(cache.get(&url_key(URL)).await.unwrap(), Some("x1".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_or_create_uses_first_of_duplicate_rows() {
        let cache = Arc::new(MemoryCache::new());

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url().times(1).returning(|_, _| {
            Ok(vec![
                UrlMapping::new(URL, "first"),
                UrlMapping::new(URL, "second"),
            ])
        });

        let service = service_with(
            repo,
            cache.clone(),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        let (logs, _guard) = LogCapture::install();

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "first");
        assert_eq!(cache.get(&url_key(URL)).await.unwrap(), Some("first".to_string()));

        let warnings = logs.events_at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Non unique mapping, using first row");
        assert_eq!(warnings[0].field("column"), Some("url"));
        assert_eq!(warnings[0].field("value"), Some(URL));
    }

    #[tokio::test]
    async fn test_resolve_duplicate_short_code_logs_warning() {
        let repo = InMemoryMappingRepository::new();
        repo.push(UrlMapping::new("https://example.com/first", "dup"));
        repo.push(UrlMapping::new("https://example.com/second", "dup"));

        let service = service_with(
            repo,
            Arc::new(MemoryCache::new()),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        let (logs, _guard) = LogCapture::install();

        assert_eq!(
            service.resolve("dup").await.unwrap(),
            "https://example.com/first"
        );

        let warnings = logs.events_at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field("column"), Some("short"));
        assert_eq!(warnings[0].field("value"), Some("dup"));
    }

    #[tokio::test]
    async fn test_unique_rows_log_no_warning() {
        let repo = InMemoryMappingRepository::new();
        repo.push(UrlMapping::new(URL, "x1"));

        let service = service_with(
            repo,
            Arc::new(MemoryCache::new()),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        let (logs, _guard) = LogCapture::install();

        service.resolve("x1").await.unwrap();
        service.resolve_or_create(URL).await.unwrap();

        assert!(logs.events_at(Level::WARN).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_or_create_generator_failure_is_fatal() {
        let cache = Arc::new(MemoryCache::new());

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_, _| Ok(vec![]));
        repo.expect_insert().times(0);

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_next_code()
            .times(1)
            .returning(|| Err(GeneratorError::Unavailable("connection refused".to_string())));

        let service = service_with(repo, cache.clone(), generator, CreateMode::AtLeastOnce);

        let err = service.resolve_or_create(URL).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_or_create_store_failure_is_fatal() {
        let cache = Arc::new(MemoryCache::new());

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let service = service_with(repo, cache.clone(), unused_generator(), CreateMode::AtLeastOnce);

        let err = service.resolve_or_create(URL).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_or_create_rejects_empty_url() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url().times(0);

        let service = service_with(
            repo,
            Arc::new(MemoryCache::new()),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        let err = service.resolve_or_create("").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_insert_if_absent_mode_returns_stored_winner() {
        let cache = Arc::new(MemoryCache::new());

        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_, _| Ok(vec![]));
        repo.expect_insert().times(0);
        repo.expect_insert_if_absent()
            .withf(|m| m.short_code == "loser")
            .times(1)
            .returning(|_| Ok(UrlMapping::new(URL, "winner")));

        let service = service_with(
            repo,
            cache.clone(),
            generator_returning("loser"),
            CreateMode::InsertIfAbsent,
        );

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "winner");
        assert_eq!(cache.get(&url_key(URL)).await.unwrap(), Some("winner".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_short_code()
            .withf(|code, limit| code == "doesnotexist" && *limit == 2)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let cache = Arc::new(MemoryCache::new());
        let service = service_with(repo, cache.clone(), unused_generator(), CreateMode::AtLeastOnce);

        let err = service.resolve("doesnotexist").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_store_hit_populates_cache() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_short_code()
            .times(1)
            .returning(|_, _| Ok(vec![UrlMapping::new(URL, "x1")]));

        let cache = Arc::new(MemoryCache::new());
        let service = service_with(repo, cache.clone(), unused_generator(), CreateMode::AtLeastOnce);

        assert_eq!(service.resolve("x1").await.unwrap(), URL);
        assert_eq!(cache.get(&code_key("x1")).await.unwrap(), Some(URL.to_string()));
    }

    #[tokio::test]
    async fn test_resolve_corrupted_slot_falls_back_to_store() {
        let repo = InMemoryMappingRepository::new();
        repo.push(UrlMapping::new(URL, "x1"));

        let cache = Arc::new(MemoryCache::new());
        cache.insert_raw(code_key("x1"), CacheSlot::List(vec!["poison".to_string()]));

        let service = service_with(repo, cache.clone(), unused_generator(), CreateMode::AtLeastOnce);

        let (logs, _guard) = LogCapture::install();

        assert_eq!(service.resolve("x1").await.unwrap(), URL);
        let warnings = logs.events_at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Bad cached value, evicting");
        // purged, then repopulated from the store
        assert_eq!(cache.get(&code_key("x1")).await.unwrap(), Some(URL.to_string()));
    }

    #[tokio::test]
    async fn test_resolve_corrupted_slot_without_row_is_not_found() {
        let cache = Arc::new(MemoryCache::new());
        cache.insert_raw(code_key("ghost"), CacheSlot::Bytes(vec![0xff]));

        let service = service_with(
            InMemoryMappingRepository::new(),
            cache.clone(),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        let err = service.resolve("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.contains_key(&code_key("ghost")));
    }

    #[tokio::test]
    async fn test_resolve_or_create_corrupted_slot_uses_store() {
        let repo = InMemoryMappingRepository::new();
        repo.push(UrlMapping::new(URL, "x1"));

        let cache = Arc::new(MemoryCache::new());
        cache.insert_raw(url_key(URL), CacheSlot::Bytes(Vec::new()));

        let service = service_with(repo, cache.clone(), unused_generator(), CreateMode::AtLeastOnce);

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "x1");
        assert_eq!(cache.get(&url_key(URL)).await.unwrap(), Some("x1".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_rows_resolve_deterministically() {
        let repo = InMemoryMappingRepository::new();
        repo.push(UrlMapping::new(URL, "x1"));
        repo.push(UrlMapping::new(URL, "x2"));
        repo.push(UrlMapping::new("https://example.com/b", "x1"));

        let service = service_with(
            repo,
            Arc::new(MemoryCache::new()),
            unused_generator(),
            CreateMode::AtLeastOnce,
        );

        for _ in 0..3 {
            assert_eq!(service.resolve_or_create(URL).await.unwrap(), "x1");
            assert_eq!(service.resolve("x1").await.unwrap(), URL);
        }
    }

    #[tokio::test]
    async fn test_create_then_resolve_scenario() {
        let repo = Arc::new(InMemoryMappingRepository::new());
        let cache = Arc::new(MemoryCache::new());
        let service = MappingService::new(
            repo.clone(),
            MappingCache::new(cache),
            Arc::new(generator_returning("x1")),
            CreateMode::AtLeastOnce,
        );

        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "x1");
        // warm cache: no second generator call, no second row
        assert_eq!(service.resolve_or_create(URL).await.unwrap(), "x1");
        assert_eq!(repo.len(), 1);

        assert_eq!(service.resolve("x1").await.unwrap(), URL);
        assert!(service.resolve("doesnotexist").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_round_trip_and_idempotency() {
        let service = service_with(
            InMemoryMappingRepository::new(),
            Arc::new(MemoryCache::new()),
            RandomCodeGenerator::new(),
            CreateMode::AtLeastOnce,
        );

        for i in 0..20 {
            let url = format!("https://example.com/page/{i}");
            let code = service.resolve_or_create(&url).await.unwrap();

            assert_eq!(service.resolve_or_create(&url).await.unwrap(), code);
            assert_eq!(service.resolve(&code).await.unwrap(), url);
        }
    }

    #[tokio::test]
    async fn test_url_spelled_like_a_code_does_not_shadow_it() {
        let mut generator = MockCodeGenerator::new();
        let mut codes = vec!["c2".to_string(), "c1".to_string()];
        generator
            .expect_next_code()
            .times(2)
            .returning(move || Ok(codes.pop().unwrap_or_default()));

        let service = service_with(
            InMemoryMappingRepository::new(),
            Arc::new(MemoryCache::new()),
            generator,
            CreateMode::AtLeastOnce,
        );

        assert_eq!(service.resolve_or_create("c2").await.unwrap(), "c1");
        assert_eq!(
            service
                .resolve_or_create("https://example.com/real")
                .await
                .unwrap(),
            "c2"
        );

        assert_eq!(service.resolve("c2").await.unwrap(), "https://example.com/real");
        assert_eq!(service.resolve("c1").await.unwrap(), "c2");
        assert_eq!(service.resolve_or_create("c2").await.unwrap(), "c1");
    }

    #[tokio::test]
    async fn test_cold_and_warm_cache_agree() {
        let repo = Arc::new(InMemoryMappingRepository::new());
        repo.push(UrlMapping::new(URL, "x1"));

        let warm_cache = Arc::new(MemoryCache::new());
        let warm = MappingService::new(
            repo.clone(),
            MappingCache::new(warm_cache),
            Arc::new(unused_generator()),
            CreateMode::AtLeastOnce,
        );
        warm.resolve("x1").await.unwrap();
        warm.resolve_or_create(URL).await.unwrap();

        let cold = MappingService::new(
            repo,
            MappingCache::new(Arc::new(MemoryCache::new())),
            Arc::new(unused_generator()),
            CreateMode::AtLeastOnce,
        );

        assert_eq!(
            warm.resolve("x1").await.unwrap(),
            cold.resolve("x1").await.unwrap()
        );
        assert_eq!(
            warm.resolve_or_create(URL).await.unwrap(),
            cold.resolve_or_create(URL).await.unwrap()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_insert_if_absent_converges_under_concurrency() {
        let repo = Arc::new(InMemoryMappingRepository::new());
        let service = Arc::new(MappingService::new(
            repo.clone(),
            MappingCache::new(Arc::new(MemoryCache::new())),
            Arc::new(RandomCodeGenerator::new()),
            CreateMode::InsertIfAbsent,
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.resolve_or_create(URL).await.unwrap() })
            })
            .collect();

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap());
        }

        codes.dedup();
        assert_eq!(codes.len(), 1);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_create_mode_parsing() {
        assert_eq!(
            "at_least_once".parse::<CreateMode>().unwrap(),
            CreateMode::AtLeastOnce
        );
        assert_eq!(
            "insert_if_absent".parse::<CreateMode>().unwrap(),
            CreateMode::InsertIfAbsent
        );
        assert!("exactly_once".parse::<CreateMode>().is_err());
        assert_eq!(CreateMode::InsertIfAbsent.to_string(), "insert_if_absent");
    }
}
