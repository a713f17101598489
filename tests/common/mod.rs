#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use shortmap::application::services::CreateMode;
use shortmap::domain::entities::UrlMapping;
use shortmap::domain::generator::{CodeGenerator, GeneratorError};
use shortmap::infrastructure::cache::MemoryCache;
use shortmap::infrastructure::persistence::InMemoryMappingRepository;
use shortmap::state::AppState;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out pre-seeded codes in order and counts calls.
///
/// Once the queue is empty every call fails with `Unavailable`.
#[derive(Default)]
pub struct FixedCodeGenerator {
    codes: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl FixedCodeGenerator {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeGenerator for FixedCodeGenerator {
    async fn next_code(&self) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.codes
            .lock()
            .pop_front()
            .ok_or_else(|| GeneratorError::Unavailable("no codes left".to_string()))
    }
}

/// In-memory collaborators behind an [`AppState`], kept for assertions.
pub struct TestContext {
    pub state: AppState,
    pub repository: Arc<InMemoryMappingRepository>,
    pub cache: Arc<MemoryCache>,
    pub generator: Arc<FixedCodeGenerator>,
}

pub fn create_test_state<I, S>(codes: I) -> TestContext
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    create_test_state_with_mode(codes, CreateMode::AtLeastOnce)
}

pub fn create_test_state_with_mode<I, S>(codes: I, create_mode: CreateMode) -> TestContext
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let repository = Arc::new(InMemoryMappingRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let generator = Arc::new(FixedCodeGenerator::new(codes));

    let state = AppState::new(
        repository.clone(),
        cache.clone(),
        generator.clone(),
        create_mode,
    );

    TestContext {
        state,
        repository,
        cache,
        generator,
    }
}

pub fn seed_mapping(repository: &InMemoryMappingRepository, long_url: &str, short_code: &str) {
    repository.push(UrlMapping::new(long_url, short_code));
}
