//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{CreateMode, MappingService};
use crate::domain::generator::CodeGenerator;
use crate::domain::repositories::MappingRepository;
use crate::infrastructure::cache::{CacheService, MappingCache};

/// Handles to the resolver and its collaborators.
///
/// Cloning is cheap; all collaborators sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub mapping_service: Arc<MappingService>,
    pub repository: Arc<dyn MappingRepository>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    /// Wires the resolver from explicitly constructed collaborators.
    pub fn new(
        repository: Arc<dyn MappingRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<dyn CodeGenerator>,
        create_mode: CreateMode,
    ) -> Self {
        let mapping_service = Arc::new(MappingService::new(
            repository.clone(),
            MappingCache::new(cache.clone()),
            generator,
            create_mode,
        ));

        Self {
            mapping_service,
            repository,
            cache,
        }
    }
}
