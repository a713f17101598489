//! Mapping repository implementations.
//!
//! - [`PgMappingRepository`] - PostgreSQL storage (production)
//! - [`InMemoryMappingRepository`] - process-local storage

pub mod memory;
pub mod pg_mapping_repository;

pub use memory::InMemoryMappingRepository;
pub use pg_mapping_repository::PgMappingRepository;
