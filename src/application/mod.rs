//! Application layer services implementing business logic.
//!
//! Services orchestrate the domain contracts (repository, cache, generator)
//! and expose a small API to HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::mapping_service::MappingService`] - mapping resolution and creation

pub mod services;
