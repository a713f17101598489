//! Domain layer: the mapping entity and the contracts of its collaborators.
//!
//! - [`entities`] - [`entities::UrlMapping`]
//! - [`repositories`] - durable mapping storage trait
//! - [`generator`] - short code generator trait
//!
//! The domain layer has no dependency on infrastructure; concrete stores,
//! caches and generators live in [`crate::infrastructure`].

pub mod entities;
pub mod generator;
pub mod repositories;
