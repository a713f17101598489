//! Core domain entities.
//!
//! The service has a single entity, [`UrlMapping`]. It is created once when a
//! long URL is first seen and never updated or deleted afterwards.

pub mod url_mapping;

pub use url_mapping::UrlMapping;
