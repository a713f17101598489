//! Helper functions for short code production.
//!
//! - [`base62`] - fixed-width base62 encoding of uid-service integers
//! - [`code_generator`] - random code generation
//! - [`location`] - escaping long URLs for redirect headers

pub mod base62;
pub mod code_generator;
pub mod location;
