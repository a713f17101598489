//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the domain contracts:
//!
//! - [`cache`] - Redis, in-memory and no-op caches plus the mapping accessor
//! - [`generator`] - uid-service client and random code generator
//! - [`persistence`] - PostgreSQL and in-memory mapping repositories

pub mod cache;
pub mod generator;
pub mod persistence;
