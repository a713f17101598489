//! Short code generator implementations.
//!
//! - [`UidGenClient`] - remote uid service, base62-encoded
//! - [`RandomCodeGenerator`] - local random codes

pub mod random;
pub mod uidgen;

pub use random::RandomCodeGenerator;
pub use uidgen::UidGenClient;
