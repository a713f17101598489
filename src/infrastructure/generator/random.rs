//! Local random code generator.

use async_trait::async_trait;

use crate::domain::generator::{CodeGenerator, GeneratorError};
use crate::utils::code_generator::generate_code;

/// Generates 12-character random codes from the OS entropy source.
///
/// Uniqueness is probabilistic (72 bits of entropy per code).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeGenerator for RandomCodeGenerator {
    async fn next_code(&self) -> Result<String, GeneratorError> {
        generate_code().map_err(|e| GeneratorError::Entropy(e.to_string()))
    }
}
