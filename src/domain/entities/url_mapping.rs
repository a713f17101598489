//! Mapping entity pairing a long URL with its short code.

/// A `(long_url, short_code)` association.
///
/// Intended to be one-to-one in both directions, but the store does not
/// enforce it; readers must tolerate several rows sharing either field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub long_url: String,
    pub short_code: String,
}

impl UrlMapping {
    /// Creates a new mapping.
    pub fn new(long_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            short_code: short_code.into(),
        }
    }
}
