//! Configuration for the `ContentMapper`.

/// Configuration for the `ContentMapper`
#[derive(Debug, Clone, Default)]
pub struct MapperConfig {
    /// Absolute root prepended to media URLs when building
    /// `domain_with_url` values
    pub assets_root_url: Option<String>,
    /// Log every field assignment for debugging
    pub log_field_mapping: bool,
}
