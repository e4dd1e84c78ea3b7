//! Context threaded through a mapping run

/// State shared with custom mappings and hooks during a run
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    /// Culture code the run resolves localized values for; empty for the
    /// neutral culture
    pub culture: &'a str,
}

impl<'a> MappingContext<'a> {
    /// Create a context for the given culture
    #[must_use]
    pub fn new(culture: &'a str) -> Self {
        Self { culture }
    }
}

impl Default for MappingContext<'_> {
    fn default() -> Self {
        Self { culture: "" }
    }
}
