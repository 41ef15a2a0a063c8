//! Alias normalization shared by the indexer and the name resolver.

/// Normalize a chain alias for lookup: trim, lowercase, spaces to hyphens.
///
/// Both sides of every name comparison go through this, so "Arbitrum One"
/// and "arbitrum-one" land on the same key.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}
