//! Tiered free-text name resolution.
//!
//! The name index is a small flat mapping, so unlike the ID index it is
//! loaded fully into memory. Matching runs exact-first, then the two
//! conventional decorations, then substring; only the substring tier can be
//! ambiguous, and ambiguity is surfaced rather than silently picked.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::DirectoryError;
use crate::normalize::normalize_name;

/// Alias -> chain ID mapping, as persisted in the artifact's `byName` section.
pub type NameIndex = BTreeMap<String, u64>;

/// Load the name index from the artifact, ignoring the record payloads.
pub fn load_name_index(path: &Path) -> Result<NameIndex, DirectoryError> {
    #[derive(Deserialize)]
    struct NameSection {
        #[serde(rename = "byName", default)]
        by_name: NameIndex,
    }

    let file = File::open(path).map_err(|e| DirectoryError::cache_io(path, e))?;
    let section: NameSection = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DirectoryError::cache_decode(path, e))?;
    Ok(section.by_name)
}

/// Resolve a free-text identifier to a chain ID.
///
/// Tiers, tried in order until one yields a single match:
/// 1. exact normalized key
/// 2. exact `ethereum-<name>` (e.g. "sepolia" -> "ethereum-sepolia")
/// 3. exact `<name>-mainnet` (e.g. "gnosis" -> "gnosis-mainnet")
/// 4. substring over all alias keys
pub fn resolve_name(index: &NameIndex, raw: &str) -> Result<u64, DirectoryError> {
    let normalized = normalize_name(raw);

    if let Some(&id) = index.get(&normalized) {
        return Ok(id);
    }
    if let Some(&id) = index.get(&format!("ethereum-{normalized}")) {
        tracing::debug!(name = %raw, "resolved via ethereum- prefix");
        return Ok(id);
    }
    if let Some(&id) = index.get(&format!("{normalized}-mainnet")) {
        tracing::debug!(name = %raw, "resolved via -mainnet suffix");
        return Ok(id);
    }

    let matches: Vec<&str> = index
        .keys()
        .filter(|key| key.contains(&normalized))
        .map(String::as_str)
        .collect();

    match matches.as_slice() {
        [] => Err(DirectoryError::ChainNotFound {
            query: raw.to_string(),
        }),
        [only] => {
            tracing::debug!(name = %raw, alias = %only, "resolved via substring match");
            Ok(index[*only])
        }
        _ => Err(DirectoryError::AmbiguousName {
            query: raw.to_string(),
            matches: matches.iter().map(|m| m.to_string()).collect(),
        }),
    }
}
