//! Streaming by-ID lookup over the persisted artifact.
//!
//! The artifact can run to tens of megabytes, so a single-record query must
//! not deserialize the whole document. The seeds below drive
//! [`serde_json::Deserializer`] as a pull-parser: walk the top-level keys to
//! the `byId` section, walk that section's keys, and decode only the value
//! whose key matches the target. Everything else is consumed as
//! [`IgnoredAny`], keeping memory proportional to one record.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};

use crate::error::DirectoryError;
use crate::types::ChainRecord;

/// Scan the artifact at `path` for the record with the given chain ID.
pub fn find_record(path: &Path, chain_id: u64) -> Result<ChainRecord, DirectoryError> {
    let file = File::open(path).map_err(|e| DirectoryError::cache_io(path, e))?;
    let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(file));

    let found = DocumentScan { target: chain_id }
        .deserialize(&mut deserializer)
        .map_err(|e| DirectoryError::cache_decode(path, e))?;

    found.ok_or_else(|| DirectoryError::ChainNotFound {
        query: chain_id.to_string(),
    })
}

/// Walks the top-level document keys until it reaches the `byId` section.
struct DocumentScan {
    target: u64,
}

impl<'de> DeserializeSeed<'de> for DocumentScan {
    type Value = Option<ChainRecord>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DocumentScan {
    type Value = Option<ChainRecord>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a directory index document")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "byId" && found.is_none() {
                found = map.next_value_seed(IdSectionScan {
                    target: self.target,
                })?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

/// Walks the stringified-chain-ID keys of the `byId` section, decoding only
/// the entry that matches the target. Keys that fail integer parsing are
/// skipped, not fatal.
struct IdSectionScan {
    target: u64,
}

impl<'de> DeserializeSeed<'de> for IdSectionScan {
    type Value = Option<ChainRecord>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for IdSectionScan {
    type Value = Option<ChainRecord>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a chain-id keyed record mapping")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found: Option<ChainRecord> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.parse::<u64>() {
                Ok(id) if id == self.target && found.is_none() => {
                    found = Some(map.next_value()?);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(found)
    }
}
