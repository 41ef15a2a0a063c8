//! Directory index construction.
//!
//! Fans out over the decoded records and fills the two mappings behind a
//! single insertion lock. The index is built privately and only handed to
//! the store once complete, so readers never observe a half-filled arena.

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::normalize::normalize_name;
use crate::types::{ChainRecord, DirectoryIndex};

/// Build the ID index and name index from a fresh feed pull.
///
/// Every non-empty alias among {name, short name, slug} is normalized and
/// mapped to the record's chain ID. Alias collisions resolve to whichever
/// record lands last; the feed keeps chain IDs unique so the ID index has no
/// such ambiguity.
pub fn build_index(records: Vec<ChainRecord>) -> DirectoryIndex {
    let index = Mutex::new(DirectoryIndex::default());

    records.into_par_iter().for_each(|record| {
        let aliases: Vec<String> = [
            record.name.as_str(),
            record.short_name.as_str(),
            record.chain_slug.as_deref().unwrap_or(""),
        ]
        .into_iter()
        .filter(|alias| !alias.is_empty())
        .map(normalize_name)
        .collect();

        let mut guard = index.lock();
        for alias in aliases {
            guard.by_name.insert(alias, record.chain_id);
        }
        guard.by_id.insert(record.chain_id, record);
    });

    index.into_inner()
}
