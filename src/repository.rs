use std::collections::HashMap;

use narrator_types::NarratorRecord;
use tracing::debug;

use crate::error::{Error, Result};

/// Immutable, name-indexed collection of cleaned narrator records.
///
/// Load order is preserved and doubles as the resolver's default pool
/// order. Nothing mutates a repository once built, so it can be shared
/// across threads by reference.
#[derive(Debug, Default)]
pub struct NarratorRepository {
    records: Vec<NarratorRecord>,
    by_name: HashMap<String, usize>,
    by_scholar: HashMap<u32, usize>,
}

/// Records [`NarratorRepository::from_records_with_skips`] left out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepositorySkips {
    pub invalid_lifespan: usize,
    pub duplicate_name: usize,
}

impl NarratorRepository {
    /// Build from records, enforcing the lifespan invariant and unique
    /// names. The first record with a given name or scholar index wins.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = NarratorRecord>,
    {
        Self::from_records_with_skips(records).0
    }

    /// Like [`from_records`](Self::from_records), also counting what was
    /// skipped.
    pub fn from_records_with_skips<I>(records: I) -> (Self, RepositorySkips)
    where
        I: IntoIterator<Item = NarratorRecord>,
    {
        let mut repo = Self::default();
        let mut skips = RepositorySkips::default();
        for record in records {
            if !record.has_valid_lifespan() {
                debug!(
                    name = %record.canonical_name,
                    birth = record.birth_year,
                    death = record.death_year,
                    "skipping record with invalid lifespan"
                );
                skips.invalid_lifespan += 1;
                continue;
            }
            if repo.by_name.contains_key(&record.canonical_name) {
                debug!(name = %record.canonical_name, "skipping duplicate narrator name");
                skips.duplicate_name += 1;
                continue;
            }

            let idx = repo.records.len();
            repo.by_name.insert(record.canonical_name.clone(), idx);
            if let Some(scholar) = record.scholar_index {
                repo.by_scholar.entry(scholar).or_insert(idx);
            }
            repo.records.push(record);
        }
        (repo, skips)
    }

    pub fn get(&self, name: &str) -> Option<&NarratorRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// Like [`get`](Self::get), but a missing name is an error.
    pub fn require(&self, name: &str) -> Result<&NarratorRecord> {
        self.get(name)
            .ok_or_else(|| Error::UnknownNarrator(name.to_string()))
    }

    pub fn by_scholar_index(&self, index: u32) -> Option<&NarratorRecord> {
        self.by_scholar.get(&index).map(|&i| &self.records[i])
    }

    /// Canonical names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.canonical_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NarratorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
