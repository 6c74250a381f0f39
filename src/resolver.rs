//! Free-text narrator lookup.
//!
//! Matching strategy (in priority order):
//! 1. Case-insensitive substring match, in pool order
//! 2. Only if nothing matched as a substring: fuzzy match, best first
//!
//! An empty result is not an error; callers decide how to report it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repository::NarratorRepository;

pub const DEFAULT_LIMIT: usize = 8;
pub const DEFAULT_CUTOFF: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Maximum number of names returned.
    pub limit: usize,
    /// Minimum similarity for a fuzzy match, in `0.0..=1.0`.
    pub cutoff: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::Config("resolver limit must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(Error::Config(format!(
                "resolver cutoff must be between 0 and 1, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Rank pool entries against `query`, returning at most `limit` of them.
    pub fn resolve<'a, I>(&self, query: &str, pool: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let needle = normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let pool: Vec<(&'a str, String)> = pool
            .into_iter()
            .map(|name| (name, normalize(name)))
            .collect();

        let substring: Vec<&'a str> = pool
            .iter()
            .filter(|(_, norm)| norm.contains(&needle))
            .map(|(name, _)| *name)
            .take(self.config.limit)
            .collect();
        if !substring.is_empty() {
            return substring;
        }

        let mut scored: Vec<(&'a str, f64)> = pool
            .iter()
            .filter_map(|(name, norm)| {
                let score = similarity(&needle, norm);
                (score >= self.config.cutoff).then_some((*name, score))
            })
            .collect();
        // Stable sort: equal scores keep pool order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(self.config.limit)
            .map(|(name, _)| name)
            .collect()
    }

    /// Resolve against every name in the repository, in load order.
    pub fn resolve_in<'a>(&self, repository: &'a NarratorRepository, query: &str) -> Vec<&'a str> {
        self.resolve(query, repository.names())
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Similarity ratio in `0.0..=1.0` between two normalized names.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}
