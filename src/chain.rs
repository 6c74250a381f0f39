use narrator_types::{LinkEndpoint, LinkStatus, LinkVerdict};
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::link::evaluate;
use crate::repository::NarratorRepository;

/// Evaluate each consecutive pair of a chain, earliest narrator first.
///
/// Returns `len - 1` verdicts, or none for chains shorter than two.
/// Every identifier must exist in the repository: an unknown name fails
/// the whole call before any pair is evaluated. Uniqueness is the
/// caller's business; a name repeated back to back is evaluated as a
/// pair with itself.
pub fn validate_chain<S>(
    identifiers: &[S],
    repository: &NarratorRepository,
) -> Result<Vec<LinkVerdict>>
where
    S: AsRef<str>,
{
    let records = identifiers
        .iter()
        .map(|id| repository.require(id.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let verdicts = records
        .windows(2)
        .map(|pair| {
            let (earlier, later) = (pair[0], pair[1]);
            if earlier.canonical_name == later.canonical_name {
                warn!(name = %earlier.canonical_name, "narrator repeated consecutively in chain");
            }
            evaluate(earlier, later)
        })
        .collect();
    Ok(verdicts)
}

// ── Chain report ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    pub link_count: usize,
    pub confirmed_links: usize,
    /// Pairs resolved to `LinkStatus::None`.
    pub unlinked_pairs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest: Option<LinkStatus>,
    /// At least one link, and every link at least weak.
    pub plausible: bool,
}

impl ChainSummary {
    pub fn from_links(links: &[LinkVerdict]) -> Self {
        let unlinked_pairs = links
            .iter()
            .filter(|l| l.status == LinkStatus::None)
            .count();
        Self {
            link_count: links.len(),
            confirmed_links: links.iter().filter(|l| l.is_confirmed()).count(),
            unlinked_pairs,
            weakest: links.iter().map(|l| l.status).min(),
            plausible: !links.is_empty() && unlinked_pairs == 0,
        }
    }
}

/// Everything the presentation layer needs for one chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub chain: Vec<String>,
    pub links: Vec<LinkVerdict>,
    /// Lifespans in chain order, for a timeline view.
    pub lifespans: Vec<LinkEndpoint>,
    pub summary: ChainSummary,
}

impl ChainReport {
    pub fn build<S>(identifiers: &[S], repository: &NarratorRepository) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let links = validate_chain(identifiers, repository)?;
        let lifespans = identifiers
            .iter()
            .map(|id| repository.require(id.as_ref()).map(LinkEndpoint::from))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            chain: identifiers.iter().map(|id| id.as_ref().to_string()).collect(),
            summary: ChainSummary::from_links(&links),
            links,
            lifespans,
        })
    }
}
