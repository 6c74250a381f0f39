//! Plausibility of a single transmission link between two narrators.
//!
//! Three signals are computed independently: how many years the two
//! lifespans share, which cities both stayed in, and whether either
//! record lists the other as teacher or student. They are reduced to one
//! [`LinkStatus`] by [`resolve_status`].

use std::collections::BTreeSet;

use narrator_types::{DirectRelation, LinkEndpoint, LinkStatus, LinkVerdict, NarratorRecord};

/// Shared years at or above which a pair is strong without further evidence.
pub const STRONG_OVERLAP_YEARS: u32 = 10;

/// Years both narrators were alive, floored at zero.
///
/// Disjoint lifespans and lifespans touching at a single year both give 0.
pub fn overlap_years(a: &NarratorRecord, b: &NarratorRecord) -> u32 {
    let start = a.birth_year.max(b.birth_year);
    let end = a.death_year.min(b.death_year);
    u32::try_from(end - start).unwrap_or(0)
}

pub fn shared_cities(a: &NarratorRecord, b: &NarratorRecord) -> BTreeSet<String> {
    a.cities.intersection(&b.cities).cloned().collect()
}

/// Look for a teacher/student edge recorded on either endpoint.
///
/// Datasets record the edge on one side only, so all four index
/// combinations are checked. A missing scholar index on either side
/// means no relation.
pub fn direct_relation(earlier: &NarratorRecord, later: &NarratorRecord) -> DirectRelation {
    let (Some(a), Some(b)) = (earlier.scholar_index, later.scholar_index) else {
        return DirectRelation::None;
    };

    if earlier.students_index.contains(&b) || later.teachers_index.contains(&a) {
        DirectRelation::ATeachesB
    } else if earlier.teachers_index.contains(&b) || later.students_index.contains(&a) {
        DirectRelation::AStudentOfB
    } else {
        DirectRelation::None
    }
}

/// First matching rule wins:
/// 1. recorded direct relation → `Strong`, whatever the overlap
/// 2. ≥ 10 shared years → `Strong`
/// 3. ≥ 1 shared year and a shared city → `StrongGeo`
/// 4. ≥ 1 shared year → `Weak`
/// 5. otherwise `None`
pub fn resolve_status(
    overlap_years: u32,
    has_shared_city: bool,
    direct: DirectRelation,
) -> LinkStatus {
    if direct.is_direct() || overlap_years >= STRONG_OVERLAP_YEARS {
        LinkStatus::Strong
    } else if overlap_years >= 1 && has_shared_city {
        LinkStatus::StrongGeo
    } else if overlap_years >= 1 {
        LinkStatus::Weak
    } else {
        LinkStatus::None
    }
}

/// Evaluate the pair `earlier → later`.
///
/// Argument order only affects the direction of the relation label;
/// overlap and shared cities are symmetric.
pub fn evaluate(earlier: &NarratorRecord, later: &NarratorRecord) -> LinkVerdict {
    let overlap_years = overlap_years(earlier, later);
    let shared_cities = shared_cities(earlier, later);
    let direct_relation = direct_relation(earlier, later);
    let status = resolve_status(overlap_years, !shared_cities.is_empty(), direct_relation);

    LinkVerdict {
        earlier: LinkEndpoint::from(earlier),
        later: LinkEndpoint::from(later),
        overlap_years,
        shared_cities,
        direct_relation,
        status,
    }
}
