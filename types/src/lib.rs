use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ── Reliability grade: distinguish "recorded" from "not recorded" ───────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value")]
pub enum Grade {
    Recorded(String),
    NotRecorded,
}

// ── Narrator record ─────────────────────────────────────────────────────

/// A cleaned narrator, as held by the repository.
///
/// Lifespans are Gregorian years. Records only exist with
/// `birth_year > 0`, `death_year > 0` and `birth_year != death_year`;
/// rows violating that never make it past the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarratorRecord {
    pub canonical_name: String,
    /// Name in the alternate (native) script, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name_native: Option<String>,
    pub birth_year: i32,
    pub death_year: i32,
    pub grade: Grade,
    /// Lowercased place names.
    #[serde(default)]
    pub cities: BTreeSet<String>,
    /// Identity used by the student/teacher indices; unrelated to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholar_index: Option<u32>,
    #[serde(default)]
    pub students_index: BTreeSet<u32>,
    #[serde(default)]
    pub teachers_index: BTreeSet<u32>,
}

impl NarratorRecord {
    /// Whether the lifespan satisfies the repository invariant.
    pub fn has_valid_lifespan(&self) -> bool {
        self.birth_year > 0 && self.death_year > 0 && self.birth_year != self.death_year
    }
}

// ── Link verdict ────────────────────────────────────────────────────────

/// Transmission plausibility of one consecutive pair, weakest first.
///
/// A recorded teacher/student relation resolves to `Strong`; such a
/// verdict is a confirmed link and outranks every other `Strong`
/// (see [`LinkVerdict::is_confirmed`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    None,
    Weak,
    StrongGeo,
    Strong,
}

impl LinkStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "strong overlap",
            Self::StrongGeo => "overlap with shared city",
            Self::Weak => "weak overlap",
            Self::None => "no overlap",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Strong => "✅",
            Self::StrongGeo => "🟢",
            Self::Weak => "⚠️",
            Self::None => "❌",
        }
    }
}

/// Recorded teacher/student edge between the earlier (A) and later (B)
/// narrator of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectRelation {
    None,
    ATeachesB,
    AStudentOfB,
}

impl DirectRelation {
    pub fn is_direct(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One side of an evaluated pair, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub name: String,
    pub birth_year: i32,
    pub death_year: i32,
}

impl LinkEndpoint {
    /// "800–870" style lifespan for tables.
    pub fn lifespan(&self) -> String {
        format!("{}–{}", self.birth_year, self.death_year)
    }
}

impl From<&NarratorRecord> for LinkEndpoint {
    fn from(record: &NarratorRecord) -> Self {
        Self {
            name: record.canonical_name.clone(),
            birth_year: record.birth_year,
            death_year: record.death_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkVerdict {
    pub earlier: LinkEndpoint,
    pub later: LinkEndpoint,
    pub overlap_years: u32,
    pub shared_cities: BTreeSet<String>,
    pub direct_relation: DirectRelation,
    pub status: LinkStatus,
}

impl LinkVerdict {
    /// A direct teacher/student record backs this link.
    pub fn is_confirmed(&self) -> bool {
        self.direct_relation.is_direct()
    }

    pub fn label(&self) -> &'static str {
        if self.is_confirmed() {
            "confirmed chain link"
        } else {
            self.status.label()
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.is_confirmed() {
            "🔗"
        } else {
            self.status.icon()
        }
    }
}
