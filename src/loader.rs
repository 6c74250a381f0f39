//! Dataset loading: raw narrator rows → cleaned [`NarratorRecord`]s.
//!
//! Expected input: a JSON array of row objects, either in one file or in
//! any number of `*.json` files under a directory. Rows come from
//! spreadsheet exports, so every field is loosely typed:
//!
//!   {"name_letters": "Malik ibn Anas", "birth_greg": 711, "death_greg": "795",
//!    "places_of_stay": "Medina, Mecca", "scholar_index": 30,
//!    "students_index": "31, 32, x", "teachers_index": [12, 13]}
//!
//! Bad rows, including array elements that are not row objects at all,
//! are dropped here and only counted; nothing downstream ever sees a
//! half-valid record. Only an unreadable file or a document that is not a
//! JSON array fails the load.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use narrator_types::{Grade, NarratorRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::repository::NarratorRepository;

// Comma, Arabic comma, semicolon
static RE_LIST_SEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,،;]").unwrap());

/// Strings spreadsheet exports use for an empty cell.
const BLANK_MARKERS: &[&str] = &["nan", "null", "none", "n/a"];

// ── Raw input row ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub name_letters: Option<Value>,
    /// Alternate-script name; preferred over `name_arabic` when both are set.
    #[serde(default)]
    pub name_native: Option<Value>,
    #[serde(default)]
    pub name_arabic: Option<Value>,
    #[serde(default)]
    pub birth_greg: Option<Value>,
    #[serde(default)]
    pub death_greg: Option<Value>,
    #[serde(default)]
    pub grade: Option<Value>,
    #[serde(default)]
    pub places_of_stay: Option<Value>,
    #[serde(default)]
    pub scholar_index: Option<Value>,
    #[serde(default)]
    pub students_index: Option<Value>,
    #[serde(default)]
    pub teachers_index: Option<Value>,
}

/// Why a row did not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    MissingName,
    MissingYear,
    InvalidLifespan,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub files: usize,
    pub rows_read: usize,
    pub loaded: usize,
    /// Array elements that are not a row object.
    pub malformed_row: usize,
    pub missing_name: usize,
    pub missing_year: usize,
    pub invalid_lifespan: usize,
    pub duplicate_name: usize,
    /// Individual index-list entries that were not valid integers.
    pub dropped_index_entries: usize,
}

impl LoadStats {
    pub fn rows_dropped(&self) -> usize {
        self.malformed_row
            + self.missing_name
            + self.missing_year
            + self.invalid_lifespan
            + self.duplicate_name
    }

    fn reject(&mut self, reason: RowRejection) {
        match reason {
            RowRejection::MissingName => self.missing_name += 1,
            RowRejection::MissingYear => self.missing_year += 1,
            RowRejection::InvalidLifespan => self.invalid_lifespan += 1,
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────

/// Load a dataset file, or every `*.json` file under a directory.
pub fn load_path(path: &Path) -> Result<(NarratorRepository, LoadStats)> {
    let files = discover_files(path)?;
    let mut rows = Vec::new();
    for file in &files {
        rows.extend(read_rows(file)?);
    }

    let (repo, mut stats) = load_rows(rows);
    stats.files = files.len();
    info!(
        files = stats.files,
        loaded = stats.loaded,
        dropped = stats.rows_dropped(),
        "loaded narrator dataset from {}",
        path.display()
    );
    Ok((repo, stats))
}

/// Dataset files under `path`, sorted by path for a stable load order.
pub fn discover_files(path: &Path) -> Result<Vec<PathBuf>> {
    let meta = fs::metadata(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Array elements of one dataset file, not yet checked to be rows.
pub fn read_rows(path: &Path) -> Result<Vec<Value>> {
    let json = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Clean rows in order and build the repository from the survivors.
pub fn load_rows<I>(rows: I) -> (NarratorRepository, LoadStats)
where
    I: IntoIterator<Item = Value>,
{
    let mut stats = LoadStats::default();
    let mut records = Vec::new();

    for (row_no, value) in rows.into_iter().enumerate() {
        stats.rows_read += 1;
        let row: RawRow = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                debug!(row = row_no, error = %e, "dropping malformed narrator row");
                stats.malformed_row += 1;
                continue;
            }
        };
        match clean_row(&row, &mut stats.dropped_index_entries) {
            Ok(record) => records.push(record),
            Err(reason) => {
                debug!(row = row_no, ?reason, "dropping narrator row");
                stats.reject(reason);
            }
        }
    }

    let (repo, skipped) = NarratorRepository::from_records_with_skips(records);
    stats.invalid_lifespan += skipped.invalid_lifespan;
    stats.duplicate_name = skipped.duplicate_name;
    stats.loaded = repo.len();
    (repo, stats)
}

/// Validate and coerce one row. Bad index entries are skipped and
/// tallied in `dropped_entries`; they never reject the row.
pub fn clean_row(
    row: &RawRow,
    dropped_entries: &mut usize,
) -> std::result::Result<NarratorRecord, RowRejection> {
    let canonical_name = text(row.name_letters.as_ref()).ok_or(RowRejection::MissingName)?;
    let birth_year = row
        .birth_greg
        .as_ref()
        .and_then(year)
        .ok_or(RowRejection::MissingYear)?;
    let death_year = row
        .death_greg
        .as_ref()
        .and_then(year)
        .ok_or(RowRejection::MissingYear)?;

    let record = NarratorRecord {
        canonical_name,
        display_name_native: text(row.name_native.as_ref())
            .or_else(|| text(row.name_arabic.as_ref())),
        birth_year,
        death_year,
        grade: match text(row.grade.as_ref()) {
            Some(g) => Grade::Recorded(g),
            None => Grade::NotRecorded,
        },
        cities: cities(row.places_of_stay.as_ref()),
        scholar_index: row.scholar_index.as_ref().and_then(index),
        students_index: index_list(row.students_index.as_ref(), dropped_entries),
        teachers_index: index_list(row.teachers_index.as_ref(), dropped_entries),
    };

    if !record.has_valid_lifespan() {
        return Err(RowRejection::InvalidLifespan);
    }
    Ok(record)
}

// ── Field coercion ───────────────────────────────────────────────────

fn is_blank(s: &str) -> bool {
    s.is_empty() || BLANK_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

/// Trimmed, non-blank text. Numbers are accepted as their decimal form.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!is_blank(s)).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer from a JSON number (integral floats allowed) or numeric string.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(integral))
}

fn integral(f: f64) -> Option<i64> {
    // `as` saturates; huge values then fail the i32/u32 conversion.
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn year(value: &Value) -> Option<i32> {
    integer(value).and_then(|n| i32::try_from(n).ok())
}

fn index(value: &Value) -> Option<u32> {
    integer(value).and_then(|n| u32::try_from(n).ok())
}

fn cities(value: Option<&Value>) -> BTreeSet<String> {
    let Some(raw) = text(value) else {
        return BTreeSet::new();
    };
    RE_LIST_SEP
        .split(&raw)
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !is_blank(c))
        .collect()
}

fn index_list(value: Option<&Value>, dropped: &mut usize) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    let mut push = |parsed: Option<u32>| match parsed {
        Some(i) => {
            out.insert(i);
        }
        None => *dropped += 1,
    };

    match value {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                push(index(item));
            }
        }
        Some(Value::String(s)) => {
            for piece in RE_LIST_SEP.split(s).map(str::trim) {
                if is_blank(piece) {
                    continue;
                }
                push(parse_integer(piece).and_then(|n| u32::try_from(n).ok()));
            }
        }
        Some(other) => push(index(other)),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    fn names(repo: &NarratorRepository) -> Vec<&str> {
        repo.names().collect()
    }

    fn clean(value: Value) -> std::result::Result<NarratorRecord, RowRejection> {
        let mut dropped = 0;
        clean_row(&row(value), &mut dropped)
    }

    #[test]
    fn test_clean_full_row() {
        let mut dropped = 0;
        let record = clean_row(
            &row(json!({
                "name_letters": " Malik ibn Anas ",
                "name_arabic": "مالك بن أنس",
                "birth_greg": 711,
                "death_greg": "795",
                "grade": "Thiqah",
                "places_of_stay": "Medina, Mecca ،Kufa;",
                "scholar_index": "30",
                "students_index": "31, 32, x, ",
                "teachers_index": [12, "13", "bad"],
            })),
            &mut dropped,
        )
        .unwrap();

        assert_eq!(record.canonical_name, "Malik ibn Anas");
        assert_eq!(record.display_name_native.as_deref(), Some("مالك بن أنس"));
        assert_eq!((record.birth_year, record.death_year), (711, 795));
        assert_eq!(record.grade, Grade::Recorded("Thiqah".to_string()));
        assert_eq!(
            record.cities.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["kufa", "mecca", "medina"]
        );
        assert_eq!(record.scholar_index, Some(30));
        assert_eq!(record.students_index, BTreeSet::from([31, 32]));
        assert_eq!(record.teachers_index, BTreeSet::from([12, 13]));
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_optional_fields_absent() {
        let record = clean(json!({
            "name_letters": "Nafi",
            "birth_greg": 650.0,
            "death_greg": 735,
            "grade": "nan",
            "places_of_stay": null,
        }))
        .unwrap();
        assert_eq!(record.grade, Grade::NotRecorded);
        assert!(record.cities.is_empty());
        assert_eq!(record.scholar_index, None);
        assert!(record.students_index.is_empty());
        assert_eq!(record.display_name_native, None);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            clean(json!({"birth_greg": 700, "death_greg": 760})),
            Err(RowRejection::MissingName)
        );
        assert_eq!(
            clean(json!({"name_letters": "  ", "birth_greg": 700, "death_greg": 760})),
            Err(RowRejection::MissingName)
        );
        assert_eq!(
            clean(json!({"name_letters": "A", "birth_greg": "unknown", "death_greg": 760})),
            Err(RowRejection::MissingYear)
        );
        assert_eq!(
            clean(json!({"name_letters": "A", "birth_greg": 700.5, "death_greg": 760})),
            Err(RowRejection::MissingYear)
        );
        assert_eq!(
            clean(json!({"name_letters": "A", "birth_greg": 760, "death_greg": 760})),
            Err(RowRejection::InvalidLifespan)
        );
        assert_eq!(
            clean(json!({"name_letters": "A", "birth_greg": 0, "death_greg": 760})),
            Err(RowRejection::InvalidLifespan)
        );
    }

    #[test]
    fn test_malformed_scholar_index_is_dropped() {
        let record = clean(json!({
            "name_letters": "A",
            "birth_greg": 700,
            "death_greg": 760,
            "scholar_index": "n/a",
            "students_index": 5,
        }))
        .unwrap();
        assert_eq!(record.scholar_index, None);
        assert_eq!(record.students_index, BTreeSet::from([5]));
    }

    #[test]
    fn test_load_rows_counts() {
        let rows = vec![
            json!({"name_letters": "A", "birth_greg": 700, "death_greg": 760}),
            json!({"name_letters": "B", "birth_greg": 740, "death_greg": 740}),
            json!({"name_letters": "A", "birth_greg": 710, "death_greg": 770}),
            json!({"name_letters": "C", "death_greg": 800}),
            json!({"birth_greg": 740, "death_greg": 800}),
            json!({
                "name_letters": "D",
                "birth_greg": 750,
                "death_greg": 810,
                "students_index": "1,?",
            }),
            json!("not a row"),
        ];
        let (repo, stats) = load_rows(rows);

        assert_eq!(names(&repo), vec!["A", "D"]);
        assert_eq!(repo.get("A").map(|r| r.birth_year), Some(700));
        assert_eq!(
            stats,
            LoadStats {
                files: 0,
                rows_read: 7,
                loaded: 2,
                malformed_row: 1,
                missing_name: 1,
                missing_year: 1,
                invalid_lifespan: 1,
                duplicate_name: 1,
                dropped_index_entries: 1,
            }
        );
        assert_eq!(stats.rows_dropped(), 5);
    }

    #[test]
    fn test_non_object_elements_skipped_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.json");
        fs::write(
            &path,
            r#"[{"name_letters": "A", "birth_greg": 700, "death_greg": 760}, null, 7, "x", true]"#,
        )
        .unwrap();

        let (repo, stats) = load_path(&path).unwrap();
        assert_eq!(names(&repo), vec!["A"]);
        assert_eq!(stats.malformed_row, 4);
        assert_eq!(stats.loaded, 1);
    }

    #[test]
    fn test_both_native_name_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        fs::write(
            &path,
            r#"[
              {"name_letters": "A", "birth_greg": 700, "death_greg": 760,
               "name_arabic": "x", "name_native": "y"},
              {"name_letters": "B", "birth_greg": 740, "death_greg": 800,
               "name_arabic": "z", "name_native": " nan "}
            ]"#,
        )
        .unwrap();

        let (repo, stats) = load_path(&path).unwrap();
        assert_eq!(stats.malformed_row, 0);
        assert_eq!(
            repo.get("A").and_then(|r| r.display_name_native.as_deref()),
            Some("y")
        );
        assert_eq!(
            repo.get("B").and_then(|r| r.display_name_native.as_deref()),
            Some("z")
        );
    }

    #[test]
    fn test_load_directory_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"[{"name_letters": "Second", "birth_greg": 800, "death_greg": 860}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"name_letters": "First", "birth_greg": 700, "death_greg": 760}]"#,
        )
        .unwrap();
        fs::write(
            nested.join("c.json"),
            r#"[{"name_letters": "Third", "birth_greg": 900, "death_greg": 960}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a dataset").unwrap();

        let (repo, stats) = load_path(dir.path()).unwrap();
        assert_eq!(stats.files, 3);
        assert_eq!(names(&repo), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_path(&missing), Err(Error::Io { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(load_path(&broken), Err(Error::Json { .. })));
    }
}
