//! ASSET human ratings to evaluator meta-evaluation records
//!
//! Joins the long-format ratings table (one row per worker, sentence and
//! aspect) with the ten ASSET reference files, producing one record per
//! `(worker_id, original_sentence_id)` group. Each record carries a single
//! reference drawn at random from that sentence's reference set.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data::transpose;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_NUM_REFS: usize = 10;

/// Error type for reshaping
#[derive(Debug, thiserror::Error)]
pub enum ReshapeError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker {worker_id} sentence {sentence_id}: no `{aspect}` rating")]
    MissingAspect {
        worker_id: String,
        sentence_id: usize,
        aspect: String,
    },

    #[error("Worker {worker_id} sentence {sentence_id}: `{aspect}` rated {count} times")]
    DuplicateAspect {
        worker_id: String,
        sentence_id: usize,
        aspect: String,
        count: usize,
    },

    #[error("No references for sentence {doc_id}")]
    MissingReferences { doc_id: usize },
}

pub type ReshapeResult<T> = Result<T, ReshapeError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReshapeError + '_ {
    move |source| ReshapeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Annotator id from the ratings table.
///
/// Integer ids order numerically (`9` before `10`) and before any
/// non-numeric id; other ids order as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    fn numeric(&self) -> Option<u64> {
        self.0.trim().parse().ok()
    }
}

impl From<&str> for WorkerId {
    fn from(id: &str) -> Self {
        WorkerId(id.to_string())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for WorkerId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            // Equal values spelled differently ("7", "07") still need a total order
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for WorkerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One row of the human ratings CSV; other columns are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRow {
    pub worker_id: WorkerId,
    pub original_sentence_id: usize,
    pub original: String,
    pub simplification: String,
    pub aspect: String,
    pub rating: f64,
}

/// A record in the evaluator's meta-evaluation schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub source: String,
    pub system_output: String,
    pub reference: String,
    pub system_id: String,
    pub doc_id: usize,
    pub scores: IndexMap<String, f64>,
}

/// Group key: worker, then sentence
pub type GroupKey = (WorkerId, usize);

/// `<asset_dir>/dataset/asset.test.simp.<index>`
pub fn reference_path(asset_dir: &Path, index: usize) -> PathBuf {
    asset_dir.join("dataset").join(format!("asset.test.simp.{}", index))
}

/// `<asset_dir>/human_ratings/human_ratings.csv`
pub fn ratings_path(asset_dir: &Path) -> PathBuf {
    asset_dir.join("human_ratings").join("human_ratings.csv")
}

/// Read `num_refs` reference files and return one reference set per sentence
pub fn load_reference_sets(asset_dir: &Path, num_refs: usize) -> ReshapeResult<Vec<Vec<String>>> {
    let mut per_file = Vec::with_capacity(num_refs);
    for index in 0..num_refs {
        let path = reference_path(asset_dir, index);
        let content = std::fs::read_to_string(&path).map_err(io_error(&path))?;
        // Blank lines are kept so line numbers stay sentence ids
        let lines: Vec<String> = content.lines().map(|l| l.trim().to_string()).collect();
        tracing::debug!("Read {} references from {}", lines.len(), path.display());
        per_file.push(lines);
    }

    let lengths: Vec<usize> = per_file.iter().map(Vec::len).collect();
    if lengths.windows(2).any(|w| w[0] != w[1]) {
        tracing::warn!("Reference files differ in length {:?}; truncating to the shortest", lengths);
    }

    Ok(transpose(&per_file))
}

/// Load the ratings table
pub fn load_ratings(path: &Path) -> ReshapeResult<Vec<RatingRow>> {
    let file = File::open(path).map_err(io_error(path))?;
    read_ratings(file)
}

/// Parse ratings from any CSV source with a header row
pub fn read_ratings<R: std::io::Read>(reader: R) -> ReshapeResult<Vec<RatingRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Group rows by `(worker_id, original_sentence_id)` in ascending key order
pub fn group_ratings(rows: Vec<RatingRow>) -> BTreeMap<GroupKey, Vec<RatingRow>> {
    let mut groups: BTreeMap<GroupKey, Vec<RatingRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.worker_id.clone(), row.original_sentence_id))
            .or_default()
            .push(row);
    }
    groups
}

fn aspect_rating(key: &GroupKey, rows: &[RatingRow], aspect: &str) -> ReshapeResult<Option<f64>> {
    let ratings: Vec<f64> = rows
        .iter()
        .filter(|r| r.aspect == aspect)
        .map(|r| r.rating)
        .collect();

    match ratings.as_slice() {
        [] => Ok(None),
        [rating] => Ok(Some(*rating)),
        _ => Err(ReshapeError::DuplicateAspect {
            worker_id: key.0.to_string(),
            sentence_id: key.1,
            aspect: aspect.to_string(),
            count: ratings.len(),
        }),
    }
}

fn required_rating(key: &GroupKey, rows: &[RatingRow], aspect: &str) -> ReshapeResult<f64> {
    aspect_rating(key, rows, aspect)?.ok_or_else(|| ReshapeError::MissingAspect {
        worker_id: key.0.to_string(),
        sentence_id: key.1,
        aspect: aspect.to_string(),
    })
}

/// Pivot aspect ratings into evaluator dimensions.
///
/// `meaning` fills both `coherence` and `consistency`; downstream
/// meta-evaluation expects that duplication.
pub fn pivot_scores(key: &GroupKey, rows: &[RatingRow]) -> ReshapeResult<IndexMap<String, f64>> {
    let meaning = required_rating(key, rows, "meaning")?;
    let fluency = required_rating(key, rows, "fluency")?;

    let mut scores = IndexMap::new();
    scores.insert("coherence".to_string(), meaning);
    scores.insert("consistency".to_string(), meaning);
    scores.insert("fluency".to_string(), fluency);
    if let Some(simplicity) = aspect_rating(key, rows, "simplicity")? {
        scores.insert("simplicity".to_string(), simplicity);
    }
    Ok(scores)
}

/// Build the record for one group, drawing its reference from `rng`
pub fn build_record<R: Rng + ?Sized>(
    key: &GroupKey,
    rows: &[RatingRow],
    references: &[Vec<String>],
    rng: &mut R,
) -> ReshapeResult<AnnotatedRecord> {
    let doc_id = key.1;
    let scores = pivot_scores(key, rows)?;
    // Non-empty once the required aspects were found
    let first = &rows[0];

    let reference = references
        .get(doc_id)
        .and_then(|set| set.choose(rng))
        .cloned()
        .ok_or(ReshapeError::MissingReferences { doc_id })?;

    Ok(AnnotatedRecord {
        source: first.original.clone(),
        system_output: first.simplification.clone(),
        reference,
        system_id: String::new(),
        doc_id,
        scores,
    })
}

/// Group, pivot and sample references, then order records by `doc_id`
pub fn reshape<R: Rng + ?Sized>(
    rows: Vec<RatingRow>,
    references: &[Vec<String>],
    rng: &mut R,
) -> ReshapeResult<Vec<AnnotatedRecord>> {
    let groups = group_ratings(rows);
    tracing::debug!("{} (worker, sentence) groups", groups.len());

    let mut records = groups
        .iter()
        .map(|(key, rows)| build_record(key, rows, references, &mut *rng))
        .collect::<ReshapeResult<Vec<_>>>()?;

    // Stable: ties keep group order
    records.sort_by_key(|r| r.doc_id);
    Ok(records)
}

/// Write records as one JSON array, indented by four spaces
pub fn write_records(path: &Path, records: &[AnnotatedRecord]) -> ReshapeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut serializer)?;
    writer.flush().map_err(io_error(path))?;
    Ok(())
}
