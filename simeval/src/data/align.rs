//! Source/reference resolution and positional alignment

use std::path::{Path, PathBuf};

use super::reader::{read_document, Document, LoadError, TSV_REFERENCES_KEY, TSV_SOURCE_KEY};

/// Hypothesis field in model output files
pub const HYPOTHESIS_KEY: &str = "model_output";
/// Source field when hypotheses carry their own inputs
pub const BUNDLED_SOURCE_KEY: &str = "source";
/// Reference field when hypotheses carry their own inputs
pub const BUNDLED_REFERENCES_KEY: &str = "references";

/// Error type for alignment
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Number of {left} sentences ({left_len}) does not match number of {right} sentences ({right_len})")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("--ref_file requires --src_file")]
    ReferenceWithoutSource,
}

/// Reference sets stored sample-major: one row of references per source item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    rows: Vec<Vec<String>>,
}

impl ReferenceTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// `[samples × refs_per_sample]` to `[refs_per_sample × samples]`
    pub fn transpose(&self) -> Vec<Vec<String>> {
        transpose(&self.rows)
    }

    /// The first reference set, one reference per sample.
    ///
    /// Only reference set 0 is scored, even when samples carry more. Empty
    /// when any sample has no references.
    pub fn first_set(&self) -> Vec<String> {
        let set_count = self.rows.iter().map(Vec::len).min().unwrap_or(0);
        if set_count > 1 {
            tracing::warn!(
                "{} reference sets available, scoring against the first only",
                set_count
            );
        }
        if set_count == 0 {
            return Vec::new();
        }
        self.rows.iter().map(|row| row[0].clone()).collect()
    }
}

/// True transpose of a row-major table.
///
/// Ragged input is truncated to the shortest row, so every output row has
/// exactly one entry per input row.
pub fn transpose<T: Clone>(rows: &[Vec<T>]) -> Vec<Vec<T>> {
    let width = rows.iter().map(Vec::len).min().unwrap_or(0);
    (0..width)
        .map(|col| rows.iter().map(|row| row[col].clone()).collect())
        .collect()
}

/// Input files for one evaluation run
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub hyp_file: PathBuf,
    pub src_file: Option<PathBuf>,
    pub ref_file: Option<PathBuf>,
}

/// Where sources and references come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Separate source and reference files; the reference file is one reference set
    Explicit { src_file: PathBuf, ref_file: PathBuf },
    /// The source file carries `complex` sources and `simple` references
    SourceBundled { src_file: PathBuf },
    /// The hypothesis file carries `source` and `references`
    HypothesisBundled,
}

impl SourceStrategy {
    pub fn resolve(src_file: Option<&Path>, ref_file: Option<&Path>) -> Result<Self, AlignError> {
        match (src_file, ref_file) {
            (Some(src), Some(refs)) => Ok(SourceStrategy::Explicit {
                src_file: src.to_path_buf(),
                ref_file: refs.to_path_buf(),
            }),
            (Some(src), None) => Ok(SourceStrategy::SourceBundled {
                src_file: src.to_path_buf(),
            }),
            (None, None) => Ok(SourceStrategy::HypothesisBundled),
            (None, Some(_)) => Err(AlignError::ReferenceWithoutSource),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceStrategy::Explicit { .. } => "explicit",
            SourceStrategy::SourceBundled { .. } => "source-bundled",
            SourceStrategy::HypothesisBundled => "hypothesis-bundled",
        }
    }

    /// Produce sources and their reference table
    pub fn load(&self, hypotheses: &Document) -> Result<(Vec<String>, ReferenceTable), AlignError> {
        match self {
            SourceStrategy::Explicit { src_file, ref_file } => {
                tracing::info!("Loading src_file {}", src_file.display());
                let src = read_document(src_file)?;
                tracing::info!("Loading ref_file {}", ref_file.display());
                let refs = read_document(ref_file)?;
                explicit_sources(&src, &refs)
            }
            SourceStrategy::SourceBundled { src_file } => {
                tracing::info!(
                    "No ref_file provided. Assuming that src and refs are in src_file {}",
                    src_file.display()
                );
                let src = read_document(src_file)?;
                source_bundled(&src)
            }
            SourceStrategy::HypothesisBundled => {
                tracing::info!(
                    "No src_file or ref_file provided. Assuming that src and refs are in hyp_file {}",
                    hypotheses.path.display()
                );
                hypothesis_bundled(hypotheses)
            }
        }
    }
}

/// Sources from the src file, one reference set from the ref file
pub fn explicit_sources(
    src: &Document,
    refs: &Document,
) -> Result<(Vec<String>, ReferenceTable), AlignError> {
    let sources = src.texts(TSV_SOURCE_KEY)?;
    let references = refs.reference_sets(TSV_REFERENCES_KEY)?;
    Ok((sources, ReferenceTable::new(references)))
}

pub fn source_bundled(src: &Document) -> Result<(Vec<String>, ReferenceTable), AlignError> {
    let sources = src.field_texts(TSV_SOURCE_KEY)?;
    let references = src.field_references(TSV_REFERENCES_KEY)?;
    Ok((sources, ReferenceTable::new(references)))
}

pub fn hypothesis_bundled(hyp: &Document) -> Result<(Vec<String>, ReferenceTable), AlignError> {
    let sources = hyp.field_texts(BUNDLED_SOURCE_KEY)?;
    let references = hyp.field_references(BUNDLED_REFERENCES_KEY)?;
    Ok((sources, ReferenceTable::new(references)))
}

/// Three equal-length, position-aligned sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedCorpus {
    sources: Vec<String>,
    references: Vec<String>,
    hypotheses: Vec<String>,
}

impl AlignedCorpus {
    pub fn new(
        sources: Vec<String>,
        references: Vec<String>,
        hypotheses: Vec<String>,
    ) -> Result<Self, AlignError> {
        if sources.len() != references.len() {
            return Err(AlignError::LengthMismatch {
                left: "source",
                left_len: sources.len(),
                right: "reference",
                right_len: references.len(),
            });
        }
        if sources.len() != hypotheses.len() {
            return Err(AlignError::LengthMismatch {
                left: "source",
                left_len: sources.len(),
                right: "hypothesis",
                right_len: hypotheses.len(),
            });
        }

        Ok(Self {
            sources,
            references,
            hypotheses,
        })
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn hypotheses(&self) -> &[String] {
        &self.hypotheses
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Load, resolve, transpose and align every input of a run
pub fn load_corpus(paths: &InputPaths) -> Result<AlignedCorpus, AlignError> {
    let strategy = SourceStrategy::resolve(paths.src_file.as_deref(), paths.ref_file.as_deref())?;
    tracing::debug!("Resolved input strategy: {}", strategy.name());

    tracing::info!("Loading hyp_file {}", paths.hyp_file.display());
    let hyp = read_document(&paths.hyp_file)?;
    let hypotheses = hyp.texts(HYPOTHESIS_KEY)?;

    let (sources, table) = strategy.load(&hyp)?;
    let references = table.first_set();

    AlignedCorpus::new(sources, references, hypotheses)
}
