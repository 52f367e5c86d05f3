//! Evaluator trait definitions

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One unit handed to the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalItem {
    pub system_output: String,
    pub source: String,
    pub reference: String,
}

impl EvalItem {
    pub fn new(
        system_output: impl Into<String>,
        source: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            system_output: system_output.into(),
            source: source.into(),
            reference: reference.into(),
        }
    }
}

/// Scores for one item, keyed by dimension in evaluator order
pub type ItemScores = IndexMap<String, f64>;

/// Error types for evaluator operations
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Evaluator process failed: {0}")]
    Process(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown task `{task}` (known tasks: {known})")]
    UnknownTask { task: String, known: String },

    #[error("Evaluator returned {actual} score sets for {expected} items")]
    ScoreCount { expected: usize, actual: usize },
}

pub type EvaluatorResult<T> = Result<T, EvaluatorError>;

/// A task-specific scorer.
///
/// Implementations only move items to the scoring model and scores back;
/// the model itself lives outside this crate.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Backend name (e.g., "remote", "command")
    fn name(&self) -> &str;

    /// Task this evaluator scores as
    fn task(&self) -> &str;

    /// Dimensions expected in each score set
    fn dimensions(&self) -> &[String];

    /// Score every item, returning one score set per item in input order
    async fn evaluate(&self, items: &[EvalItem]) -> EvaluatorResult<Vec<ItemScores>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoresPayload {
    List(Vec<ItemScores>),
    Wrapped { scores: Vec<ItemScores> },
}

/// Parse an evaluator response: a JSON array of score maps, or `{"scores": [...]}`
pub fn parse_scores(body: &str) -> EvaluatorResult<Vec<ItemScores>> {
    match serde_json::from_str::<ScoresPayload>(body.trim()) {
        Ok(ScoresPayload::List(scores)) | Ok(ScoresPayload::Wrapped { scores }) => Ok(scores),
        Err(_) => {
            let preview: String = body.trim().chars().take(200).collect();
            Err(EvaluatorError::Parse(format!(
                "expected a list of score objects, got: {}",
                preview
            )))
        }
    }
}
