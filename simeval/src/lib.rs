//! Simplification evaluation toolkit
//!
//! Loads model outputs, sources and references from plain text, TSV or JSONL
//! files, aligns them by position, and scores them with an external
//! multi-dimensional evaluator (coherence, consistency, fluency, relevance,
//! simplicity). Also reshapes ASSET human ratings into the evaluator's
//! meta-evaluation format.
//!
//! # Example
//!
//! ```no_run
//! use simeval::{
//!     config::Config,
//!     data::{load_corpus, InputPaths},
//!     evaluator::{run_evaluation, EvaluatorRegistry},
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let corpus = load_corpus(&InputPaths {
//!         hyp_file: "outputs/asset-test.jsonl".into(),
//!         src_file: Some("data/asset.test.jsonl".into()),
//!         ref_file: None,
//!     })?;
//!
//!     let registry = EvaluatorRegistry::new(Config::load_or_default());
//!     let evaluator = registry.get_evaluator("summarization")?;
//!     let report = run_evaluation(evaluator.as_ref(), &corpus, true).await?;
//!     println!("{:?}", report.averages);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod evaluator;
pub mod reporting;
pub mod reshape;

pub use config::Config;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{Backend, Config};
    pub use crate::data::{load_corpus, AlignError, AlignedCorpus, InputFormat, InputPaths, LoadError};
    pub use crate::evaluator::{
        convert_to_items, run_evaluation, EvalItem, Evaluator, EvaluatorError, EvaluatorRegistry,
        ItemScores,
    };
    pub use crate::reporting::{print_console_report, EvaluationReport};
    pub use crate::reshape::{reshape, AnnotatedRecord, RatingRow, ReshapeError};
}
