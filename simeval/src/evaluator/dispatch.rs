//! Handing an aligned corpus to an evaluator

use crate::data::AlignedCorpus;
use crate::reporting::{print_console_report, EvaluationReport};

use super::traits::{EvalItem, Evaluator, EvaluatorError, EvaluatorResult};

/// Bundle hypotheses, sources and references into evaluator items.
///
/// Inputs are expected to be aligned; extra entries in a longer list are ignored.
pub fn convert_to_items(output_list: &[String], src_list: &[String], ref_list: &[String]) -> Vec<EvalItem> {
    output_list
        .iter()
        .zip(src_list)
        .zip(ref_list)
        .map(|((output, source), reference)| EvalItem::new(output, source, reference))
        .collect()
}

/// Score the corpus once and build a report
pub async fn run_evaluation(
    evaluator: &dyn Evaluator,
    corpus: &AlignedCorpus,
    print_result: bool,
) -> EvaluatorResult<EvaluationReport> {
    println!("------------------");
    println!("Evaluating as a {} task", evaluator.task().to_uppercase());
    println!("------------------");

    let items = convert_to_items(corpus.hypotheses(), corpus.sources(), corpus.references());
    tracing::info!("Scoring {} items with the {} evaluator", items.len(), evaluator.name());

    let scores = evaluator.evaluate(&items).await?;

    if scores.len() != items.len() {
        return Err(EvaluatorError::ScoreCount {
            expected: items.len(),
            actual: scores.len(),
        });
    }

    for dimension in evaluator.dimensions() {
        if scores.iter().any(|s| !s.contains_key(dimension)) {
            tracing::warn!("Dimension {} missing from some score sets", dimension);
        }
    }

    let report = EvaluationReport::from_scores(evaluator.task(), evaluator.name(), scores);
    if print_result {
        print_console_report(&report);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ItemScores;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scores each item by hypothesis length and records what it was given
    struct MockEvaluator {
        dimensions: Vec<String>,
        seen: Mutex<Vec<EvalItem>>,
        drop_last: bool,
    }

    impl MockEvaluator {
        fn new() -> Self {
            Self {
                dimensions: vec!["fluency".to_string(), "simplicity".to_string()],
                seen: Mutex::new(Vec::new()),
                drop_last: false,
            }
        }
    }

    #[async_trait]
    impl Evaluator for MockEvaluator {
        fn name(&self) -> &str {
            "mock"
        }

        fn task(&self) -> &str {
            "summarization"
        }

        fn dimensions(&self) -> &[String] {
            &self.dimensions
        }

        async fn evaluate(&self, items: &[EvalItem]) -> EvaluatorResult<Vec<ItemScores>> {
            self.seen.lock().unwrap().extend_from_slice(items);
            let mut scores: Vec<ItemScores> = items
                .iter()
                .map(|item| {
                    let mut s = ItemScores::new();
                    s.insert("fluency".to_string(), item.system_output.len() as f64);
                    s.insert("simplicity".to_string(), 1.0);
                    s
                })
                .collect();
            if self.drop_last {
                scores.pop();
            }
            Ok(scores)
        }
    }

    fn corpus() -> AlignedCorpus {
        AlignedCorpus::new(
            vec!["A".to_string(), "B".to_string()],
            vec!["x".to_string(), "y".to_string()],
            vec!["a".to_string(), "bbb".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_convert_to_items() {
        let items = convert_to_items(
            &["a".to_string()],
            &["A".to_string()],
            &["x".to_string()],
        );
        assert_eq!(items, vec![EvalItem::new("a", "A", "x")]);
    }

    #[tokio::test]
    async fn test_run_evaluation_passes_aligned_items() {
        let evaluator = MockEvaluator::new();
        let report = run_evaluation(&evaluator, &corpus(), false).await.unwrap();

        let seen = evaluator.seen.lock().unwrap();
        assert_eq!(seen[1], EvalItem::new("bbb", "B", "y"));
        assert_eq!(report.total_items, 2);
        assert_eq!(report.averages["fluency"], 2.0);
        assert_eq!(report.task, "summarization");
    }

    #[tokio::test]
    async fn test_run_evaluation_checks_score_count() {
        let mut evaluator = MockEvaluator::new();
        evaluator.drop_last = true;
        let err = run_evaluation(&evaluator, &corpus(), false).await.unwrap_err();
        assert!(matches!(
            err,
            EvaluatorError::ScoreCount { expected: 2, actual: 1 }
        ));
    }
}
