//! Results reporting

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::evaluator::ItemScores;

/// Scores of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub task: String,
    pub evaluator: String,
    pub timestamp: String,
    pub total_items: usize,
    /// Mean score per dimension, in first-seen order
    pub averages: IndexMap<String, f64>,
    pub items: Vec<ItemScores>,
}

impl EvaluationReport {
    /// Create from per-item scores
    pub fn from_scores(
        task: impl Into<String>,
        evaluator: impl Into<String>,
        items: Vec<ItemScores>,
    ) -> Self {
        Self {
            task: task.into(),
            evaluator: evaluator.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_items: items.len(),
            averages: average_scores(&items),
            items,
        }
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// Per-dimension mean over the items that carry the dimension
pub fn average_scores(items: &[ItemScores]) -> IndexMap<String, f64> {
    let mut totals: IndexMap<String, (f64, usize)> = IndexMap::new();
    for scores in items {
        for (dimension, &score) in scores {
            let entry = totals.entry(dimension.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(dimension, (sum, count))| (dimension, sum / count as f64))
        .collect()
}

/// Generate a console report
pub fn print_console_report(report: &EvaluationReport) {
    println!("\n=== {} Scores ===\n", report.task.to_uppercase());
    println!("Items: {}  (evaluator: {})\n", report.total_items, report.evaluator);

    println!("{:<20} {:>10}", "Dimensions", "Score");
    println!("{:-<31}", "");
    for (dimension, score) in &report.averages {
        println!("{:<20} {:>10.6}", dimension, score);
    }
    println!("{:=<31}", "");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> ItemScores {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_average_scores() {
        let items = vec![
            scores(&[("coherence", 0.5), ("fluency", 1.0)]),
            scores(&[("coherence", 1.0), ("fluency", 0.0), ("overall", 0.3)]),
        ];
        let avg = average_scores(&items);
        assert_eq!(avg.keys().collect::<Vec<_>>(), vec!["coherence", "fluency", "overall"]);
        assert_eq!(avg["coherence"], 0.75);
        assert_eq!(avg["fluency"], 0.5);
        // Averaged only over items that carry it
        assert_eq!(avg["overall"], 0.3);
    }

    #[test]
    fn test_empty_report() {
        let report = EvaluationReport::from_scores("summarization", "mock", Vec::new());
        assert_eq!(report.total_items, 0);
        assert!(report.averages.is_empty());
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let report = EvaluationReport::from_scores("fact", "mock", vec![scores(&[("consistency", 0.8)])]);
        report.write_to_file(&path).unwrap();

        let loaded: EvaluationReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.task, "fact");
        assert_eq!(loaded.averages["consistency"], 0.8);
    }
}
