//! Evaluator backends and task dispatch

pub mod command;
pub mod dispatch;
pub mod remote;
pub mod traits;

pub use command::CommandEvaluator;
pub use dispatch::{convert_to_items, run_evaluation};
pub use remote::RemoteEvaluator;
pub use traits::{
    parse_scores, EvalItem, Evaluator, EvaluatorError, EvaluatorResult, ItemScores,
};

use crate::config::{Backend, Config};

/// Builds evaluators for task names known to the configuration
pub struct EvaluatorRegistry {
    config: Config,
}

impl EvaluatorRegistry {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create the evaluator for `task` using the configured backend
    pub fn get_evaluator(&self, task: &str) -> EvaluatorResult<Box<dyn Evaluator>> {
        let (name, task_config) =
            self.config
                .get_task(task)
                .ok_or_else(|| EvaluatorError::UnknownTask {
                    task: task.to_string(),
                    known: self.config.task_names().join(", "),
                })?;

        let settings = &self.config.evaluator;
        let dimensions = task_config.dimensions.clone();

        let evaluator: Box<dyn Evaluator> = match settings.backend {
            Backend::Remote => Box::new(RemoteEvaluator::new(
                &settings.base_url,
                name,
                dimensions,
                settings.timeout_ms,
            )?),
            Backend::Command => Box::new(CommandEvaluator::new(
                &settings.program,
                settings.args.clone(),
                name,
                dimensions,
                settings.timeout_ms,
            )),
        };

        tracing::debug!("Using {} evaluator for task {}", evaluator.name(), name);
        Ok(evaluator)
    }
}
