//! Configuration management for the evaluator backend
//!
//! Loads the evaluator connection and task registry from TOML files and
//! provides runtime access.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Overrides `evaluator.base_url` when set
pub const EVALUATOR_URL_ENV: &str = "SIMEVAL_EVALUATOR_URL";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    /// Tasks the evaluator knows, keyed by task name
    #[serde(default = "default_tasks")]
    pub tasks: IndexMap<String, TaskConfig>,
}

/// How the external evaluator is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// HTTP scoring service
    Remote,
    /// Local program speaking JSON over stdin/stdout
    Command,
}

/// Evaluator connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Program for the command backend
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// A named evaluation task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Dimensions the evaluator scores for this task, in report order
    pub dimensions: Vec<String>,
}

// Default value functions
fn default_backend() -> Backend { Backend::Remote }
fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_program() -> String { "python".to_string() }
fn default_timeout_ms() -> u64 { 600_000 }

fn task(dimensions: &[&str]) -> TaskConfig {
    TaskConfig {
        dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
    }
}

fn default_tasks() -> IndexMap<String, TaskConfig> {
    let mut tasks = IndexMap::new();
    tasks.insert(
        "summarization".to_string(),
        task(&["coherence", "consistency", "fluency", "relevance"]),
    );
    tasks.insert(
        "dialogue".to_string(),
        task(&["naturalness", "coherence", "engagingness", "groundedness", "understandability"]),
    );
    tasks.insert("data2text".to_string(), task(&["naturalness", "informativeness"]));
    tasks.insert("fact".to_string(), task(&["consistency"]));
    tasks
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: default_base_url(),
            program: default_program(),
            args: Vec::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorConfig::default(),
            tasks: default_tasks(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from default config location or return defaults
    pub fn load_or_default() -> Self {
        let config_paths = [
            "config/evaluator.toml",
            "../config/evaluator.toml",
            "simeval/config/evaluator.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", path);
                        return config;
                    }
                    Err(e) => tracing::warn!("Ignoring {}: {}", path, e),
                }
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Load an explicit file if given, otherwise search the default locations.
    ///
    /// Environment overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            None => Self::load_or_default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(EVALUATOR_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("{} overrides evaluator base_url", EVALUATOR_URL_ENV);
                self.evaluator.base_url = url.trim().to_string();
            }
        }
    }

    /// Look up a task by name, ignoring case
    pub fn get_task(&self, name: &str) -> Option<(&str, &TaskConfig)> {
        self.tasks
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(key, task)| (key.as_str(), task))
    }

    /// Names of all configured tasks
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.keys().map(String::as_str).collect()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.evaluator.backend, Backend::Remote);
        assert!(config.tasks.contains_key("summarization"));
        assert_eq!(
            config.tasks["summarization"].dimensions,
            vec!["coherence", "consistency", "fluency", "relevance"]
        );
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[evaluator]
backend = "command"
program = "python3"
args = ["scripts/unieval_score.py", "--device", "cpu"]
timeout_ms = 1000

[tasks.simplification]
dimensions = ["fluency", "simplicity"]
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.evaluator.backend, Backend::Command);
        assert_eq!(config.evaluator.args.len(), 3);
        assert_eq!(config.evaluator.base_url, "http://127.0.0.1:8000");
        // An explicit task table replaces the defaults
        assert_eq!(config.task_names(), vec!["simplification"]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.task_names(), vec!["summarization", "dialogue", "data2text", "fact"]);
        assert_eq!(config.evaluator.timeout_ms, 600_000);
    }

    #[test]
    fn test_get_task_ignores_case() {
        let config = Config::default();
        let (name, task) = config.get_task("Summarization").unwrap();
        assert_eq!(name, "summarization");
        assert_eq!(task.dimensions.len(), 4);
        assert!(config.get_task("translation").is_none());
    }

    #[test]
    fn test_invalid_backend() {
        let err = Config::from_toml("[evaluator]\nbackend = \"grpc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/evaluator.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
