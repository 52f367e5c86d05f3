//! Evaluator backed by a local program
//!
//! The program receives `--task <name>` and the items as a JSON array on
//! stdin, and must print a JSON array of score objects on stdout.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::traits::{parse_scores, EvalItem, Evaluator, EvaluatorError, EvaluatorResult, ItemScores};

const STDERR_LIMIT: usize = 2000;

pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
    task: String,
    dimensions: Vec<String>,
    timeout_ms: u64,
}

impl CommandEvaluator {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        task: impl Into<String>,
        dimensions: Vec<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            task: task.into(),
            dimensions,
            timeout_ms,
        }
    }
}

fn truncate(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.len() <= STDERR_LIMIT {
        text.to_string()
    } else {
        let cut = (0..=STDERR_LIMIT).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &text[..cut])
    }
}

#[async_trait]
impl Evaluator for CommandEvaluator {
    fn name(&self) -> &str {
        "command"
    }

    fn task(&self) -> &str {
        &self.task
    }

    fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    async fn evaluate(&self, items: &[EvalItem]) -> EvaluatorResult<Vec<ItemScores>> {
        let payload = serde_json::to_vec(items).map_err(|e| EvaluatorError::Parse(e.to_string()))?;

        tracing::debug!("Spawning {} {:?} --task {}", self.program, self.args, self.task);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--task")
            .arg(&self.task)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EvaluatorError::Process(format!("failed to spawn {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EvaluatorError::Process("stdin not captured".to_string()))?;

        // Feed stdin while collecting output so a chatty child cannot block on a full pipe
        let write = async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        };

        let timeout = Duration::from_millis(self.timeout_ms);
        let (written, output) =
            tokio::time::timeout(timeout, async { tokio::join!(write, child.wait_with_output()) })
                .await
                .map_err(|_| EvaluatorError::Timeout {
                    timeout_ms: self.timeout_ms,
                })?;

        let output = output?;

        if !output.status.success() {
            return Err(EvaluatorError::Process(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                truncate(&output.stderr)
            )));
        }

        if let Err(e) = written {
            // The child may legitimately exit before draining stdin
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(EvaluatorError::Io(e));
            }
            tracing::debug!("{} closed stdin early", self.program);
        }

        parse_scores(&String::from_utf8_lossy(&output.stdout))
    }
}
