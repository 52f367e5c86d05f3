//! HTTP client for a hosted scoring service

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};

use super::traits::{parse_scores, EvalItem, Evaluator, EvaluatorError, EvaluatorResult, ItemScores};

/// Evaluator reached over HTTP at `<base_url>/evaluate`
pub struct RemoteEvaluator {
    base_url: String,
    task: String,
    dimensions: Vec<String>,
    http_client: Client,
    timeout_ms: u64,
}

impl RemoteEvaluator {
    pub fn new(
        base_url: impl Into<String>,
        task: impl Into<String>,
        dimensions: Vec<String>,
        timeout_ms: u64,
    ) -> EvaluatorResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            task: task.into(),
            dimensions,
            http_client,
            timeout_ms,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/evaluate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    task: &'a str,
    dimensions: &'a [String],
    data: &'a [EvalItem],
}

#[async_trait]
impl Evaluator for RemoteEvaluator {
    fn name(&self) -> &str {
        "remote"
    }

    fn task(&self) -> &str {
        &self.task
    }

    fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    async fn evaluate(&self, items: &[EvalItem]) -> EvaluatorResult<Vec<ItemScores>> {
        let start = Instant::now();
        let url = self.endpoint();
        tracing::debug!("POST {} ({} items)", url, items.len());

        let body = EvaluateRequest {
            task: &self.task,
            dimensions: &self.dimensions,
            data: items,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvaluatorError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    EvaluatorError::Http(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EvaluatorError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let scores = parse_scores(&text)?;
        tracing::debug!(
            "Scored {} items in {}ms",
            scores.len(),
            start.elapsed().as_millis()
        );
        Ok(scores)
    }
}
