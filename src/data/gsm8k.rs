//! GSM8K download and field extraction.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::DataConfig;

/// One GSM8K problem as stored in the dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct Gsm8kProblem {
    pub question: String,
    /// Worked solution ending in `#### <number>`.
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Gsm8kProblem,
}

#[derive(Debug, Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    num_rows_total: u64,
}

/// Format a question into the training prompt.
///
/// The instruction to put the final answer after `####` is what makes the
/// reward extractor's marker strategy reliable.
pub fn format_prompt(question: &str) -> String {
    format!(
        "Solve this math problem step by step. Show your work and put your final answer after ####.\n\n\
         Question: {question}\n\n\
         Solution:"
    )
}

/// Extract the canonical ground-truth answer from a GSM8K answer field.
///
/// GSM8K answers have the form `"explanation #### number"`; the text after
/// the last `####` is the answer. Inputs without the marker are returned
/// trimmed.
pub fn extract_ground_truth(answer_text: &str) -> String {
    match answer_text.rsplit_once("####") {
        Some((_, tail)) => tail.trim().to_string(),
        None => answer_text.trim().to_string(),
    }
}

/// Paginated fetcher for GSM8K splits via the Hugging Face datasets-server
/// `/rows` endpoint.
pub struct Gsm8kFetcher {
    http: reqwest::Client,
    config: DataConfig,
}

impl Gsm8kFetcher {
    pub fn new(config: DataConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch every problem in `split` ("train" or "test").
    pub async fn fetch_split(&self, split: &str) -> Result<Vec<Gsm8kProblem>> {
        let url = format!("{}/rows", self.config.rows_api_base);
        let mut problems = Vec::new();
        let mut offset = 0usize;

        loop {
            debug!(split, offset, "fetching rows page");
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("dataset", self.config.dataset_id.as_str()),
                    ("config", self.config.dataset_config.as_str()),
                    ("split", split),
                    ("offset", &offset.to_string()),
                    ("length", &self.config.rows_per_request.to_string()),
                ])
                .send()
                .await
                .with_context(|| format!("failed to fetch {split} rows at offset {offset}"))?;

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                anyhow::bail!("datasets-server returned {status} for {split}: {text}");
            }

            let page: RowsPage = resp
                .json()
                .await
                .with_context(|| format!("failed to parse {split} rows at offset {offset}"))?;

            let fetched = page.rows.len();
            problems.extend(page.rows.into_iter().map(|entry| entry.row));
            offset += fetched;

            if fetched == 0 || offset as u64 >= page.num_rows_total {
                break;
            }
        }

        info!(split, count = problems.len(), "fetched split");
        Ok(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ground_truth_with_marker() {
        let answer = "She sold 5 clips.\nThen 5 * 2 = 10 more.\n#### 15";
        assert_eq!(extract_ground_truth(answer), "15");
    }

    #[test]
    fn test_extract_ground_truth_takes_last_marker() {
        let answer = "intermediate #### 7 revised #### 9";
        assert_eq!(extract_ground_truth(answer), "9");
    }

    #[test]
    fn test_extract_ground_truth_without_marker() {
        assert_eq!(extract_ground_truth("  42  "), "42");
    }

    #[test]
    fn test_format_prompt_contains_marker_instruction() {
        let prompt = format_prompt("What is 2 + 2?");
        assert!(prompt.contains("####"));
        assert!(prompt.contains("Question: What is 2 + 2?"));
        assert!(prompt.ends_with("Solution:"));
    }

    #[test]
    fn test_rows_page_deserializes() {
        let json = r#"{
            "features": [],
            "rows": [
                {"row_idx": 0, "row": {"question": "Q?", "answer": "A #### 3"}, "truncated_cells": []}
            ],
            "num_rows_total": 1
        }"#;
        let page: RowsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].row.answer, "A #### 3");
    }
}
