//! Record assembly and parquet output.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{DataFrame, ParquetWriter};
use tracing::info;

use crate::config::DataConfig;

use super::gsm8k::{extract_ground_truth, format_prompt, Gsm8kFetcher, Gsm8kProblem};

/// One row of the training table.
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub data_source: String,
    pub prompt: String,
    pub ground_truth: String,
    /// JSON-encoded auxiliary metadata (original question and full answer).
    pub extra_info: String,
}

/// Build a [`PreparedRecord`] from one GSM8K problem.
pub fn build_record(data_source: &str, problem: &Gsm8kProblem) -> PreparedRecord {
    let extra_info = serde_json::json!({
        "question": problem.question,
        "full_answer": problem.answer,
    })
    .to_string();

    PreparedRecord {
        data_source: data_source.to_string(),
        prompt: format_prompt(&problem.question),
        ground_truth: extract_ground_truth(&problem.answer),
        extra_info,
    }
}

fn records_to_frame(records: &[PreparedRecord]) -> Result<DataFrame> {
    let data_sources: Vec<&str> = records.iter().map(|r| r.data_source.as_str()).collect();
    let prompts: Vec<&str> = records.iter().map(|r| r.prompt.as_str()).collect();
    let ground_truths: Vec<&str> = records.iter().map(|r| r.ground_truth.as_str()).collect();
    let extra_infos: Vec<&str> = records.iter().map(|r| r.extra_info.as_str()).collect();

    let df = polars::df!(
        "data_source" => data_sources,
        "prompt" => prompts,
        "ground_truth" => ground_truths,
        "extra_info" => extra_infos,
    )?;
    Ok(df)
}

/// Write the records as a parquet file at `path`.
pub fn write_parquet(records: &[PreparedRecord], path: &Path) -> Result<()> {
    let mut df = records_to_frame(records)?;
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("failed to write parquet to {}", path.display()))?;
    Ok(())
}

/// Download and preprocess both GSM8K splits into parquet files.
///
/// Produces `train.parquet` and `test.parquet` under the configured output
/// directory (tilde-expanded).
pub async fn prepare_dataset(config: &DataConfig) -> Result<()> {
    let output_dir = shellexpand::tilde(&config.output_dir).into_owned();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {output_dir}"))?;

    let fetcher = Gsm8kFetcher::new(config.clone());

    for split in ["train", "test"] {
        info!(split, "processing split");
        let problems = fetcher.fetch_split(split).await?;
        let records: Vec<PreparedRecord> = problems
            .iter()
            .map(|p| build_record(&config.data_source, p))
            .collect();

        let path = Path::new(&output_dir).join(format!("{split}.parquet"));
        write_parquet(&records, &path)?;
        info!(split, count = records.len(), path = %path.display(), "saved split");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_problem() -> Gsm8kProblem {
        Gsm8kProblem {
            question: "Natalia sold clips to 48 friends. How many clips?".into(),
            answer: "48 / 2 = 24 in May.\n48 + 24 = 72.\n#### 72".into(),
        }
    }

    #[test]
    fn test_build_record_fields() {
        let record = build_record("gsm8k", &sample_problem());
        assert_eq!(record.data_source, "gsm8k");
        assert_eq!(record.ground_truth, "72");
        assert!(record.prompt.contains("Natalia sold clips"));

        // extra_info must round-trip as JSON carrying the original fields.
        let info: serde_json::Value = serde_json::from_str(&record.extra_info).unwrap();
        assert_eq!(
            info["question"],
            "Natalia sold clips to 48 friends. How many clips?"
        );
        assert!(info["full_answer"].as_str().unwrap().contains("#### 72"));
    }

    #[test]
    fn test_records_to_frame_columns() {
        let records = vec![
            build_record("gsm8k", &sample_problem()),
            build_record("gsm8k", &sample_problem()),
        ];
        let df = records_to_frame(&records).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["data_source", "prompt", "ground_truth", "extra_info"]
        );
    }

    #[test]
    fn test_write_parquet_creates_file() {
        let records = vec![build_record("gsm8k", &sample_problem())];
        let dir = std::env::temp_dir().join("minnow-prepare-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.parquet");
        write_parquet(&records, &path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }
}
