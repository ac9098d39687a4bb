//! GSM8K dataset preparation.
//!
//! One-shot offline preprocessing: download the GSM8K splits from the
//! Hugging Face datasets-server, format each question into the training
//! prompt (which instructs the model to put its final answer after `####`),
//! extract the canonical ground-truth numeral from the reference answer,
//! and write one parquet file per split with the columns the trainer
//! expects: `data_source`, `prompt`, `ground_truth`, and a JSON-encoded
//! `extra_info`.
//!
//! The reward scorer is downstream of this module's `ground_truth` column
//! but has no dependency on how the table is built or stored.

pub mod gsm8k;
pub mod prepare;

pub use gsm8k::{extract_ground_truth, format_prompt, Gsm8kFetcher, Gsm8kProblem};
pub use prepare::{prepare_dataset, PreparedRecord};
