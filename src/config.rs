use serde::{Deserialize, Serialize};

use crate::reward::DEFAULT_TOLERANCE;

/// Complete configuration for the GSM8K GRPO toolkit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinnowConfig {
    pub reward: RewardConfig,
    pub data: DataConfig,
    pub train: TrainConfig,
    pub cloud: CloudConfig,
}

/// Reward scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Absolute tolerance for the numeric-equality fallback (default: 1e-6).
    /// One recognized value; kept configurable so it is independently
    /// testable rather than buried in comparison logic.
    pub tolerance: f64,
}

/// Dataset preparation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Hugging Face dataset identifier (default: "openai/gsm8k").
    pub dataset_id: String,
    /// Dataset configuration name (default: "main").
    pub dataset_config: String,
    /// Tag written into every record's `data_source` column (default: "gsm8k").
    pub data_source: String,
    /// Directory for the output parquet files (default: "~/data/gsm8k").
    pub output_dir: String,
    /// Rows fetched per datasets-server request (default: 100, the API cap).
    pub rows_per_request: usize,
    /// Base URL of the Hugging Face datasets-server.
    pub rows_api_base: String,
}

/// Training launcher configuration (verl GRPO + LoRA).
///
/// Defaults target a single 40GB A100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Base model path (default: "Qwen/Qwen2.5-3B-Instruct").
    pub model_path: String,
    /// Training parquet file (default: "~/data/gsm8k/train.parquet").
    pub train_files: String,
    /// Validation parquet file (default: "~/data/gsm8k/test.parquet").
    pub val_files: String,
    /// Training batch size (default: 16).
    pub train_batch_size: usize,
    /// Maximum prompt length in tokens (default: 512).
    pub max_prompt_length: usize,
    /// Maximum response length in tokens (default: 1024).
    pub max_response_length: usize,
    /// LoRA rank (default: 64).
    pub lora_rank: usize,
    /// LoRA alpha (default: 32).
    pub lora_alpha: usize,
    /// Whether to apply the KL loss term (default: true).
    pub use_kl_loss: bool,
    /// KL loss coefficient (default: 0.001).
    pub kl_loss_coef: f64,
    /// Actor learning rate (default: 1e-6).
    pub learning_rate: f64,
    /// Rollout backend name (default: "vllm").
    pub rollout_name: String,
    /// GPU memory utilization for the rollout backend (default: 0.6).
    pub gpu_memory_utilization: f64,
    /// Tensor parallel size (default: 1).
    pub tensor_parallel_size: usize,
    /// Total training epochs (default: 15).
    pub total_epochs: usize,
    /// Tracking project name (default: "qwen-gsm8k-grpo").
    pub project_name: String,
    /// Tracking experiment name (default: "qwen2.5-3b-lora").
    pub experiment_name: String,
    /// Checkpoint output directory (default: "~/checkpoints").
    pub checkpoint_dir: String,
}

/// Cloud GPU provisioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Base URL for the Lambda Cloud API.
    pub api_base: String,
    /// API key; filled from the LAMBDA_LAB_API_KEY environment variable
    /// when empty.
    pub api_key: String,
    /// Seconds between polls while waiting for an instance to become active.
    pub poll_interval_secs: u64,
}

impl Default for MinnowConfig {
    fn default() -> Self {
        Self {
            reward: RewardConfig::default(),
            data: DataConfig {
                dataset_id: "openai/gsm8k".into(),
                dataset_config: "main".into(),
                data_source: "gsm8k".into(),
                output_dir: "~/data/gsm8k".into(),
                rows_per_request: 100,
                rows_api_base: "https://datasets-server.huggingface.co".into(),
            },
            train: TrainConfig::default(),
            cloud: CloudConfig {
                api_base: "https://cloud.lambdalabs.com/api/v1".into(),
                api_key: String::new(),
                poll_interval_secs: 10,
            },
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model_path: "Qwen/Qwen2.5-3B-Instruct".into(),
            train_files: "~/data/gsm8k/train.parquet".into(),
            val_files: "~/data/gsm8k/test.parquet".into(),
            train_batch_size: 16,
            max_prompt_length: 512,
            max_response_length: 1024,
            lora_rank: 64,
            lora_alpha: 32,
            use_kl_loss: true,
            kl_loss_coef: 0.001,
            learning_rate: 1e-6,
            rollout_name: "vllm".into(),
            gpu_memory_utilization: 0.6,
            tensor_parallel_size: 1,
            total_epochs: 15,
            project_name: "qwen-gsm8k-grpo".into(),
            experiment_name: "qwen2.5-3b-lora".into(),
            checkpoint_dir: "~/checkpoints".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance_matches_constant() {
        assert_eq!(RewardConfig::default().tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = MinnowConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: MinnowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.data.dataset_id, "openai/gsm8k");
        assert_eq!(parsed.train.lora_rank, 64);
        assert_eq!(parsed.reward.tolerance, DEFAULT_TOLERANCE);
    }
}
