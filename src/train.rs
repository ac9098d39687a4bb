//! verl GRPO training launcher.
//!
//! The actual optimization runs in verl (`python3 -m verl.trainer.main_ppo`);
//! this module only builds the `key=value` parameter list from
//! [`TrainConfig`] plus CLI overrides and spawns the process. The reward
//! signal verl consumes during training is the scorer in [`crate::reward`].

use std::collections::BTreeMap;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::TrainConfig;

/// CLI-level overrides applied on top of [`TrainConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainOverrides {
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub learning_rate: Option<f64>,
    pub lora_rank: Option<usize>,
    pub gpu_memory_utilization: Option<f64>,
}

/// Builds and runs the verl training command.
pub struct TrainLauncher {
    config: TrainConfig,
}

impl TrainLauncher {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Build the full argument list for `python3 -m verl.trainer.main_ppo`.
    ///
    /// Parameters are emitted as `key=value` pairs in a deterministic
    /// (sorted) order; booleans are lowercased the way verl expects.
    pub fn build_command(&self, overrides: &TrainOverrides) -> Vec<String> {
        let cfg = &self.config;

        let epochs = overrides.epochs.unwrap_or(cfg.total_epochs);
        let batch_size = overrides.batch_size.unwrap_or(cfg.train_batch_size);
        let learning_rate = overrides.learning_rate.unwrap_or(cfg.learning_rate);
        let lora_rank = overrides.lora_rank.unwrap_or(cfg.lora_rank);
        let gpu_memory = overrides
            .gpu_memory_utilization
            .unwrap_or(cfg.gpu_memory_utilization);

        let mut params: BTreeMap<&str, String> = BTreeMap::new();

        // Algorithm.
        params.insert("algorithm.adv_estimator", "grpo".into());

        // Data.
        params.insert(
            "data.train_files",
            shellexpand::tilde(&cfg.train_files).into_owned(),
        );
        params.insert(
            "data.val_files",
            shellexpand::tilde(&cfg.val_files).into_owned(),
        );
        params.insert("data.train_batch_size", batch_size.to_string());
        params.insert("data.max_prompt_length", cfg.max_prompt_length.to_string());
        params.insert(
            "data.max_response_length",
            cfg.max_response_length.to_string(),
        );

        // Model + LoRA.
        params.insert("actor_rollout_ref.model.path", cfg.model_path.clone());
        params.insert("actor_rollout_ref.model.lora_rank", lora_rank.to_string());
        params.insert(
            "actor_rollout_ref.model.lora_alpha",
            cfg.lora_alpha.to_string(),
        );

        // Actor / policy.
        params.insert(
            "actor_rollout_ref.actor.use_kl_loss",
            cfg.use_kl_loss.to_string(),
        );
        params.insert(
            "actor_rollout_ref.actor.kl_loss_coef",
            cfg.kl_loss_coef.to_string(),
        );
        params.insert("actor_rollout_ref.actor.lr", learning_rate.to_string());

        // Rollout / generation.
        params.insert("actor_rollout_ref.rollout.name", cfg.rollout_name.clone());
        params.insert(
            "actor_rollout_ref.rollout.gpu_memory_utilization",
            gpu_memory.to_string(),
        );
        params.insert(
            "actor_rollout_ref.rollout.tensor_parallel_size",
            cfg.tensor_parallel_size.to_string(),
        );

        // Trainer.
        params.insert("trainer.total_epochs", epochs.to_string());
        params.insert("trainer.project_name", cfg.project_name.clone());
        params.insert("trainer.experiment_name", cfg.experiment_name.clone());
        params.insert(
            "trainer.default_hdfs_dir",
            shellexpand::tilde(&cfg.checkpoint_dir).into_owned(),
        );

        let mut cmd = vec![
            "python3".to_string(),
            "-m".to_string(),
            "verl.trainer.main_ppo".to_string(),
        ];
        cmd.extend(params.into_iter().map(|(k, v)| format!("{k}={v}")));
        cmd
    }

    /// Run the training process, or print the command when `dry_run`.
    ///
    /// Sets `CUDA_VISIBLE_DEVICES=0` and `TOKENIZERS_PARALLELISM=false` in
    /// the child environment and fails on a non-zero exit status.
    pub async fn run(&self, overrides: &TrainOverrides, dry_run: bool) -> Result<()> {
        let cmd = self.build_command(overrides);

        if dry_run {
            println!("Dry run - command to execute:");
            println!("{}", cmd.join(" \\\n  "));
            return Ok(());
        }

        info!(program = %cmd[0], args = cmd.len() - 1, "starting verl training");

        let status = tokio::process::Command::new(&cmd[0])
            .args(&cmd[1..])
            .env("CUDA_VISIBLE_DEVICES", "0")
            .env("TOKENIZERS_PARALLELISM", "false")
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .context("failed to spawn training process")?;

        if !status.success() {
            bail!("training failed with status {status}");
        }

        info!("training completed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_program_and_module() {
        let launcher = TrainLauncher::new(TrainConfig::default());
        let cmd = launcher.build_command(&TrainOverrides::default());
        assert_eq!(&cmd[..3], &["python3", "-m", "verl.trainer.main_ppo"]);
    }

    #[test]
    fn test_command_carries_defaults() {
        let launcher = TrainLauncher::new(TrainConfig::default());
        let cmd = launcher.build_command(&TrainOverrides::default());
        assert!(cmd.contains(&"algorithm.adv_estimator=grpo".to_string()));
        assert!(cmd.contains(&"trainer.total_epochs=15".to_string()));
        assert!(cmd.contains(&"actor_rollout_ref.model.lora_rank=64".to_string()));
        // Booleans are lowercased.
        assert!(cmd.contains(&"actor_rollout_ref.actor.use_kl_loss=true".to_string()));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let launcher = TrainLauncher::new(TrainConfig::default());
        let overrides = TrainOverrides {
            epochs: Some(3),
            batch_size: Some(8),
            learning_rate: Some(0.00005),
            lora_rank: Some(16),
            gpu_memory_utilization: Some(0.5),
        };
        let cmd = launcher.build_command(&overrides);
        assert!(cmd.contains(&"trainer.total_epochs=3".to_string()));
        assert!(cmd.contains(&"data.train_batch_size=8".to_string()));
        assert!(cmd.contains(&"actor_rollout_ref.actor.lr=0.00005".to_string()));
        assert!(cmd.contains(&"actor_rollout_ref.model.lora_rank=16".to_string()));
        assert!(cmd
            .contains(&"actor_rollout_ref.rollout.gpu_memory_utilization=0.5".to_string()));
    }

    #[test]
    fn test_command_is_deterministic() {
        let launcher = TrainLauncher::new(TrainConfig::default());
        let a = launcher.build_command(&TrainOverrides::default());
        let b = launcher.build_command(&TrainOverrides::default());
        assert_eq!(a, b);
    }
}
