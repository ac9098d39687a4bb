//! Minnow: GRPO fine-tuning operations for GSM8K.
//!
//! Provides subcommands for each operational step:
//!
//! - `prepare`    -- Download GSM8K and write the training parquet files
//! - `train`      -- Launch verl GRPO + LoRA training
//! - `score`      -- Spot-check the reward function on one solution/truth pair
//! - `launch`     -- Launch a cloud GPU instance
//! - `instances`  -- List instances, instance types, SSH keys, filesystems
//! - `terminate`  -- Terminate cloud instances

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use minnow::cloud::{self, LambdaClient, LaunchOptions};
use minnow::config::MinnowConfig;
use minnow::data::prepare_dataset;
use minnow::reward::RewardScorer;
use minnow::train::{TrainLauncher, TrainOverrides};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Minnow: GRPO fine-tuning operations for GSM8K
#[derive(Parser)]
#[command(name = "minnow", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download GSM8K and write train/test parquet files.
    Prepare {
        /// Output directory for the parquet files.
        #[arg(long)]
        output_dir: Option<String>,
    },

    /// Launch verl GRPO + LoRA training.
    Train {
        /// Number of training epochs.
        #[arg(long)]
        epochs: Option<usize>,

        /// Training batch size.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Actor learning rate.
        #[arg(long)]
        lr: Option<f64>,

        /// LoRA rank.
        #[arg(long)]
        lora_rank: Option<usize>,

        /// GPU memory utilization for vLLM (0.0-1.0).
        #[arg(long)]
        gpu_memory: Option<f64>,

        /// Print the command without executing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Score one solution against a ground-truth answer.
    Score {
        /// The model-generated solution text.
        #[arg(long)]
        solution: String,

        /// The ground-truth answer.
        #[arg(long)]
        truth: String,

        /// Data-source tag carried through to the scorer.
        #[arg(long, default_value = "gsm8k")]
        data_source: String,
    },

    /// Launch a cloud GPU instance.
    Launch {
        /// Instance type (e.g. gpu_1x_a100_sxm4).
        #[arg(long = "type", short = 't')]
        instance_type: String,

        /// Name of a registered SSH key.
        #[arg(long, short = 'k')]
        ssh_key: String,

        /// Region (auto-selects from available capacity if not specified).
        #[arg(long, short = 'r')]
        region: Option<String>,

        /// Filesystem name to attach.
        #[arg(long, short = 'f')]
        filesystem: Option<String>,

        /// Instance name.
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Don't wait for the instance to become active.
        #[arg(long)]
        no_wait: bool,
    },

    /// List running instances (default) or other account resources.
    Instances {
        /// List instance types and per-region capacity instead.
        #[arg(long)]
        types: bool,

        /// Only show instance types with available capacity.
        #[arg(long)]
        available_only: bool,

        /// List registered SSH keys instead.
        #[arg(long)]
        ssh_keys: bool,

        /// List filesystems instead.
        #[arg(long)]
        filesystems: bool,
    },

    /// Terminate cloud instances.
    Terminate {
        /// Instance IDs to terminate.
        instance_ids: Vec<String>,

        /// Terminate all running instances.
        #[arg(long)]
        all: bool,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load or create configuration.
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str::<MinnowConfig>(&text)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        }
        None => MinnowConfig::default(),
    };

    match cli.command {
        Commands::Prepare { output_dir } => cmd_prepare(&config, output_dir).await,
        Commands::Train {
            epochs,
            batch_size,
            lr,
            lora_rank,
            gpu_memory,
            dry_run,
        } => {
            let overrides = TrainOverrides {
                epochs,
                batch_size,
                learning_rate: lr,
                lora_rank,
                gpu_memory_utilization: gpu_memory,
            };
            cmd_train(&config, &overrides, dry_run).await
        }
        Commands::Score {
            solution,
            truth,
            data_source,
        } => cmd_score(&config, &data_source, &solution, &truth),
        Commands::Launch {
            instance_type,
            ssh_key,
            region,
            filesystem,
            name,
            no_wait,
        } => {
            let opts = LaunchOptions {
                instance_type,
                ssh_key,
                region,
                filesystem,
                name,
                wait: !no_wait,
                poll_interval_secs: config.cloud.poll_interval_secs,
            };
            cmd_launch(&config, &opts).await
        }
        Commands::Instances {
            types,
            available_only,
            ssh_keys,
            filesystems,
        } => cmd_instances(&config, types, available_only, ssh_keys, filesystems).await,
        Commands::Terminate { instance_ids, all } => {
            cmd_terminate(&config, instance_ids, all).await
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_prepare(config: &MinnowConfig, output_dir: Option<String>) -> Result<()> {
    let mut data_config = config.data.clone();
    if let Some(dir) = output_dir {
        data_config.output_dir = dir;
    }

    tracing::info!(dataset = %data_config.dataset_id, "preparing dataset");
    prepare_dataset(&data_config).await?;

    println!("Data preparation complete!");
    println!("  Train: {}/train.parquet", data_config.output_dir);
    println!("  Test:  {}/test.parquet", data_config.output_dir);
    Ok(())
}

async fn cmd_train(
    config: &MinnowConfig,
    overrides: &TrainOverrides,
    dry_run: bool,
) -> Result<()> {
    let launcher = TrainLauncher::new(config.train.clone());

    println!("GRPO + LoRA Training on GSM8K");
    println!("  Model:      {}", config.train.model_path);
    println!(
        "  Epochs:     {}",
        overrides.epochs.unwrap_or(config.train.total_epochs)
    );
    println!(
        "  Batch size: {}",
        overrides.batch_size.unwrap_or(config.train.train_batch_size)
    );
    println!(
        "  LoRA rank:  {}",
        overrides.lora_rank.unwrap_or(config.train.lora_rank)
    );

    launcher.run(overrides, dry_run).await?;

    if !dry_run {
        println!("Checkpoints saved to: {}", config.train.checkpoint_dir);
    }
    Ok(())
}

fn cmd_score(config: &MinnowConfig, data_source: &str, solution: &str, truth: &str) -> Result<()> {
    let scorer = RewardScorer::new(config.reward.clone());
    let reward = scorer.score(data_source, solution, truth, None);
    println!("{reward}");
    Ok(())
}

async fn cmd_launch(config: &MinnowConfig, opts: &LaunchOptions) -> Result<()> {
    let client = LambdaClient::from_config(&config.cloud)?;
    let launched = cloud::launch(&client, opts).await?;

    println!("Instance ID: {}", launched.instance_id);
    if let Some(ip) = &launched.ip {
        println!("IP: {ip}");
        println!("SSH: ssh -i <key.pem> ubuntu@{ip}");
    }
    Ok(())
}

async fn cmd_instances(
    config: &MinnowConfig,
    types: bool,
    available_only: bool,
    ssh_keys: bool,
    filesystems: bool,
) -> Result<()> {
    let client = LambdaClient::from_config(&config.cloud)?;

    if types {
        let catalog = client.instance_types().await?;
        println!("{:<25} {:<10} Available Regions", "Instance Type", "Price/hr");
        println!("{}", "-".repeat(80));
        for offer in catalog.values() {
            let regions: Vec<&str> = offer
                .regions_with_capacity_available
                .iter()
                .map(|r| r.name.as_str())
                .collect();
            if available_only && regions.is_empty() {
                continue;
            }
            let price = format!("${:.2}", offer.instance_type.price_cents_per_hour as f64 / 100.0);
            let regions_str = if regions.is_empty() {
                "No capacity".to_string()
            } else {
                regions.join(", ")
            };
            println!(
                "{:<25} {:<10} {}",
                offer.instance_type.name, price, regions_str
            );
        }
        return Ok(());
    }

    if ssh_keys {
        let keys = client.list_ssh_keys().await?;
        println!("{:<30} ID", "Name");
        println!("{}", "-".repeat(70));
        for key in keys {
            println!("{:<30} {}", key.name, key.id);
        }
        return Ok(());
    }

    if filesystems {
        let fs = client.list_file_systems().await?;
        if fs.is_empty() {
            println!("No filesystems");
            return Ok(());
        }
        println!("{:<30} {:<15} ID", "Name", "Region");
        println!("{}", "-".repeat(80));
        for f in fs {
            let region = f.region.map(|r| r.name).unwrap_or_else(|| "-".into());
            println!("{:<30} {:<15} {}", f.name, region, f.id);
        }
        return Ok(());
    }

    let instances = client.list_instances().await?;
    if instances.is_empty() {
        println!("No running instances");
        return Ok(());
    }
    println!(
        "{:<40} {:<25} {:<10} {:<15} Region",
        "ID", "Type", "Status", "IP"
    );
    println!("{}", "-".repeat(110));
    for i in instances {
        println!(
            "{:<40} {:<25} {:<10} {:<15} {}",
            i.id,
            i.instance_type.name,
            i.status,
            i.ip.as_deref().unwrap_or("N/A"),
            i.region.name
        );
    }
    Ok(())
}

async fn cmd_terminate(config: &MinnowConfig, instance_ids: Vec<String>, all: bool) -> Result<()> {
    let client = LambdaClient::from_config(&config.cloud)?;

    let terminated = if all {
        cloud::terminate_all(&client).await?
    } else if !instance_ids.is_empty() {
        cloud::terminate(&client, &instance_ids).await?
    } else {
        anyhow::bail!("pass instance ids or --all");
    };

    for id in terminated {
        println!("Terminated: {id}");
    }
    Ok(())
}
