//! Launch and terminate orchestration on top of [`LambdaClient`].

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use super::client::LambdaClient;
use super::types::{LaunchRequest, LaunchedInstance};

/// Options controlling a launch operation.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// GPU instance type (e.g. `"gpu_1x_a100_sxm4"`).
    pub instance_type: String,
    /// Name of a registered SSH key.
    pub ssh_key: String,
    /// Region to launch in; auto-selected from available capacity when None.
    pub region: Option<String>,
    /// Optional filesystem to attach.
    pub filesystem: Option<String>,
    /// Optional instance name.
    pub name: Option<String>,
    /// Whether to block until the instance reports `active`.
    pub wait: bool,
    /// Seconds between status polls while waiting.
    pub poll_interval_secs: u64,
}

/// Launch a single instance, auto-selecting a region with capacity when
/// none was requested, and optionally polling until it becomes active.
pub async fn launch(client: &LambdaClient, opts: &LaunchOptions) -> Result<LaunchedInstance> {
    let region = match &opts.region {
        Some(region) => region.clone(),
        None => {
            let catalog = client.instance_types().await?;
            let offer = catalog
                .values()
                .find(|offer| offer.instance_type.name == opts.instance_type)
                .with_context(|| format!("unknown instance type {}", opts.instance_type))?;
            let region = offer
                .regions_with_capacity_available
                .first()
                .with_context(|| {
                    format!("no capacity available for {}", opts.instance_type)
                })?
                .name
                .clone();
            info!(%region, "auto-selected region");
            region
        }
    };

    let request = LaunchRequest {
        region_name: region.clone(),
        instance_type_name: opts.instance_type.clone(),
        ssh_key_names: vec![opts.ssh_key.clone()],
        file_system_names: opts.filesystem.iter().cloned().collect(),
        name: opts.name.clone(),
    };

    info!(instance_type = %opts.instance_type, %region, "launching instance");
    let instance_ids = client.launch_instance(&request).await?;
    let instance_id = instance_ids
        .into_iter()
        .next()
        .context("launch returned no instance ids")?;
    info!(%instance_id, "instance launched");

    if !opts.wait {
        return Ok(LaunchedInstance {
            instance_id,
            ip: None,
        });
    }

    // Poll until the instance reports active and has an IP.
    info!("waiting for instance to become active");
    loop {
        let instances = client.list_instances().await?;
        if let Some(instance) = instances.iter().find(|i| i.id == instance_id) {
            if instance.is_active() {
                info!(ip = ?instance.ip, "instance ready");
                return Ok(LaunchedInstance {
                    instance_id,
                    ip: instance.ip.clone(),
                });
            }
        }
        tokio::time::sleep(Duration::from_secs(opts.poll_interval_secs)).await;
        info!("still waiting...");
    }
}

/// Terminate the given instances.
pub async fn terminate(client: &LambdaClient, instance_ids: &[String]) -> Result<Vec<String>> {
    if instance_ids.is_empty() {
        bail!("no instance ids given");
    }
    let terminated = client.terminate_instances(instance_ids).await?;
    for instance in &terminated {
        info!(id = %instance.id, "terminated");
    }
    Ok(terminated.into_iter().map(|i| i.id).collect())
}

/// Terminate every running instance on the account.
pub async fn terminate_all(client: &LambdaClient) -> Result<Vec<String>> {
    let instances = client.list_instances().await?;
    if instances.is_empty() {
        info!("no running instances");
        return Ok(Vec::new());
    }
    let ids: Vec<String> = instances.into_iter().map(|i| i.id).collect();
    terminate(client, &ids).await
}
