//! HTTP client for the Lambda Cloud API.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::CloudConfig;

use super::types::{
    ApiEnvelope, FileSystem, Instance, InstanceTypeCatalog, LaunchRequest, LaunchResponse,
    SshKey, TerminateRequest, TerminateResponse,
};

/// Typed client for the Lambda Cloud API v1.
///
/// Wraps [`reqwest::Client`] with the base URL and bearer token. All
/// endpoints return their payload inside a `{ "data": ... }` envelope which
/// the client unwraps.
#[derive(Debug, Clone)]
pub struct LambdaClient {
    api_base: String,
    api_key: String,
    http: reqwest::Client,
}

impl LambdaClient {
    /// Create a client for `base_url` authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build reqwest client");

        Self {
            api_base: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    /// Create a client from configuration, falling back to the
    /// `LAMBDA_LAB_API_KEY` environment variable (a `.env` file is honoured)
    /// when the config carries no key.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let api_key = if config.api_key.is_empty() {
            dotenvy::dotenv().ok();
            std::env::var("LAMBDA_LAB_API_KEY")
                .context("LAMBDA_LAB_API_KEY not set and no api_key in config")?
        } else {
            config.api_key.clone()
        };
        Ok(Self::new(&config.api_base, &api_key))
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{path}", self.api_base);
        debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .with_context(|| format!("failed to send GET {path}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {path} returned {status}: {text}");
        }

        let envelope: ApiEnvelope<T> = resp
            .json()
            .await
            .with_context(|| format!("failed to parse GET {path} response"))?;
        Ok(envelope.data)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}/{path}", self.api_base);
        debug!(%url, "POST");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to send POST {path}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("POST {path} returned {status}: {text}");
        }

        let envelope: ApiEnvelope<T> = resp
            .json()
            .await
            .with_context(|| format!("failed to parse POST {path} response"))?;
        Ok(envelope.data)
    }

    // ------------------------------------------------------------------
    // Endpoints
    // ------------------------------------------------------------------

    /// List all instances owned by the account.
    pub async fn list_instances(&self) -> Result<Vec<Instance>> {
        self.get("instances").await
    }

    /// List instance types and the regions where each has capacity.
    pub async fn instance_types(&self) -> Result<InstanceTypeCatalog> {
        self.get("instance-types").await
    }

    /// List registered SSH keys.
    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        self.get("ssh-keys").await
    }

    /// List persistent filesystems.
    pub async fn list_file_systems(&self) -> Result<Vec<FileSystem>> {
        self.get("file-systems").await
    }

    /// Launch instances; returns the new instance IDs.
    pub async fn launch_instance(&self, request: &LaunchRequest) -> Result<Vec<String>> {
        let resp: LaunchResponse = self.post("instance-operations/launch", request).await?;
        Ok(resp.instance_ids)
    }

    /// Terminate the given instances; returns what the API reports as
    /// terminated.
    pub async fn terminate_instances(&self, instance_ids: &[String]) -> Result<Vec<Instance>> {
        let request = TerminateRequest {
            instance_ids: instance_ids.to_vec(),
        };
        let resp: TerminateResponse = self
            .post("instance-operations/terminate", &request)
            .await?;
        Ok(resp.terminated_instances)
    }
}
