//! Lambda Cloud GPU provisioning client.
//!
//! Thin typed wrapper over the Lambda Cloud API v1, covering the operations
//! the training workflow needs: listing instances, instance types, SSH keys
//! and filesystems, launching an instance (with optional region
//! auto-selection and wait-until-active polling), and terminating instances.

pub mod client;
pub mod instances;
pub mod types;

pub use client::LambdaClient;
pub use instances::{launch, terminate, terminate_all, LaunchOptions};
pub use types::{FileSystem, Instance, InstanceTypeOffer, LaunchedInstance, Region, SshKey};
