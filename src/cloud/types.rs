//! Typed request/response structures for the Lambda Cloud API v1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The `{ "data": ... }` envelope every API response is wrapped in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// A region offering capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Region name (e.g. `"us-east-1"`).
    pub name: String,
    /// Human-readable description, when the API provides one.
    #[serde(default)]
    pub description: Option<String>,
}

/// Static description of a GPU instance type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceType {
    /// Type name (e.g. `"gpu_1x_a100_sxm4"`).
    pub name: String,
    /// Hourly price in cents.
    #[serde(default)]
    pub price_cents_per_hour: u64,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// An instance type together with where it can currently be launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceTypeOffer {
    pub instance_type: InstanceType,
    /// Regions that currently have capacity for this type.
    #[serde(default)]
    pub regions_with_capacity_available: Vec<Region>,
}

/// The map returned by the instance-types endpoint, keyed by type name.
pub type InstanceTypeCatalog = HashMap<String, InstanceTypeOffer>;

/// A running (or launching) instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Public IP, present once the instance is active.
    #[serde(default)]
    pub ip: Option<String>,
    /// Lifecycle status (e.g. `"booting"`, `"active"`, `"terminated"`).
    pub status: String,
    pub region: Region,
    pub instance_type: InstanceType,
}

impl Instance {
    /// Whether the instance has finished booting and is reachable.
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// A registered SSH key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKey {
    pub id: String,
    pub name: String,
}

/// A persistent filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<Region>,
}

/// Request body for launching an instance.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchRequest {
    pub region_name: String,
    pub instance_type_name: String,
    pub ssh_key_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_system_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload inside the launch response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchResponse {
    pub instance_ids: Vec<String>,
}

/// Request body for terminating instances.
#[derive(Debug, Clone, Serialize)]
pub struct TerminateRequest {
    pub instance_ids: Vec<String>,
}

/// Payload inside the terminate response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminateResponse {
    #[serde(default)]
    pub terminated_instances: Vec<Instance>,
}

/// The outcome of a launch operation as reported to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchedInstance {
    pub instance_id: String,
    /// Populated when the launch waited for the instance to become active.
    pub ip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_deserializes_from_api_shape() {
        let json = r#"{
            "data": [{
                "id": "inst-123",
                "status": "active",
                "ip": "203.0.113.7",
                "region": {"name": "us-east-1"},
                "instance_type": {"name": "gpu_1x_a100_sxm4", "price_cents_per_hour": 110}
            }]
        }"#;
        let envelope: ApiEnvelope<Vec<Instance>> = serde_json::from_str(json).unwrap();
        let instance = &envelope.data[0];
        assert!(instance.is_active());
        assert_eq!(instance.instance_type.name, "gpu_1x_a100_sxm4");
        assert_eq!(instance.ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_launch_request_omits_empty_optionals() {
        let request = LaunchRequest {
            region_name: "us-east-1".into(),
            instance_type_name: "gpu_1x_a100_sxm4".into(),
            ssh_key_names: vec!["my-key".into()],
            file_system_names: Vec::new(),
            name: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("file_system_names").is_none());
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_instance_type_catalog_shape() {
        let json = r#"{
            "data": {
                "gpu_1x_a100_sxm4": {
                    "instance_type": {"name": "gpu_1x_a100_sxm4", "price_cents_per_hour": 110},
                    "regions_with_capacity_available": [{"name": "us-west-2"}]
                }
            }
        }"#;
        let envelope: ApiEnvelope<InstanceTypeCatalog> = serde_json::from_str(json).unwrap();
        let offer = &envelope.data["gpu_1x_a100_sxm4"];
        assert_eq!(offer.regions_with_capacity_available[0].name, "us-west-2");
    }
}
