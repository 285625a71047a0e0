//! Container group descriptor
//!
//! Mirrors the shape the container-execution backend accepts and
//! returns. Fields the backend may omit in responses are optional.

use crate::container::Protocol;
use serde::{Deserialize, Serialize};

/// A container group: every container shares one network namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerGroup {
    /// Deployment name
    pub name: Option<String>,
    /// Target region
    pub location: Option<String>,
    /// Subscription the group is billed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Resource group the group is placed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    /// Guest operating system
    #[serde(default)]
    pub os_type: OsType,
    /// Member containers, in declaration order
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Shared network identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IpAddress>,
}

impl ContainerGroup {
    /// Find a member container by name
    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }

    /// The shared IP, once the backend has assigned one
    pub fn ip(&self) -> Option<&str> {
        self.ip_address.as_ref().and_then(|ip| ip.ip.as_deref())
    }
}

/// Guest operating system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    #[default]
    Linux,
    Windows,
}

/// A member container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: Option<String>,
    /// Image reference
    pub image: Option<String>,
    /// Command override
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Declared container ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<EnvironmentVariable>,
    /// Resource requests and limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    /// Runtime state, only present in backend responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_view: Option<InstanceView>,
}

/// A port declared by a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// An environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

/// Resource requests and limits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub requests: ResourceValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceValues>,
}

/// Memory and CPU amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceValues {
    /// Memory in gigabytes
    #[serde(rename = "memoryInGB")]
    pub memory_in_gb: f64,
    /// CPU cores
    pub cpu: f64,
}

/// Runtime state of a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    #[serde(default)]
    pub restart_count: Option<u32>,
    #[serde(default)]
    pub current_state: Option<ContainerState>,
}

/// Observed container state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    pub state: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

/// Shared network identity of a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    /// Assigned address; absent until the group runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Union of all container ports
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
    /// Address visibility
    #[serde(rename = "type", default)]
    pub ip_type: IpType,
}

/// Address visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpType {
    #[default]
    Public,
    Private,
}
