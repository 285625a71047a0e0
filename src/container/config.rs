//! Logical container view types

use crate::error::CorralError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status label used when the backend has not reported a state yet
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Single-container view of a member of a container group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerView {
    /// Container ID
    pub id: String,
    /// Last observed state, as reported by the backend
    pub status: String,
    /// Image name/tag
    pub image: String,
    /// Command, joined with spaces
    pub command: String,
    /// Memory ceiling in gigabytes
    pub memory_limit: Option<f64>,
    /// Published ports
    pub ports: Vec<PortMapping>,
}

/// Port mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host_ip: String,
    pub host_port: u16,
    pub container_port: u16,
    pub protocol: Protocol,
}

impl std::fmt::Display for PortMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}->{}/{}",
            self.host_ip, self.host_port, self.container_port, self.protocol
        )
    }
}

/// Network protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = CorralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(CorralError::InvalidPort(format!(
                "unsupported protocol: {}",
                other
            ))),
        }
    }
}
