//! Docker Compose file model
//!
//! Only the keys that survive translation into a container group are
//! modelled; everything else in a compose file is accepted and ignored.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Docker Compose file configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeFile {
    /// Compose file version
    #[serde(default)]
    pub version: Option<String>,
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
    /// Services, in declaration order
    #[serde(default, deserialize_with = "ordered_services")]
    pub services: Vec<(String, ServiceConfig)>,
}

impl ComposeFile {
    /// Look up a service by name
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// Image name
    #[serde(default)]
    pub image: Option<String>,
    /// Command to run
    #[serde(default)]
    pub command: Option<CommandConfig>,
    /// Environment variables
    #[serde(default)]
    pub environment: Option<EnvironmentConfig>,
    /// Port mappings
    #[serde(default)]
    pub ports: Option<Vec<PortConfig>>,
    /// Exposed ports (container side only)
    #[serde(default)]
    pub expose: Option<Vec<ScalarValue>>,
    /// Deploy configuration
    #[serde(default)]
    pub deploy: Option<DeployConfig>,
    /// Legacy memory limit
    #[serde(default)]
    pub mem_limit: Option<ScalarValue>,
    /// Legacy CPU limit
    #[serde(default)]
    pub cpus: Option<ScalarValue>,
}

impl ServiceConfig {
    /// Overlay another definition of the same service on top of this one
    pub fn merge(&mut self, overlay: ServiceConfig) {
        if overlay.image.is_some() {
            self.image = overlay.image;
        }
        if overlay.command.is_some() {
            self.command = overlay.command;
        }
        if overlay.environment.is_some() {
            self.environment = overlay.environment;
        }
        if overlay.ports.is_some() {
            self.ports = overlay.ports;
        }
        if overlay.expose.is_some() {
            self.expose = overlay.expose;
        }
        if overlay.deploy.is_some() {
            self.deploy = overlay.deploy;
        }
        if overlay.mem_limit.is_some() {
            self.mem_limit = overlay.mem_limit;
        }
        if overlay.cpus.is_some() {
            self.cpus = overlay.cpus;
        }
    }
}

/// Command configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Shell command string
    Shell(String),
    /// Exec form array
    Exec(Vec<String>),
}

/// Environment configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentConfig {
    /// Array of KEY=value strings
    Array(Vec<String>),
    /// Map of key to value
    Map(HashMap<String, Option<ScalarValue>>),
}

/// Port configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortConfig {
    /// Bare container port: `80`
    Number(u16),
    /// Short syntax: "8080:80"
    Short(String),
    /// Long syntax
    Long(PortConfigLong),
}

/// Long port configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortConfigLong {
    /// Target port in container
    pub target: u16,
    /// Published port on host
    pub published: Option<ScalarValue>,
    /// Host IP to bind to
    pub host_ip: Option<String>,
    /// Protocol (tcp/udp)
    pub protocol: Option<String>,
}

/// Deploy configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployConfig {
    /// Resource limits and reservations
    pub resources: Option<ResourcesConfig>,
}

/// Resources configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcesConfig {
    /// Resource limits
    pub limits: Option<ResourceSpec>,
    /// Resource reservations
    pub reservations: Option<ResourceSpec>,
}

/// Resource specification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceSpec {
    /// CPU limit/reservation
    pub cpus: Option<ScalarValue>,
    /// Memory limit/reservation
    pub memory: Option<ScalarValue>,
}

/// A YAML scalar that compose allows as either a number or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Text(s) => write!(f, "{}", s),
        }
    }
}

fn ordered_services<'de, D>(deserializer: D) -> Result<Vec<(String, ServiceConfig)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ServicesVisitor;

    impl<'de> Visitor<'de> for ServicesVisitor {
        type Value = Vec<(String, ServiceConfig)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of service names to service definitions")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut services: Vec<(String, ServiceConfig)> =
                Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, service)) = map.next_entry::<String, ServiceConfig>()? {
                if services.iter().any(|(existing, _)| *existing == name) {
                    return Err(de::Error::custom(format!("duplicate service '{}'", name)));
                }
                services.push((name, service));
            }
            Ok(services)
        }
    }

    deserializer.deserialize_map(ServicesVisitor)
}
