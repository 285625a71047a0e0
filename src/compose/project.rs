//! Normalized compose project
//!
//! A [`Project`] is what the group converter consumes: services in
//! declaration order with their fields already resolved from the
//! various compose syntaxes.

use super::config::{
    CommandConfig, ComposeFile, EnvironmentConfig, PortConfig, PortConfigLong, ScalarValue,
    ServiceConfig,
};
use super::parser::ComposeParser;
use crate::container::Protocol;
use crate::error::{CorralError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A compose project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project name, as declared
    pub name: String,
    /// Services, in declaration order
    pub services: Vec<Service>,
}

impl Project {
    /// Create an empty project
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            services: Vec::new(),
        }
    }

    /// Add a service
    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Names of all services, in declaration order
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A single service of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Service name
    pub name: String,
    /// Image reference
    pub image: String,
    /// Command override; empty means the image default
    #[serde(default)]
    pub command: Vec<String>,
    /// Environment variables
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Exposed container ports
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    /// Resource limits
    #[serde(default)]
    pub limits: Option<ResourceLimits>,
}

impl Service {
    /// Create a new service
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            ..Self::default()
        }
    }

    /// Set the command
    pub fn command(mut self, command: &[&str]) -> Self {
        self.command = command.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Expose a TCP port
    pub fn port(mut self, target: u16) -> Self {
        self.ports.push(ServicePort {
            target,
            protocol: Protocol::Tcp,
        });
        self
    }

    /// Set resource limits
    pub fn limits(mut self, memory: Option<&str>, cpus: Option<&str>) -> Self {
        self.limits = Some(ResourceLimits {
            memory: memory.map(str::to_string),
            cpus: cpus.map(str::to_string),
        });
        self
    }
}

/// Container port exposed by a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub target: u16,
    pub protocol: Protocol,
}

/// Resource limits, in compose notation (`"512M"`, `"0.5"`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub memory: Option<String>,
    pub cpus: Option<String>,
}

/// Where to load a project from
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Explicit project name, overriding the file and directory names
    pub name: Option<String>,
    /// Compose files; when empty the working directory is searched
    pub files: Vec<PathBuf>,
    /// Project working directory
    pub working_dir: PathBuf,
    /// Variables available for interpolation
    pub env: HashMap<String, String>,
}

impl ProjectOptions {
    /// Options for a project rooted at `working_dir`
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ..Self::default()
        }
    }
}

/// Load and normalize a project
pub fn load_project(options: &ProjectOptions) -> Result<Project> {
    let files = if options.files.is_empty() {
        let found = ComposeParser::find_compose_file(&options.working_dir).ok_or_else(|| {
            CorralError::ComposeFileNotFound(options.working_dir.display().to_string())
        })?;
        vec![found]
    } else {
        options.files.clone()
    };

    debug!("Loading compose files: {:?}", files);

    let paths: Vec<&std::path::Path> = files.iter().map(|p| p.as_path()).collect();
    let mut file = ComposeParser::parse_files(&paths)?;
    ComposeParser::interpolate(&mut file, &options.env);

    let default_name = options
        .working_dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("default")
        .to_string();

    let mut project = file.into_project(&default_name)?;
    if let Some(ref name) = options.name {
        project.name = name.clone();
    }
    Ok(project)
}

impl ComposeFile {
    /// Normalize into a [`Project`], using `default_name` when the file
    /// does not declare one
    pub fn into_project(self, default_name: &str) -> Result<Project> {
        let name = self.name.unwrap_or_else(|| default_name.to_string());

        let services = self
            .services
            .into_iter()
            .map(|(name, config)| service_from_config(&name, config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Project { name, services })
    }
}

fn service_from_config(name: &str, config: ServiceConfig) -> Result<Service> {
    let image = config.image.ok_or_else(|| {
        CorralError::ComposeParse(format!("Service '{}' must have 'image' specified", name))
    })?;

    let command = match config.command {
        Some(CommandConfig::Shell(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(CommandConfig::Exec(arr)) => arr,
        None => Vec::new(),
    };

    let mut environment = BTreeMap::new();
    match config.environment {
        Some(EnvironmentConfig::Array(arr)) => {
            for item in arr {
                if let Some((key, value)) = item.split_once('=') {
                    environment.insert(key.to_string(), value.to_string());
                }
            }
        }
        Some(EnvironmentConfig::Map(map)) => {
            for (key, value) in map {
                if let Some(v) = value {
                    environment.insert(key, v.to_string());
                }
            }
        }
        None => {}
    }

    let mut ports: Vec<ServicePort> = Vec::new();
    for port in config.ports.unwrap_or_default() {
        for p in parse_port(name, &port)? {
            if !ports.contains(&p) {
                ports.push(p);
            }
        }
    }
    for exposed in config.expose.unwrap_or_default() {
        for p in parse_short_port(name, &exposed.to_string())? {
            if !ports.contains(&p) {
                ports.push(p);
            }
        }
    }

    let deploy_limits = config
        .deploy
        .and_then(|d| d.resources)
        .and_then(|r| r.limits);
    let memory = deploy_limits
        .as_ref()
        .and_then(|l| l.memory.as_ref())
        .or(config.mem_limit.as_ref())
        .map(ScalarValue::to_string);
    let cpus = deploy_limits
        .as_ref()
        .and_then(|l| l.cpus.as_ref())
        .or(config.cpus.as_ref())
        .map(ScalarValue::to_string);
    let limits = if memory.is_some() || cpus.is_some() {
        Some(ResourceLimits { memory, cpus })
    } else {
        None
    };

    Ok(Service {
        name: name.to_string(),
        image,
        command,
        environment,
        ports,
        limits,
    })
}

fn parse_port(service: &str, port: &PortConfig) -> Result<Vec<ServicePort>> {
    match port {
        PortConfig::Number(target) => Ok(vec![ServicePort {
            target: *target,
            protocol: Protocol::Tcp,
        }]),
        PortConfig::Short(s) => parse_short_port(service, s),
        PortConfig::Long(long) => parse_long_port(service, long),
    }
}

fn parse_long_port(service: &str, long: &PortConfigLong) -> Result<Vec<ServicePort>> {
    let protocol: Protocol = match long.protocol.as_deref() {
        Some(p) => p.parse()?,
        None => Protocol::Tcp,
    };
    if let Some(ref published) = long.published {
        if published.to_string() != long.target.to_string() {
            warn!(
                "Service '{}': published port {} ignored, container groups expose port {} as is",
                service, published, long.target
            );
        }
    }
    Ok(vec![ServicePort {
        target: long.target,
        protocol,
    }])
}

/// Parse `[[ip:]published:]target[/protocol]`; target may be a range
fn parse_short_port(service: &str, raw: &str) -> Result<Vec<ServicePort>> {
    let (mapping, protocol): (&str, Protocol) = match raw.rsplit_once('/') {
        Some((mapping, proto)) => (mapping, proto.parse()?),
        None => (raw, Protocol::Tcp),
    };

    let (published, target) = match mapping.rsplit_once(':') {
        Some((rest, target)) => {
            let published = rest.rsplit_once(':').map(|(_, p)| p).unwrap_or(rest);
            (Some(published), target)
        }
        None => (None, mapping),
    };

    if let Some(published) = published {
        if !published.is_empty() && published != target {
            warn!(
                "Service '{}': published port {} ignored, container groups expose port {} as is",
                service, published, target
            );
        }
    }

    let (start, end) = match target.split_once('-') {
        Some((start, end)) => (parse_port_number(start, raw)?, parse_port_number(end, raw)?),
        None => {
            let port = parse_port_number(target, raw)?;
            (port, port)
        }
    };
    if start > end {
        return Err(CorralError::InvalidPort(raw.to_string()));
    }

    Ok((start..=end)
        .map(|target| ServicePort { target, protocol })
        .collect())
}

fn parse_port_number(value: &str, raw: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(CorralError::InvalidPort(raw.to_string())),
        Ok(port) => Ok(port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_services_keep_declaration_order() {
        let yaml = r#"
services:
  zeta:
    image: nginx
  alpha:
    image: redis
  mid:
    image: postgres
"#;

        let project = ComposeParser::parse_str(yaml)
            .unwrap()
            .into_project("demo")
            .unwrap();

        assert_eq!(project.name, "demo");
        assert_eq!(project.service_names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_declared_name_wins_over_directory() {
        let yaml = r#"
name: Shop
services:
  web:
    image: nginx
"#;

        let project = ComposeParser::parse_str(yaml)
            .unwrap()
            .into_project("checkout")
            .unwrap();
        assert_eq!(project.name, "Shop");
    }

    #[test]
    fn test_service_fields() {
        let yaml = r#"
services:
  api:
    image: node:20
    command: npm run start
    environment:
      NODE_ENV: production
      PORT: 3000
    ports:
      - "3000:3000"
      - "127.0.0.1:9229:9229/udp"
      - target: 8080
    deploy:
      resources:
        limits:
          memory: 512M
          cpus: "0.5"
"#;

        let project = ComposeParser::parse_str(yaml)
            .unwrap()
            .into_project("demo")
            .unwrap();
        let api = &project.services[0];

        assert_eq!(api.image, "node:20");
        assert_eq!(api.command, vec!["npm", "run", "start"]);
        assert_eq!(api.environment.get("NODE_ENV").unwrap(), "production");
        assert_eq!(api.environment.get("PORT").unwrap(), "3000");
        assert_eq!(
            api.ports,
            vec![
                ServicePort { target: 3000, protocol: Protocol::Tcp },
                ServicePort { target: 9229, protocol: Protocol::Udp },
                ServicePort { target: 8080, protocol: Protocol::Tcp },
            ]
        );
        assert_eq!(
            api.limits,
            Some(ResourceLimits {
                memory: Some("512M".to_string()),
                cpus: Some("0.5".to_string()),
            })
        );
    }

    #[test]
    fn test_port_range_expands() {
        let ports = parse_short_port("web", "8000-8002").unwrap();
        let targets: Vec<u16> = ports.iter().map(|p| p.target).collect();
        assert_eq!(targets, vec![8000, 8001, 8002]);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(parse_short_port("web", "http").is_err());
        assert!(parse_short_port("web", "80/sctp").is_err());
        assert!(parse_short_port("web", "90-80").is_err());
    }

    #[test]
    fn test_missing_image_rejected() {
        let yaml = r#"
services:
  web:
    command: ["serve"]
"#;

        let result = ComposeParser::parse_str(yaml).unwrap().into_project("demo");
        assert!(matches!(result, Err(CorralError::ComposeParse(_))));
    }

    #[test]
    fn test_load_project_from_working_dir() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("storefront");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("compose.yaml"),
            "services:\n  web:\n    image: nginx:${TAG:-latest}\n",
        )
        .unwrap();

        let project = load_project(&ProjectOptions::new(dir.clone())).unwrap();
        assert_eq!(project.name, "storefront");
        assert_eq!(project.services[0].image, "nginx:latest");

        let mut options = ProjectOptions::new(dir);
        options.name = Some("override".to_string());
        options.env.insert("TAG".to_string(), "1.25".to_string());
        let project = load_project(&options).unwrap();
        assert_eq!(project.name, "override");
        assert_eq!(project.services[0].image, "nginx:1.25");
    }

    #[test]
    fn test_load_project_without_compose_file() {
        let temp = tempdir().unwrap();
        let result = load_project(&ProjectOptions::new(temp.path().to_path_buf()));
        assert!(matches!(result, Err(CorralError::ComposeFileNotFound(_))));
    }
}
