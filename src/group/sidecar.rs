//! Name resolution sidecar
//!
//! Containers in a group share one IP and loopback but get no name
//! resolution between them. The sidecar writes a hosts entry for each
//! service pointing at loopback, then idles.

use super::model::{Container, ResourceRequirements, ResourceValues};
use crate::compose::Project;

/// Reserved name of the sidecar container
pub const DNS_SIDECAR_NAME: &str = "aci--dns--sidecar";

/// Image the sidecar runs
pub const DNS_SIDECAR_IMAGE: &str = "busybox:1.31.1";

const SIDECAR_MEMORY_GB: f64 = 0.1;
const SIDECAR_CPU: f64 = 0.01;

/// Shell expression that registers every service on loopback
pub fn hosts_command(service_names: &[&str]) -> String {
    let mut parts: Vec<String> = service_names
        .iter()
        .map(|name| format!("echo 127.0.0.1 {} >> /etc/hosts", name))
        .collect();
    parts.push("sleep infinity".to_string());
    parts.join(";")
}

/// Build the sidecar container for a project
pub fn dns_sidecar(project: &Project) -> Container {
    let names = project.service_names();
    Container {
        name: Some(DNS_SIDECAR_NAME.to_string()),
        image: Some(DNS_SIDECAR_IMAGE.to_string()),
        command: vec!["sh".to_string(), "-c".to_string(), hosts_command(&names)],
        resources: Some(ResourceRequirements {
            requests: ResourceValues {
                memory_in_gb: SIDECAR_MEMORY_GB,
                cpu: SIDECAR_CPU,
            },
            limits: None,
        }),
        ..Container::default()
    }
}

/// Whether a group member is the injected sidecar
pub fn is_sidecar(container: &Container) -> bool {
    container.name.as_deref() == Some(DNS_SIDECAR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_command() {
        assert_eq!(
            hosts_command(&["web", "db"]),
            "echo 127.0.0.1 web >> /etc/hosts;echo 127.0.0.1 db >> /etc/hosts;sleep infinity"
        );
        assert_eq!(hosts_command(&[]), "sleep infinity");
    }
}
