//! Compose project to container group conversion

use super::model::{
    Container, ContainerGroup, ContainerPort, EnvironmentVariable, IpAddress, IpType, OsType,
    ResourceRequirements, ResourceValues,
};
use super::sidecar::{dns_sidecar, DNS_SIDECAR_NAME};
use super::units::{memory_to_gb, parse_cpus};
use crate::compose::{Project, Service};
use crate::context::DeploymentContext;
use crate::error::{CorralError, Result};
use tracing::debug;

/// Memory requested when a service declares no limit
pub const DEFAULT_MEMORY_GB: f64 = 1.0;

/// CPU requested when a service declares no limit
pub const DEFAULT_CPU: f64 = 1.0;

/// Convert a compose project into a container group descriptor.
///
/// Services map one to one onto containers in declaration order. Projects
/// with more than one service also get the name resolution sidecar,
/// always as the last container.
pub fn to_container_group(ctx: &DeploymentContext, project: &Project) -> Result<ContainerGroup> {
    let mut containers = Vec::with_capacity(project.services.len() + 1);
    let mut group_ports: Vec<ContainerPort> = Vec::new();

    for service in &project.services {
        if service.name == DNS_SIDECAR_NAME {
            return Err(CorralError::ReservedServiceName(service.name.clone()));
        }
        if containers
            .iter()
            .any(|c: &Container| c.name.as_deref() == Some(service.name.as_str()))
        {
            return Err(CorralError::DuplicateService(service.name.clone()));
        }

        let container = service_to_container(service)?;
        for port in &container.ports {
            if !group_ports.contains(port) {
                group_ports.push(*port);
            }
        }
        containers.push(container);
    }

    if project.services.len() > 1 {
        debug!(
            "Adding name resolution sidecar for {} services",
            project.services.len()
        );
        containers.push(dns_sidecar(project));
    }

    let ip_address = if group_ports.is_empty() {
        None
    } else {
        Some(IpAddress {
            ip: None,
            ports: group_ports,
            ip_type: IpType::Public,
        })
    };

    Ok(ContainerGroup {
        name: Some(project.name.to_lowercase()),
        location: Some(ctx.location.clone()),
        subscription_id: Some(ctx.subscription_id.clone()),
        resource_group: Some(ctx.resource_group.clone()),
        os_type: OsType::Linux,
        containers,
        ip_address,
    })
}

fn service_to_container(service: &Service) -> Result<Container> {
    let ports = service
        .ports
        .iter()
        .map(|p| ContainerPort {
            port: p.target,
            protocol: Some(p.protocol),
        })
        .collect();

    let environment_variables = service
        .environment
        .iter()
        .map(|(name, value)| EnvironmentVariable {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();

    Ok(Container {
        name: Some(service.name.clone()),
        image: Some(service.image.clone()),
        command: service.command.clone(),
        ports,
        environment_variables,
        resources: Some(resources(service)?),
        instance_view: None,
    })
}

fn resources(service: &Service) -> Result<ResourceRequirements> {
    let Some(ref limits) = service.limits else {
        return Ok(ResourceRequirements {
            requests: ResourceValues {
                memory_in_gb: DEFAULT_MEMORY_GB,
                cpu: DEFAULT_CPU,
            },
            limits: None,
        });
    };

    let memory_in_gb = match limits.memory {
        Some(ref memory) => memory_to_gb(memory)?,
        None => DEFAULT_MEMORY_GB,
    };
    let cpu = match limits.cpus {
        Some(ref cpus) => parse_cpus(cpus)?,
        None => DEFAULT_CPU,
    };
    let values = ResourceValues { memory_in_gb, cpu };

    Ok(ResourceRequirements {
        requests: values,
        limits: Some(values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ServicePort;
    use crate::container::Protocol;
    use crate::group::sidecar::DNS_SIDECAR_IMAGE;

    fn test_context() -> DeploymentContext {
        DeploymentContext::new("aci", "subID", "rg", "eu")
    }

    #[test]
    fn test_project_name_lowercased() {
        let project = Project::new("TEST");
        let group = to_container_group(&test_context(), &project).unwrap();

        assert_eq!(group.name.as_deref(), Some("test"));
        assert_eq!(group.location.as_deref(), Some("eu"));
        assert_eq!(group.subscription_id.as_deref(), Some("subID"));
        assert_eq!(group.resource_group.as_deref(), Some("rg"));
        assert!(group.containers.is_empty());
    }

    #[test]
    fn test_single_service_has_no_sidecar() {
        let project = Project::new("").service(Service::new("service1", "image1"));
        let group = to_container_group(&test_context(), &project).unwrap();

        assert_eq!(group.containers.len(), 1);
        assert_eq!(group.containers[0].name.as_deref(), Some("service1"));
        assert_eq!(group.containers[0].image.as_deref(), Some("image1"));
    }

    #[test]
    fn test_multiple_services_get_dns_sidecar() {
        let project = Project::new("")
            .service(Service::new("service1", "image1"))
            .service(Service::new("service2", "image2"));
        let group = to_container_group(&test_context(), &project).unwrap();

        assert_eq!(group.containers.len(), 3);
        assert_eq!(group.containers[0].name.as_deref(), Some("service1"));
        assert_eq!(group.containers[1].name.as_deref(), Some("service2"));
        assert_eq!(group.containers[2].name.as_deref(), Some(DNS_SIDECAR_NAME));

        assert_eq!(
            group.containers[2].command,
            vec![
                "sh",
                "-c",
                "echo 127.0.0.1 service1 >> /etc/hosts;echo 127.0.0.1 service2 >> /etc/hosts;sleep infinity",
            ]
        );

        assert_eq!(group.containers[0].image.as_deref(), Some("image1"));
        assert_eq!(group.containers[1].image.as_deref(), Some("image2"));
        assert_eq!(group.containers[2].image.as_deref(), Some(DNS_SIDECAR_IMAGE));
    }

    #[test]
    fn test_service_fields_preserved() {
        let mut service = Service::new("api", "node:20")
            .command(&["npm", "start"])
            .port(3000)
            .limits(Some("512M"), Some("0.5"));
        service.environment.insert("NODE_ENV".to_string(), "production".to_string());
        let project = Project::new("shop").service(service);

        let group = to_container_group(&test_context(), &project).unwrap();
        let api = &group.containers[0];

        assert_eq!(api.command, vec!["npm", "start"]);
        assert_eq!(
            api.ports,
            vec![ContainerPort { port: 3000, protocol: Some(Protocol::Tcp) }]
        );
        assert_eq!(
            api.environment_variables,
            vec![EnvironmentVariable {
                name: "NODE_ENV".to_string(),
                value: "production".to_string(),
            }]
        );
        let resources = api.resources.as_ref().unwrap();
        let limits = resources.limits.unwrap();
        assert_eq!(limits.memory_in_gb, 0.5);
        assert_eq!(limits.cpu, 0.5);
        assert_eq!(resources.requests, limits);
    }

    #[test]
    fn test_default_resources_without_limits() {
        let project = Project::new("shop").service(Service::new("web", "nginx"));
        let group = to_container_group(&test_context(), &project).unwrap();
        let resources = group.containers[0].resources.as_ref().unwrap();

        assert_eq!(resources.requests.memory_in_gb, DEFAULT_MEMORY_GB);
        assert_eq!(resources.requests.cpu, DEFAULT_CPU);
        assert!(resources.limits.is_none());
    }

    #[test]
    fn test_group_ports_are_aggregated() {
        let mut db = Service::new("db", "postgres").port(5432);
        db.ports.push(ServicePort { target: 80, protocol: Protocol::Tcp });
        let project = Project::new("shop")
            .service(Service::new("web", "nginx").port(80))
            .service(db)
            .service(Service::new("worker", "busybox"));

        let group = to_container_group(&test_context(), &project).unwrap();
        let ip = group.ip_address.unwrap();

        assert_eq!(ip.ip, None);
        assert_eq!(ip.ip_type, IpType::Public);
        let ports: Vec<u16> = ip.ports.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![80, 5432]);
    }

    #[test]
    fn test_no_ports_no_ip_block() {
        let project = Project::new("batch").service(Service::new("job", "busybox"));
        let group = to_container_group(&test_context(), &project).unwrap();
        assert!(group.ip_address.is_none());
    }

    #[test]
    fn test_invalid_memory_propagates() {
        let project = Project::new("shop")
            .service(Service::new("web", "nginx").limits(Some("plenty"), None));
        let result = to_container_group(&test_context(), &project);

        assert!(matches!(result, Err(CorralError::InvalidResource { .. })));
    }

    #[test]
    fn test_reserved_sidecar_name_rejected() {
        let project = Project::new("shop")
            .service(Service::new("web", "nginx"))
            .service(Service::new(DNS_SIDECAR_NAME, "busybox"));
        let result = to_container_group(&test_context(), &project);

        assert!(matches!(result, Err(CorralError::ReservedServiceName(_))));
    }

    #[test]
    fn test_duplicate_service_names_rejected() {
        let project = Project::new("shop")
            .service(Service::new("web", "nginx"))
            .service(Service::new("web", "httpd"));
        let result = to_container_group(&test_context(), &project);

        assert!(matches!(result, Err(CorralError::DuplicateService(ref name)) if name == "web"));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let mut web = Service::new("Web", "nginx").port(80);
        web.environment.insert("B".to_string(), "2".to_string());
        web.environment.insert("A".to_string(), "1".to_string());
        let project = Project::new("Shop")
            .service(web)
            .service(Service::new("db", "postgres").limits(Some("1g"), Some("2")));

        let first = to_container_group(&test_context(), &project).unwrap();
        let second = to_container_group(&test_context(), &project).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
