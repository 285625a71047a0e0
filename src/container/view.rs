//! Read-back from container groups to single containers

use super::config::{ContainerView, PortMapping, Protocol, UNKNOWN_STATUS};
use crate::error::{CorralError, Result};
use crate::group::model::{Container, ContainerGroup, ContainerPort, ResourceRequirements};
use crate::group::sidecar::is_sidecar;

/// Build the logical view of one member of a container group
pub fn container_group_to_container(
    container_id: &str,
    group: &ContainerGroup,
    container: &Container,
) -> Result<ContainerView> {
    if container.name.is_none() {
        return Err(CorralError::MissingField("container name".to_string()));
    }
    let image = container
        .image
        .clone()
        .ok_or_else(|| CorralError::MissingField("container image".to_string()))?;

    let status = container
        .instance_view
        .as_ref()
        .and_then(|view| view.current_state.as_ref())
        .and_then(|state| state.state.clone())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

    Ok(ContainerView {
        id: container_id.to_string(),
        status,
        image,
        command: container.command.join(" "),
        memory_limit: container.resources.as_ref().map(memory_limit),
        ports: to_ports(group.ip(), &container.ports),
    })
}

/// Views of every user container in a group, skipping the sidecar.
/// IDs take the form `<group>_<container>`.
pub fn group_to_views(group: &ContainerGroup) -> Result<Vec<ContainerView>> {
    let group_name = group
        .name
        .as_deref()
        .ok_or_else(|| CorralError::MissingField("group name".to_string()))?;

    group
        .containers
        .iter()
        .filter(|c| !is_sidecar(c))
        .map(|c| {
            let id = format!("{}_{}", group_name, c.name.as_deref().unwrap_or_default());
            container_group_to_container(&id, group, c)
        })
        .collect()
}

fn memory_limit(resources: &ResourceRequirements) -> f64 {
    resources
        .limits
        .map(|l| l.memory_in_gb)
        .unwrap_or(resources.requests.memory_in_gb)
}

/// Pair declared ports with the group's shared IP. Container groups do
/// not remap ports, so host and container port are the same.
fn to_ports(ip: Option<&str>, ports: &[ContainerPort]) -> Vec<PortMapping> {
    let Some(ip) = ip else {
        return Vec::new();
    };

    ports
        .iter()
        .map(|p| PortMapping {
            host_ip: ip.to_string(),
            host_port: p.port,
            container_port: p.port,
            protocol: p.protocol.unwrap_or(Protocol::Tcp),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::model::{
        ContainerState, InstanceView, IpAddress, ResourceValues,
    };
    use crate::group::DNS_SIDECAR_NAME;

    fn running_group() -> ContainerGroup {
        ContainerGroup {
            name: Some("shop".to_string()),
            ip_address: Some(IpAddress {
                ip: Some("42.42.42.42".to_string()),
                ports: vec![ContainerPort { port: 80, protocol: None }],
                ..IpAddress::default()
            }),
            ..ContainerGroup::default()
        }
    }

    fn my_container() -> Container {
        Container {
            name: Some("myContainerID".to_string()),
            image: Some("sha256:666".to_string()),
            command: vec!["mycommand".to_string()],
            ports: vec![ContainerPort { port: 80, protocol: None }],
            instance_view: Some(InstanceView {
                restart_count: None,
                current_state: Some(ContainerState {
                    state: Some("Running".to_string()),
                    exit_code: None,
                }),
            }),
            resources: Some(ResourceRequirements {
                requests: ResourceValues { memory_in_gb: 1.0, cpu: 1.0 },
                limits: Some(ResourceValues { memory_in_gb: 9.0, cpu: 1.0 }),
            }),
            ..Container::default()
        }
    }

    #[test]
    fn test_container_group_to_container() {
        let view =
            container_group_to_container("myContainerID", &running_group(), &my_container())
                .unwrap();

        let expected = ContainerView {
            id: "myContainerID".to_string(),
            status: "Running".to_string(),
            image: "sha256:666".to_string(),
            command: "mycommand".to_string(),
            memory_limit: Some(9.0),
            ports: vec![PortMapping {
                host_ip: "42.42.42.42".to_string(),
                host_port: 80,
                container_port: 80,
                protocol: Protocol::Tcp,
            }],
        };
        assert_eq!(view, expected);
    }

    #[test]
    fn test_no_ip_means_no_ports() {
        let mut group = running_group();
        group.ip_address.as_mut().unwrap().ip = None;
        let view = container_group_to_container("id", &group, &my_container()).unwrap();
        assert!(view.ports.is_empty());

        group.ip_address = None;
        let view = container_group_to_container("id", &group, &my_container()).unwrap();
        assert!(view.ports.is_empty());
    }

    #[test]
    fn test_missing_state_is_unknown() {
        let mut container = my_container();
        container.instance_view = None;
        container.resources = None;

        let view = container_group_to_container("id", &running_group(), &container).unwrap();
        assert_eq!(view.status, UNKNOWN_STATUS);
        assert_eq!(view.memory_limit, None);
    }

    #[test]
    fn test_memory_falls_back_to_requests() {
        let mut container = my_container();
        container.resources.as_mut().unwrap().limits = None;

        let view = container_group_to_container("id", &running_group(), &container).unwrap();
        assert_eq!(view.memory_limit, Some(1.0));
    }

    #[test]
    fn test_udp_protocol_kept() {
        let mut container = my_container();
        container.ports = vec![ContainerPort { port: 53, protocol: Some(Protocol::Udp) }];

        let view = container_group_to_container("id", &running_group(), &container).unwrap();
        assert_eq!(view.ports[0].protocol, Protocol::Udp);
        assert_eq!(view.ports[0].to_string(), "42.42.42.42:53->53/udp");
    }

    #[test]
    fn test_missing_identity_fails() {
        let mut container = my_container();
        container.image = None;
        assert!(matches!(
            container_group_to_container("id", &running_group(), &container),
            Err(CorralError::MissingField(_))
        ));

        let mut container = my_container();
        container.name = None;
        assert!(container_group_to_container("id", &running_group(), &container).is_err());
    }

    #[test]
    fn test_group_to_views_skips_sidecar() {
        let mut group = running_group();
        let mut web = my_container();
        web.name = Some("web".to_string());
        let sidecar = Container {
            name: Some(DNS_SIDECAR_NAME.to_string()),
            image: Some("busybox".to_string()),
            ..Container::default()
        };
        group.containers = vec![web, sidecar];

        let views = group_to_views(&group).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, "shop_web");
    }
}
