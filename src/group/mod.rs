//! Container group descriptors
//!
//! This module translates compose projects into container groups, the
//! deployment unit of a backend that runs all containers of a deployment
//! inside a single network namespace.

pub mod convert;
pub mod model;
pub mod sidecar;
pub mod units;

pub use convert::to_container_group;
pub use model::{Container, ContainerGroup, ContainerPort, IpAddress};
pub use sidecar::{is_sidecar, DNS_SIDECAR_IMAGE, DNS_SIDECAR_NAME};
