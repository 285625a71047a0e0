//! Single-container views
//!
//! Callers that think in terms of individual containers (listings,
//! inspection) get a [`ContainerView`] reconstructed from a container
//! group on demand.

pub mod config;
pub mod view;

pub use config::{ContainerView, PortMapping, Protocol, UNKNOWN_STATUS};
pub use view::{container_group_to_container, group_to_views};
