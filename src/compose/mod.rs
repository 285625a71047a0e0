//! Docker Compose project loading
//!
//! This module reads compose files and normalizes them into the
//! [`Project`] shape the group converter works on.

pub mod config;
pub mod parser;
pub mod project;

pub use config::{ComposeFile, ServiceConfig};
pub use parser::ComposeParser;
pub use project::{load_project, Project, ProjectOptions, ResourceLimits, Service, ServicePort};
