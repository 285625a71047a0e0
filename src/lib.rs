//! Corral - Deploy compose projects as container groups
//!
//! Corral targets container backends that run every container of a
//! deployment inside one network namespace. It provides:
//!
//! - Conversion of compose projects into container group descriptors,
//!   including a sidecar that makes services reachable by name
//! - Single-container views reconstructed from running groups
//! - Merged, per-service colored log output
//! - Deployment contexts stored on disk

pub mod compose;
pub mod container;
pub mod context;
pub mod error;
pub mod group;
pub mod logs;

pub use error::{CorralError, Result};
