//! Log fan-in
//!
//! Merges log streams from every container of a deployment into one
//! readable output, keeping each line attributed to its service.

pub mod color;
pub mod consumer;
pub mod replay;
pub mod session;

use serde::{Deserialize, Serialize};

pub use color::{ColorCycle, ColorFn};
pub use consumer::LogConsumer;
pub use replay::JsonLinesFetcher;
pub use session::{stream_logs, LogFetcher, LogTarget};

/// One chunk of log output from a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub service: String,
    pub container: String,
    pub message: String,
}

impl LogEvent {
    pub fn new(service: &str, container: &str, message: &str) -> Self {
        Self {
            service: service.to_string(),
            container: container.to_string(),
            message: message.to_string(),
        }
    }
}
