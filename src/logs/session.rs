//! Log streaming sessions

use super::color::ColorCycle;
use super::consumer::LogConsumer;
use super::LogEvent;
use crate::compose::{load_project, ProjectOptions};
use crate::error::Result;
use std::future::Future;
use std::io::Write;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Capacity of the event channel between a fetcher and the consumer
pub const EVENT_BUFFER: usize = 256;

/// Source of log events for a deployment.
///
/// `subscribe` registers interest and returns once delivery is set up.
/// Events may be pushed onto `events` both before and after it returns,
/// until the fetcher is done or the receiver goes away. The session drains
/// the channel while `subscribe` is still running.
pub trait LogFetcher {
    fn subscribe(
        &self,
        deployment: &str,
        events: mpsc::Sender<LogEvent>,
    ) -> impl Future<Output = Result<()>>;
}

/// Which deployment to stream
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// An explicit deployment name
    Deployment(String),
    /// The deployment of a compose project
    Project(ProjectOptions),
}

impl LogTarget {
    /// Target the deployment a project called `name` converts to
    pub fn project_name(name: &str) -> Self {
        LogTarget::Deployment(name.to_lowercase())
    }

    /// Resolve the deployment name, loading the project if needed
    pub fn resolve(&self) -> Result<String> {
        match self {
            LogTarget::Deployment(name) => Ok(name.clone()),
            LogTarget::Project(options) => {
                let project = load_project(options)?;
                Ok(project.name.to_lowercase())
            }
        }
    }
}

/// Stream a deployment's logs into `sink` until `cancel` fires.
///
/// Returns early only if the target cannot be resolved or the
/// subscription fails. Events already queued when cancellation arrives
/// are still written.
pub async fn stream_logs<F, W>(
    fetcher: &F,
    target: &LogTarget,
    sink: W,
    colors: ColorCycle,
    cancel: CancellationToken,
) -> Result<()>
where
    F: LogFetcher,
    W: Write,
{
    let deployment = target.resolve()?;
    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let mut consumer = LogConsumer::new(sink, colors);

    let subscription = fetcher.subscribe(&deployment, tx);
    tokio::pin!(subscription);
    let mut subscribing = true;
    let mut open = true;

    loop {
        tokio::select! {
            biased;
            result = &mut subscription, if subscribing => {
                result?;
                subscribing = false;
                info!("Streaming logs for {}", deployment);
            }
            _ = cancel.cancelled() => break,
            event = rx.recv(), if open => match event {
                Some(event) => consumer.log(&event.service, &event.container, &event.message),
                None => {
                    debug!("Log delivery for {} finished", deployment);
                    open = false;
                }
            },
        }
    }

    while let Ok(event) = rx.try_recv() {
        consumer.log(&event.service, &event.container, &event.message);
    }

    debug!("Log session for {} interrupted", deployment);
    Ok(())
}
