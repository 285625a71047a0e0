//! Replay of captured log events

use super::session::LogFetcher;
use super::LogEvent;
use crate::error::{CorralError, Result};
use std::sync::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Fetcher that replays JSON-lines encoded [`LogEvent`]s from a reader,
/// such as stdin or a capture file. It can be subscribed once.
pub struct JsonLinesFetcher<R> {
    reader: Mutex<Option<R>>,
}

impl<R> JsonLinesFetcher<R> {
    /// Replay events read from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
        }
    }
}

impl<R> LogFetcher for JsonLinesFetcher<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn subscribe(&self, deployment: &str, events: mpsc::Sender<LogEvent>) -> Result<()> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| CorralError::LogSubscription("replay reader lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| {
                CorralError::LogSubscription("replay source already consumed".to_string())
            })?;

        let deployment = deployment.to_string();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<LogEvent>(&line) {
                            Ok(event) => {
                                if events.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Skipping malformed log event: {}", e),
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read log events for {}: {}", deployment, e);
                        break;
                    }
                }
            }
            debug!("Replay for {} finished", deployment);
        });

        Ok(())
    }
}
