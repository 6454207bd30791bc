//! Fire-and-forget notifications to the task broker.
//!
//! Submitting only enqueues the message; the [queue worker][crate::queue::queue_service]
//! delivers it with [post_task].

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::debug;
#[cfg(test)]
use mockall::automock;
use reqwest::ClientBuilder;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Name of the task that tells the broker a scan was launched
pub const SCAN_LAUNCH_TASK: &str = "scan_launch";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskMessage {
    pub task: String,
    pub scan_id: String,
    /// Enqueue time, "%Y-%m-%d %H:%M:%S" UTC
    pub timestamp: String,
}

impl TaskMessage {
    pub fn scan_launch(scan_id: &str) -> Self {
        TaskMessage {
            task: SCAN_LAUNCH_TASK.to_owned(),
            scan_id: scan_id.to_owned(),
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[cfg_attr(test, automock)]
pub trait TaskSubmitter: Send + Sync {
    /// Queues the launch notification of a scan. Never waits for the broker.
    fn scan_launch(&self, scan_id: &str) -> Result<()>;
}

/// [TaskSubmitter] feeding the in-process task queue
#[derive(Clone)]
pub struct TaskQueueClient {
    sender: UnboundedSender<TaskMessage>,
}

impl TaskQueueClient {
    pub fn new(sender: UnboundedSender<TaskMessage>) -> Self {
        TaskQueueClient { sender }
    }
}

impl TaskSubmitter for TaskQueueClient {
    fn scan_launch(&self, scan_id: &str) -> Result<()> {
        self.sender
            .send(TaskMessage::scan_launch(scan_id))
            .map_err(|_| anyhow!("task queue is closed"))?;
        debug!("Queued {} task for scan {}.", SCAN_LAUNCH_TASK, scan_id);
        Ok(())
    }
}

/// Sends one [TaskMessage] as JSON with a post request to `url` and returns the response body.
/// * `url` - Endpoint of the task broker
/// * `timeout` - Upper bound of the whole request
pub async fn post_task(url: &str, timeout: Duration, message: &TaskMessage) -> Result<String> {
    let client = ClientBuilder::new().timeout(timeout).build()?;
    let response = client
        .post(url)
        .json(message)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.text().await?)
}
