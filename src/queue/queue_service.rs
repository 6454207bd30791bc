//! Delivers the [task messages][TaskMessage] queued by request handlers to the task broker.
//!
//! The worker runs as one background task for the lifetime of the process. A delivery failure
//! is logged and the message dropped; the scan it belongs to is already launched.

use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::{self, JoinHandle};

use crate::configuration::config::Config;
use crate::external_api::task_service::{post_task, TaskMessage, TaskQueueClient};

/// Starts the worker and returns the [TaskQueueClient] feeding it.
///
/// Messages are posted to [tasks_url][crate::configuration::config::Config#structfield.tasks_url],
/// each request bounded by [tasks_timeout_in_secs][crate::configuration::config::Config#structfield.tasks_timeout_in_secs].
pub fn start_task_queue(config: &Config) -> (TaskQueueClient, JoinHandle<()>) {
    let (sender, receiver) = unbounded_channel();
    let url = config.tasks_url.clone();
    let timeout = config.tasks_timeout();
    info!(
        "Starting task queue posting to {} with a timeout of {} seconds.",
        url,
        timeout.as_secs()
    );
    let handle = task::spawn(drain(receiver, url, timeout));
    (TaskQueueClient::new(sender), handle)
}

/// Posts messages until every sender is dropped.
async fn drain(mut receiver: UnboundedReceiver<TaskMessage>, url: String, timeout: Duration) {
    while let Some(message) = receiver.recv().await {
        debug!("Posting {} task for scan {}.", message.task, message.scan_id);
        match post_task(&url, timeout, &message).await {
            Ok(body) => info!(
                "Task {} for scan {} accepted by broker: {}",
                message.task, message.scan_id, body
            ),
            Err(err) => error!(
                "Task {} for scan {} could not be delivered! Error: {}",
                message.task, message.scan_id, err
            ),
        }
    }
    info!("Task queue closed.");
}
