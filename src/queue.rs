//! Background Work Queue
//!
//! A bounded FIFO channel of deferred async work items drained by a fixed
//! pool of workers. Enqueue blocks when the channel is full — backpressure,
//! not drops. A failing item is logged and never fatal to its worker; a
//! panicking item costs its worker a fixed five-second pause before the next
//! dequeue. Shutdown closes the channel, signals the workers, and joins them
//! all.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;

/// A deferred unit of work. Receives a cancellation token tied to queue
/// shutdown.
pub type WorkItem =
    Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Result<(), KeyCheckError>> + Send>;

const FAILURE_PAUSE: Duration = Duration::from_secs(5);

/// Bounded queue plus its worker pool.
pub struct BackgroundTaskQueue {
    sender: mpsc::Sender<WorkItem>,
    shutdown: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl BackgroundTaskQueue {
    /// Start a queue with the given channel capacity and worker count.
    pub fn new(capacity: usize, worker_count: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<WorkItem>(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let shutdown = CancellationToken::new();

        let workers = (0..worker_count.max(1))
            .map(|worker_id| {
                let receiver = receiver.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(worker_loop(worker_id, receiver, shutdown))
            })
            .collect();

        Self {
            sender,
            shutdown,
            workers,
        }
    }

    /// Start a queue sized from the process settings.
    pub fn from_settings(settings: &crate::config::ValidationSettings) -> Self {
        Self::new(settings.queue_capacity, settings.worker_count)
    }

    /// Enqueue a work item, waiting while the channel is at capacity.
    pub async fn enqueue(&self, item: WorkItem) -> Result<(), KeyCheckError> {
        self.sender
            .send(item)
            .await
            .map_err(|_| KeyCheckError::InternalError("background queue is shut down".into()))
    }

    /// Items currently waiting in the channel.
    pub fn depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Stop the workers and wait for them to exit.
    ///
    /// The channel closes first so no new work is accepted; the in-flight
    /// item of each worker runs to completion before the worker observes the
    /// signal and exits.
    pub async fn shutdown(self) {
        let Self {
            sender,
            shutdown,
            workers,
        } = self;

        drop(sender);
        shutdown.cancel();
        for worker in workers {
            let _ = worker.await;
        }
        tracing::debug!("background queue shut down");
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    shutdown: CancellationToken,
) {
    tracing::debug!(worker_id, "background worker starting");

    loop {
        let item = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                item = receiver.recv() => item,
            }
        };
        let Some(item) = item else {
            // Channel closed and drained.
            break;
        };

        // Run the item on its own task so a panic is contained to the item.
        match tokio::spawn(item(shutdown.child_token())).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!(worker_id, error = %error, "background work item failed");
            }
            Err(join_error) => {
                tracing::error!(worker_id, error = %join_error, "background work item aborted");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = sleep(FAILURE_PAUSE) => {}
                }
            }
        }
    }

    tracing::debug!(worker_id, "background worker stopping");
}
