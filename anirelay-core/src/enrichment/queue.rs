//! Enrichment Queue
//!
//! Serializes calls to the enrichment provider. One worker drains a FIFO
//! channel, running each task to completion and then holding a fixed gap
//! before the next task starts.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Minimum gap between the end of one task and the start of the next
pub const DEFAULT_MIN_GAP: Duration = Duration::from_millis(400);

type BoxedRun = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Queue tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub min_gap: Duration,
}

impl QueueConfig {
    /// No gap between tasks, for tests
    pub fn immediate() -> Self {
        Self {
            min_gap: Duration::ZERO,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_gap: DEFAULT_MIN_GAP,
        }
    }
}

/// A task waiting for the worker
struct QueuedJob {
    id: Uuid,
    cancel: CancellationToken,
    run: BoxedRun,
}

/// Single-worker FIFO task queue
pub struct EnrichmentQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<QueuedJob>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    config: QueueConfig,
}

impl EnrichmentQueue {
    /// Create the queue and spawn its worker on the current runtime
    pub fn new(config: QueueConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(worker_loop(receiver, config.min_gap));

        info!(min_gap_ms = config.min_gap.as_millis() as u64, "Enrichment queue started");

        Self {
            sender: Mutex::new(Some(sender)),
            worker: tokio::sync::Mutex::new(Some(worker)),
            config,
        }
    }

    pub fn config(&self) -> QueueConfig {
        self.config
    }

    /// Submit a task without waiting for it
    ///
    /// The returned future resolves to the task's output once the worker has
    /// run it. It resolves to `None` when the task was cancelled, or when the
    /// queue shut down before reaching it.
    pub fn enqueue<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        task: F,
    ) -> impl Future<Output = Option<T>> + Send + 'static
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = QueuedJob {
            id: Uuid::new_v4(),
            cancel: cancel.clone(),
            run: Box::new(move || {
                Box::pin(async move {
                    // Receiver may have been dropped by an impatient caller
                    let _ = reply_tx.send(task().await);
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            }),
        };
        let job_id = job.id;

        let sent = match self.sender.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(sender) => sender.send(job).is_ok(),
                None => false,
            },
            Err(_) => false,
        };
        if sent {
            debug!(job_id = %job_id, "Enrichment task queued");
        } else {
            warn!(job_id = %job_id, "Enrichment queue is closed, task dropped");
        }

        async move { reply_rx.await.ok() }
    }

    /// Close the queue and wait for the worker to finish queued tasks
    pub async fn shutdown(&self) {
        info!("Shutting down enrichment queue");

        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "Enrichment queue worker ended abnormally");
            }
        }

        info!("Enrichment queue shutdown complete");
    }
}

async fn worker_loop(mut receiver: mpsc::UnboundedReceiver<QueuedJob>, min_gap: Duration) {
    debug!("Enrichment worker started");

    while let Some(job) = receiver.recv().await {
        if job.cancel.is_cancelled() {
            debug!(job_id = %job.id, "Skipping cancelled enrichment task");
            continue;
        }

        let started = Instant::now();
        tokio::select! {
            _ = job.cancel.cancelled() => {
                debug!(job_id = %job.id, "Enrichment task cancelled while running");
            }
            _ = (job.run)() => {
                debug!(
                    job_id = %job.id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Enrichment task finished"
                );
            }
        }

        if !min_gap.is_zero() {
            tokio::time::sleep(min_gap).await;
        }
    }

    debug!("Enrichment worker stopped");
}
