//! Background worker draining the click stream into the store.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::domain::entities::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::infrastructure::cache::{CacheResult, ClickStream};

/// Server-side block for each stream read. Bounds both shutdown latency and
/// how late a timed flush can fire.
const READ_BLOCK: Duration = Duration::from_millis(100);

/// Worker tuning knobs, taken from configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub stream_name: String,
    pub group: String,
    pub consumer: String,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

/// Handle for stopping a running [`ClickWorker`].
pub struct WorkerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signals the worker to stop and waits for its final flush.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Click worker task panicked");
        }
    }
}

/// Single-task consumer: reads the stream via its consumer group, buffers
/// parsed events, and flushes batches to the store.
///
/// The buffer is owned by this task alone (request handlers only ever touch
/// the stream), so no locking is needed anywhere in the pipeline.
///
/// Messages are acknowledged as soon as they are buffered (or dropped as
/// unparseable). A store outage during flush therefore loses that batch
/// rather than redelivering it: bounded, observable loss in exchange for
/// never building a redelivery storm against a struggling database.
pub struct ClickWorker {
    stream: Arc<dyn ClickStream>,
    clicks: Arc<dyn ClickRepository>,
    config: WorkerConfig,
    buffer: Vec<ClickEvent>,
    stop: watch::Receiver<bool>,
}

impl ClickWorker {
    /// Ensures the consumer group exists and spawns the worker loop.
    ///
    /// The group is anchored at stream ID `"0"` so a fresh deployment also
    /// drains any backlog appended before the group existed. Returns once the
    /// loop is running in the background.
    ///
    /// # Errors
    ///
    /// Fails only when the consumer group cannot be created.
    pub async fn start(
        stream: Arc<dyn ClickStream>,
        clicks: Arc<dyn ClickRepository>,
        config: WorkerConfig,
    ) -> CacheResult<WorkerHandle> {
        stream
            .ensure_group(&config.stream_name, &config.group, "0")
            .await?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let worker = Self {
            stream,
            clicks,
            buffer: Vec::with_capacity(config.batch_size),
            config,
            stop: stop_rx,
        };

        let task = tokio::spawn(worker.run());
        Ok(WorkerHandle {
            stop: stop_tx,
            task,
        })
    }

    async fn run(mut self) {
        info!(
            stream = %self.config.stream_name,
            group = %self.config.group,
            batch_size = self.config.batch_size,
            "Click worker started"
        );

        let mut next_flush = Instant::now() + self.config.flush_interval;

        // Reads block for at most READ_BLOCK, so stop and flush deadlines are
        // observed within ~100ms without racing a half-finished read.
        loop {
            if self.stopped() {
                break;
            }

            if Instant::now() >= next_flush {
                self.flush().await;
                next_flush = Instant::now() + self.config.flush_interval;
            }

            self.consume().await;
        }

        // Final drain; runs to completion regardless of shutdown progress.
        self.flush().await;
        info!("Click worker stopped");
    }

    fn stopped(&self) -> bool {
        // A dropped sender also means stop.
        *self.stop.borrow() || self.stop.has_changed().is_err()
    }

    /// Reads one batch of new messages, buffering and acking each.
    ///
    /// Unparseable payloads are logged, acked, and dropped; a poison message
    /// must not wedge the group's pending list.
    async fn consume(&mut self) {
        let want = self.config.batch_size - self.buffer.len();

        let messages = match self
            .stream
            .read(
                &self.config.stream_name,
                &self.config.group,
                &self.config.consumer,
                want,
                READ_BLOCK,
            )
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                error!(error = %e, "Stream read failed");
                tokio::time::sleep(READ_BLOCK).await;
                return;
            }
        };

        for message in messages {
            match serde_json::from_str::<ClickEvent>(&message.data) {
                Ok(event) => self.buffer.push(event),
                Err(e) => {
                    warn!(id = %message.id, error = %e, "Dropping unparseable click event")
                }
            }

            if let Err(e) = self
                .stream
                .ack(&self.config.stream_name, &self.config.group, &message.id)
                .await
            {
                warn!(id = %message.id, error = %e, "Failed to ack stream message");
            }
        }

        if self.buffer.len() >= self.config.batch_size {
            self.flush().await;
        }
    }

    /// Writes the buffered events to the store in one transaction.
    ///
    /// The buffer is reset first (capacity retained); on insert failure the
    /// batch is gone; see the type-level note on the ack-first trade-off.
    async fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let batch: Vec<ClickEvent> = self.buffer.drain(..).collect();

        match self.clicks.insert_batch(&batch).await {
            Ok(()) => {
                metrics::counter!(crate::metrics::CLICK_EVENTS_PROCESSED)
                    .increment(batch.len() as u64);
                debug!(count = batch.len(), "Flushed click events");
            }
            Err(e) => {
                error!(
                    count = batch.len(),
                    error = %e,
                    "Failed to insert click events, batch dropped"
                );
            }
        }
    }
}
