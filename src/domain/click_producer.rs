//! Fire-and-forget click event production.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::entities::ClickEvent;
use crate::infrastructure::cache::{CacheError, CacheResult, ClickStream};

/// Budget for a detached enqueue task. Redirect latency is the SLO; a click
/// that cannot be appended within this window is dropped.
const ENQUEUE_TIMEOUT: Duration = Duration::from_millis(100);

/// Appends click events to the stream without ever blocking the caller.
///
/// Durability comes from the stream itself, not from the producer's
/// confirmation: the happy path is one `XADD`, and failures are logged and
/// discarded.
#[derive(Clone)]
pub struct ClickProducer {
    stream: Arc<dyn ClickStream>,
    stream_name: String,
}

impl ClickProducer {
    pub fn new(stream: Arc<dyn ClickStream>, stream_name: impl Into<String>) -> Self {
        Self {
            stream,
            stream_name: stream_name.into(),
        }
    }

    /// Serializes the event and appends it to the stream.
    pub async fn enqueue(&self, event: &ClickEvent) -> CacheResult<()> {
        let payload = serde_json::to_string(event)
            .map_err(|e| CacheError::OperationError(format!("serialize click event: {}", e)))?;
        self.stream.append(&self.stream_name, &payload).await
    }

    /// Enqueues the event from a detached task and returns immediately.
    ///
    /// The task runs on its own timeout, independent of the request context:
    /// a client disconnecting mid-redirect must not drop its click. Errors
    /// and timeouts are logged and swallowed.
    pub fn enqueue_async(&self, event: ClickEvent) {
        let producer = self.clone();
        tokio::spawn(async move {
            let code = event.code.clone();
            match tokio::time::timeout(ENQUEUE_TIMEOUT, producer.enqueue(&event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(code, error = %e, "Failed to enqueue click event"),
                Err(_) => warn!(code, "Click event enqueue timed out"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::MockClickStream;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn sample_event() -> ClickEvent {
        ClickEvent {
            code: "abc12345".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 12, 34, 56).unwrap(),
            ip_hash: "2cf24dba5fb0a30e".to_string(),
            ua_hash: "".to_string(),
            referer: "".to_string(),
            request_id: "".to_string(),
        }
    }

    #[tokio::test]
    async fn test_enqueue_writes_wire_format() {
        let captured = Arc::new(Mutex::new(Vec::<(String, String)>::new()));
        let sink = captured.clone();

        let mut stream = MockClickStream::new();
        stream
            .expect_append()
            .times(1)
            .returning(move |stream, payload| {
                sink.lock()
                    .unwrap()
                    .push((stream.to_string(), payload.to_string()));
                Ok(())
            });

        let producer = ClickProducer::new(Arc::new(stream), "su:clicks");
        producer.enqueue(&sample_event()).await.unwrap();

        let captured = captured.lock().unwrap();
        assert_eq!(captured[0].0, "su:clicks");

        let parsed: ClickEvent = serde_json::from_str(&captured[0].1).unwrap();
        assert_eq!(parsed, sample_event());
    }

    #[tokio::test]
    async fn test_enqueue_async_delivers_without_blocking() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut stream = MockClickStream::new();
        stream.expect_append().times(1).returning(move |_, payload| {
            tx.send(payload.to_string()).unwrap();
            Ok(())
        });

        let producer = ClickProducer::new(Arc::new(stream), "su:clicks");
        producer.enqueue_async(sample_event());

        let payload = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("enqueue task did not run")
            .unwrap();
        let parsed: ClickEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed.code, "abc12345");
    }

    #[tokio::test]
    async fn test_enqueue_async_swallows_errors() {
        let mut stream = MockClickStream::new();
        stream
            .expect_append()
            .times(1)
            .returning(|_, _| Err(CacheError::OperationError("full".to_string())));

        let producer = ClickProducer::new(Arc::new(stream), "su:clicks");
        producer.enqueue_async(sample_event());

        // The spawned task must finish without panicking the runtime.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
