//! Log ingestion layer: the event types flowing from the remote endpoint and a generic
//! interface for producing them.
//!
//! A `LogSource` pushes `LogEvent`s into a channel; the consumer holds the receiving end
//! through `EventStream`. The HTTP source decodes a server-sent-events body, but any
//! implementor (tests use in-memory ones) can feed the same pipeline.

use anyhow::Result;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Buffered events between the transport task and the consumer.
const CHANNEL_CAPACITY: usize = 1024;

/// One unit received from the stream. Only `kind == "data"` is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub kind: String,
    pub data: String,
}

impl LogEvent {
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            kind: "data".into(),
            data: data.into(),
        }
    }
}

/// JSON-decoded payload of a data event.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLogRecord {
    pub name: Option<String>,
    pub msg: String,
    /// The complete decoded object, used by verbose output.
    pub record: Value,
}

/// Generic trait for log sources.
///
/// Implementors should continuously send events to the provided channel and return
/// once the upstream ends or the receiver is gone.
#[async_trait::async_trait]
pub trait LogSource: Send {
    async fn stream(self, tx: Sender<LogEvent>) -> Result<()>;
}

/// Receiving half of a live event stream, in arrival order.
pub struct EventStream {
    rx: Receiver<LogEvent>,
    producer: Option<JoinHandle<()>>,
}

impl EventStream {
    /// Run `source` on its own task and expose its events.
    pub fn spawn<S>(source: S) -> Self
    where
        S: LogSource + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let producer = tokio::spawn(async move {
            match source.stream(tx).await {
                Ok(()) => debug!("log source finished"),
                Err(e) => warn!(error = %e, "log source failed, ending stream"),
            }
        });
        Self {
            rx,
            producer: Some(producer),
        }
    }

    /// Wrap a receiver fed by someone else.
    #[cfg(test)]
    pub fn from_receiver(rx: Receiver<LogEvent>) -> Self {
        Self { rx, producer: None }
    }

    /// Next event, or `None` once the source has finished.
    pub async fn recv(&mut self) -> Option<LogEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

/// Incremental decoder for a `text/event-stream` body.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence, so only complete
/// lines are interpreted.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
    kind: Option<String>,
}

impl SseDecoder {
    /// Feed a chunk and return every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LogEvent> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let bytes: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&bytes[..pos]);
            let line = text.strip_suffix('\r').unwrap_or(&text);
            if let Some(event) = self.line(line) {
                events.push(event);
            }
        }
        events
    }

    fn line(&mut self, line: &str) -> Option<LogEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // keep-alive
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.kind = Some(value.to_string()),
            other => trace!(field = other, "ignoring event-stream field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<LogEvent> {
        let kind = self.kind.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(match kind {
            Some(kind) => LogEvent { kind, data },
            None => LogEvent::data(data),
        })
    }
}

/// Streams events out of an established HTTP response.
pub struct HttpSource {
    pub response: reqwest::Response,
}

#[async_trait::async_trait]
impl LogSource for HttpSource {
    async fn stream(self, tx: Sender<LogEvent>) -> Result<()> {
        let mut body = self.response.bytes_stream();
        let mut decoder = SseDecoder::default();
        while let Some(chunk) = body.next().await {
            for event in decoder.feed(&chunk?) {
                if tx.send(event).await.is_err() {
                    return Ok(()); // receiver gone
                }
            }
        }
        Ok(())
    }
}
