//! Long-lived push subscriptions over server-sent events.
//!
//! A [`StreamSession`] owns one subscription for its whole lifetime: a
//! background task holds the connection, parses SSE frames incrementally,
//! decodes each `data:` payload independently, and delivers events to the
//! caller's [`EventSink`] strictly in receipt order. The literal `"hello"`
//! handshake payload the service sends on connect carries no data and is
//! discarded. A payload that fails to decode is reported to the sink as an
//! error without ending the session.
//!
//! Connection lifecycle is fully visible to the sink and the session holds
//! no retry policy of its own. A refused subscription (non-2xx) or a failed
//! connect is terminal: the cause reaches [`EventSink::on_error`] and the
//! session ends. When an established connection drops, the cause (if any)
//! reaches `on_error` and [`EventSink::on_disconnected`] decides whether to
//! reconnect; the default says yes, so a sink that wants backoff returns
//! `false` and reopens the subscription on its own schedule.

use crate::Error;
use futures::StreamExt;
use http::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

/// Handshake payload sent by the service when a subscription opens.
const HANDSHAKE: &str = "\"hello\"";

/// Receives the events of one push subscription.
///
/// Callbacks run on the session's task, one at a time, in receipt order.
pub trait EventSink<T>: Send + 'static {
    /// A decoded event arrived.
    fn on_event(&mut self, event: T);

    /// Something went wrong: an event body failed to decode, the connect
    /// was refused or failed, or the transport dropped mid-stream. Decode
    /// failures never end the session; connection errors are followed by
    /// [`on_disconnected`](Self::on_disconnected) or session end.
    fn on_error(&mut self, error: Error) {
        tracing::warn!(error = %error, "stream error");
    }

    /// The subscription (re)connected.
    fn on_connected(&mut self) {}

    /// An established connection ended. Return `true` to reconnect
    /// immediately, `false` to end the session. Defaults to `true`.
    fn on_disconnected(&mut self) -> bool {
        true
    }
}

/// Blanket sink for plain event closures.
impl<T, F> EventSink<T> for F
where
    F: FnMut(T) + Send + 'static,
{
    fn on_event(&mut self, event: T) {
        self(event)
    }
}

/// A handle to a live push subscription.
///
/// Owns the connection task. [`close`](Self::close) (or drop) releases the
/// connection exactly once; sends to the sink cease immediately, though the
/// transport-level disconnect completes asynchronously.
#[derive(Debug)]
pub struct StreamSession {
    task: Option<tokio::task::JoinHandle<()>>,
}

impl StreamSession {
    /// Stops the subscription. Safe to call more than once; only the first
    /// call releases the connection.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("stream session closed");
        }
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// How one connection attempt ended.
enum Outcome {
    /// The subscription was never established; the cause went to the sink.
    Refused,
    /// An established connection ended (cleanly or not).
    Dropped,
}

pub(crate) fn spawn_stream<T, S>(http: reqwest::Client, url: Url, mut sink: S) -> StreamSession
where
    T: DeserializeOwned + Send + 'static,
    S: EventSink<T>,
{
    let task = tokio::spawn(async move {
        loop {
            match subscribe_once::<T, S>(&http, &url, &mut sink).await {
                // A refusal is terminal; reconnecting would only hammer an
                // endpoint that already said no. The sink has the cause.
                Outcome::Refused => break,
                Outcome::Dropped => {
                    if !sink.on_disconnected() {
                        break;
                    }
                }
            }
        }
    });
    StreamSession { task: Some(task) }
}

/// One connection attempt: connect, then decode and deliver frames until
/// the server ends the stream or the transport fails.
async fn subscribe_once<T, S>(http: &reqwest::Client, url: &Url, sink: &mut S) -> Outcome
where
    T: DeserializeOwned,
    S: EventSink<T>,
{
    let response = match http
        .get(url.clone())
        .header(http::header::ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            let status = response.status();
            tracing::warn!(status = status.as_u16(), "push endpoint refused subscription");
            let error = if status == StatusCode::TOO_MANY_REQUESTS {
                Error::RateLimited {
                    retry_after: crate::decode::parse_retry_after(response.headers()),
                }
            } else {
                Error::Remote {
                    status,
                    body: response.text().await.unwrap_or_default(),
                }
            };
            sink.on_error(error);
            return Outcome::Refused;
        }
        Err(e) => {
            tracing::warn!(error = %e, "push connection failed");
            sink.on_error(Error::Connection(e));
            return Outcome::Refused;
        }
    };

    tracing::debug!(url = %url, "push subscription open");
    sink.on_connected();

    let mut parser = FrameParser::default();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(error = %e, "push stream interrupted");
                sink.on_error(Error::Connection(e));
                return Outcome::Dropped;
            }
        };
        for payload in parser.push(&chunk) {
            if payload == HANDSHAKE {
                continue;
            }
            match serde_json::from_str::<T>(&payload) {
                Ok(event) => sink.on_event(event),
                Err(e) => sink.on_error(Error::Decode {
                    status: StatusCode::OK,
                    message: e.to_string(),
                    raw_body: payload,
                }),
            }
        }
    }
    Outcome::Dropped
}

/// Incremental SSE frame parser.
///
/// Accumulates `data:` lines until a blank line dispatches the frame.
/// Comments and non-data fields (`event:`, `id:`, `retry:`) are ignored.
/// Chunks may split lines anywhere; state carries across calls.
#[derive(Debug, Default)]
pub(crate) struct FrameParser {
    buffer: String,
    data: Vec<String>,
}

impl FrameParser {
    /// Feeds one transport chunk, returning any frames it completed.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut completed = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    completed.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.strip_prefix(' ').unwrap_or(value).to_owned());
            }
            // Comment lines (leading ':') and other fields carry no data.
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"data: {\"id\":\"1\"}\n\n");
        assert_eq!(frames, vec![r#"{"id":"1"}"#]);
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut parser = FrameParser::default();
        assert!(parser.push(b"data: {\"id\"").is_empty());
        assert!(parser.push(b":\"1\"}\n").is_empty());
        let frames = parser.push(b"\n");
        assert_eq!(frames, vec![r#"{"id":"1"}"#]);
    }

    #[test]
    fn multiple_frames_in_order() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"data: 1\n\ndata: 2\n\ndata: 3\n\n");
        assert_eq!(frames, vec!["1", "2", "3"]);
    }

    #[test]
    fn multiline_data_joined_with_newline() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"data: a\ndata: b\n\n");
        assert_eq!(frames, vec!["a\nb"]);
    }

    #[test]
    fn comments_and_other_fields_ignored() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b": keepalive\nevent: message\nid: 7\ndata: x\n\n");
        assert_eq!(frames, vec!["x"]);
    }

    #[test]
    fn crlf_line_endings() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"data: x\r\n\r\n");
        assert_eq!(frames, vec!["x"]);
    }

    #[test]
    fn blank_lines_without_data_emit_nothing() {
        let mut parser = FrameParser::default();
        assert!(parser.push(b"\n\n\n").is_empty());
    }

    #[test]
    fn handshake_payload_matches_service_greeting() {
        // The greeting arrives as the JSON string literal "hello".
        let mut parser = FrameParser::default();
        let frames = parser.push(b"data: \"hello\"\n\n");
        assert_eq!(frames, vec![HANDSHAKE]);
    }
}
