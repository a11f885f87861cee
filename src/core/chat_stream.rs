use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;

use crate::api::{FunctionCall, StreamChunk, TurnRequest};
use crate::core::constants::STREAM_ENDPOINT;
use crate::utils::url::construct_api_url;

/// Why a stream failed, carried alongside the human-readable detail so the
/// engine can pick the right notice category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamFailure {
    /// The public credential was rejected by the backend.
    Auth(String),
    /// Anything else: transport failure, bad status, malformed payload.
    Backend(String),
}

#[derive(Clone, Debug)]
pub enum StreamMessage {
    Delta(String),
    FunctionCall(FunctionCall),
    Error(StreamFailure),
    End,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn handle_data_payload(
    payload: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    if payload == "[DONE]" {
        let _ = tx.send((StreamMessage::End, stream_id));
        return true;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => {
            if let Some(text) = chunk.text {
                if !text.is_empty() {
                    let _ = tx.send((StreamMessage::Delta(text), stream_id));
                }
            }
            if let Some(calls) = chunk.function_calls {
                for call in calls {
                    let _ = tx.send((StreamMessage::FunctionCall(call), stream_id));
                }
            }
            false
        }
        Err(_) => {
            if payload.trim().is_empty() {
                return false;
            }

            let failure = StreamFailure::Backend(format_api_error(payload));
            let _ = tx.send((StreamMessage::Error(failure), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            true
        }
    }
}

fn process_sse_line(
    line: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, tx, stream_id))
        .unwrap_or(false)
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Condense a backend error body into one line: a summary field when the
/// body is structured, the trimmed text otherwise.
fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "backend returned an empty error".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return summary;
            }
        }
        return json_value.to_string();
    }

    trimmed.to_string()
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub public_key: String,
    pub request: TurnRequest,
    pub cancel_token: tokio_util::sync::CancellationToken,
    pub stream_id: u64,
}

/// Spawns one producer task per turn and multiplexes every turn's chunks
/// onto a single ordered channel, tagged with the stream id so consumers
/// can drop events from superseded turns.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx_clone = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                base_url,
                public_key,
                request,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                _ = async {
                    let stream_url = construct_api_url(&base_url, STREAM_ENDPOINT);
                    let http_request = client
                        .post(stream_url)
                        .header("Content-Type", "application/json")
                        .header("X-Widget-Key", &public_key);

                    match http_request.json(&request).send().await {
                        Ok(response) => {
                            let status = response.status();
                            if !status.is_success() {
                                let error_text = response
                                    .text()
                                    .await
                                    .unwrap_or_else(|_| "<no body>".to_string());
                                let detail = format_api_error(&error_text);
                                let failure = if status == reqwest::StatusCode::UNAUTHORIZED
                                    || status == reqwest::StatusCode::FORBIDDEN
                                {
                                    StreamFailure::Auth(detail)
                                } else {
                                    StreamFailure::Backend(detail)
                                };
                                let _ = tx_clone.send((StreamMessage::Error(failure), stream_id));
                                let _ = tx_clone.send((StreamMessage::End, stream_id));
                                return;
                            }

                            let mut stream = response.bytes_stream();
                            let mut buffer: Vec<u8> = Vec::new();

                            while let Some(chunk) = stream.next().await {
                                if cancel_token.is_cancelled() {
                                    return;
                                }

                                match chunk {
                                    Ok(chunk_bytes) => {
                                        buffer.extend_from_slice(&chunk_bytes);

                                        while let Some(newline_pos) = memchr(b'\n', &buffer) {
                                            let line_str = match std::str::from_utf8(&buffer[..newline_pos]) {
                                                Ok(s) => s.trim().to_string(),
                                                Err(_) => {
                                                    buffer.drain(..=newline_pos);
                                                    continue;
                                                }
                                            };

                                            let should_end = process_sse_line(
                                                &line_str,
                                                &tx_clone,
                                                stream_id,
                                            );
                                            buffer.drain(..=newline_pos);
                                            if should_end {
                                                return;
                                            }
                                        }
                                    }
                                    Err(err) => {
                                        let failure = StreamFailure::Backend(err.to_string());
                                        let _ = tx_clone.send((StreamMessage::Error(failure), stream_id));
                                        let _ = tx_clone.send((StreamMessage::End, stream_id));
                                        return;
                                    }
                                }
                            }

                            let _ = tx_clone.send((StreamMessage::End, stream_id));
                        }
                        Err(e) => {
                            let failure = StreamFailure::Backend(e.to_string());
                            let _ = tx_clone.send((StreamMessage::Error(failure), stream_id));
                            let _ = tx_clone.send((StreamMessage::End, stream_id));
                        }
                    }
                } => {}
                _ = cancel_token.cancelled() => {}
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}
