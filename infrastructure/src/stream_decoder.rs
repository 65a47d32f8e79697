//! Turns a streamed HTTP body of deltas into answer snapshots.
//!
//! Both generation backends send incremental text: OpenAI-compatible servers
//! as server-sent events, Ollama as newline-delimited JSON. The decoder
//! frames the body into lines, parses each line into a [`Frame`], and keeps
//! the running answer so every emitted item is the whole answer so far.

use anyhow::anyhow;
use domain::ports::AnswerStream;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use shared::types::Result;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 32;

/// One parsed line of a generation body.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub delta: Option<String>,
    pub done: bool,
}

impl Frame {
    fn skip() -> Self {
        Self::default()
    }

    fn delta(text: &str) -> Self {
        Self {
            delta: Some(text.to_string()),
            done: false,
        }
    }

    fn done() -> Self {
        Self {
            delta: None,
            done: true,
        }
    }
}

/// Splits bytes into `\n`-terminated lines, holding partial lines (and
/// partial UTF-8 sequences) until the rest arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        let mut start = 0;
        for pos in self.scanned..self.pending.len() {
            if self.pending[pos] == b'\n' {
                let text = String::from_utf8_lossy(&self.pending[start..pos]);
                lines.push(text.trim_end_matches('\r').to_string());
                start = pos + 1;
            }
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Whatever is left once the body ends without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest).trim_end().to_string();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Default)]
pub struct SnapshotAccumulator {
    answer: String,
}

impl SnapshotAccumulator {
    /// Append a delta; returns the new snapshot, or `None` for an empty delta.
    pub fn push(&mut self, delta: &str) -> Option<String> {
        if delta.is_empty() {
            return None;
        }
        self.answer.push_str(delta);
        Some(self.answer.clone())
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Parse one server-sent-events line from an OpenAI-compatible
/// `chat/completions` stream.
pub fn parse_sse_line(line: &str) -> Result<Frame> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(Frame::skip());
    }
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(Frame::skip());
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(Frame::done());
    }

    let json: Value = match serde_json::from_str(data) {
        Ok(json) => json,
        Err(e) => {
            debug!("skipping unparsable event data: {}", e);
            return Ok(Frame::skip());
        }
    };
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(anyhow!("Generation stream error: {}", message));
    }

    let choice = &json["choices"][0];
    let mut frame = match choice["delta"]["content"].as_str() {
        Some(content) => Frame::delta(content),
        None => Frame::skip(),
    };
    // Some servers end with a finish_reason and never send [DONE].
    if choice["finish_reason"].is_string() {
        frame.done = true;
    }
    Ok(frame)
}

#[derive(Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Parse one line of an Ollama `/api/chat` NDJSON stream.
pub fn parse_ndjson_line(line: &str) -> Result<Frame> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Frame::skip());
    }
    let chunk: OllamaChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!("skipping unparsable chat line: {}", e);
            return Ok(Frame::skip());
        }
    };
    if let Some(error) = chunk.error {
        return Err(anyhow!("Ollama API error: {}", error));
    }
    Ok(Frame {
        delta: chunk.message.map(|m| m.content).filter(|c| !c.is_empty()),
        done: chunk.done,
    })
}

enum Flow {
    Continue,
    Stop,
}

/// Decode `body` on a background task and expose the snapshots as a stream.
/// Dropping the returned stream stops the task at its next send.
pub fn snapshot_stream<S, B, E, P>(body: S, parse: P) -> AnswerStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    P: Fn(&str) -> Result<Frame> + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<String>>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut body = Box::pin(body);
        let mut lines = LineBuffer::default();
        let mut answer = SnapshotAccumulator::default();

        while let Some(item) = body.next().await {
            let bytes = match item {
                Ok(bytes) => bytes,
                Err(e) => {
                    let err = anyhow::Error::new(e).context("Generation stream interrupted");
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            };
            for line in lines.push(bytes.as_ref()) {
                if let Flow::Stop = forward(&parse, &line, &mut answer, &tx).await {
                    return;
                }
            }
        }
        if let Some(line) = lines.finish() {
            forward(&parse, &line, &mut answer, &tx).await;
        }
    });

    ReceiverStream::new(rx).boxed()
}

async fn forward<P>(
    parse: &P,
    line: &str,
    answer: &mut SnapshotAccumulator,
    tx: &mpsc::Sender<Result<String>>,
) -> Flow
where
    P: Fn(&str) -> Result<Frame>,
{
    match parse(line) {
        Ok(frame) => {
            if let Some(snapshot) = frame.delta.as_deref().and_then(|d| answer.push(d)) {
                if tx.send(Ok(snapshot)).await.is_err() {
                    return Flow::Stop;
                }
            }
            if frame.done {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }
        Err(e) => {
            let _ = tx.send(Err(e)).await;
            Flow::Stop
        }
    }
}
