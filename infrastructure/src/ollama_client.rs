use crate::config::Config;
use crate::stream_decoder::{parse_ndjson_line, snapshot_stream};
use anyhow::{anyhow, Context};
use domain::models::GenerationRequest;
use domain::ports::{AnswerStream, Generator};
use domain::prompt::{build_messages, ChatMessage};
use reqwest::Client;
use serde::Serialize;
use shared::types::Result;
use std::sync::Arc;
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ollama_base_url.clone())
    }
}

impl Generator for OllamaClient {
    async fn generate(&self, request: GenerationRequest) -> Result<AnswerStream> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let messages = build_messages(&request);
        let body = ChatRequest {
            model: &request.model,
            messages: &messages,
            stream: true,
        };
        debug!(%url, model = %request.model, chunks = request.context.len(), "requesting generation");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed contacting Ollama at {}", url))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama API error ({}): {}", status, text));
        }
        Ok(snapshot_stream(response.bytes_stream(), parse_ndjson_line))
    }
}
