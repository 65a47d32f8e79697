use crate::config::Config;
use crate::stream_decoder::{parse_sse_line, snapshot_stream};
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
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Client for any OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.openai_base_url.clone(), config.openai_api_key.clone())
    }
}

impl Generator for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<AnswerStream> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let messages = build_messages(&request);
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &messages,
            stream: true,
        };
        debug!(%url, model = %request.model, chunks = request.context.len(), "requesting generation");

        let mut builder = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed contacting {}", url))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }
        Ok(snapshot_stream(response.bytes_stream(), parse_sse_line))
    }
}
