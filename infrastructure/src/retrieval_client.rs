use crate::config::Config;
use anyhow::{anyhow, Context};
use domain::models::RetrievalResponse;
use domain::ports::Retriever;
use reqwest::Client;
use serde::Serialize;
use shared::types::Result;
use std::sync::Arc;
use tracing::debug;

#[derive(Serialize)]
struct RetrievalRequest<'a> {
    query: &'a str,
    rerank: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

/// Client for a Ragie-style `POST /retrievals` endpoint.
#[derive(Clone)]
pub struct RetrievalClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    top_k: Option<u32>,
    rerank: bool,
}

impl RetrievalClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into(),
            api_key: api_key.into(),
            top_k: None,
            rerank: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.retrieval_base_url.clone(),
            config.retrieval_api_key.clone(),
        )
        .with_top_k(config.retrieval_top_k)
        .with_rerank(config.retrieval_rerank)
    }

    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }
}

impl Retriever for RetrievalClient {
    async fn retrieve(&self, query: &str) -> Result<RetrievalResponse> {
        let url = format!("{}/retrievals", self.base_url.trim_end_matches('/'));
        let body = RetrievalRequest {
            query,
            rerank: self.rerank,
            top_k: self.top_k,
        };
        debug!(%url, "requesting retrieval");

        let mut builder = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed contacting retrieval service at {}", url))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Retrieval API error ({}): {}", status, text));
        }
        response
            .json::<RetrievalResponse>()
            .await
            .context("Malformed retrieval response")
    }
}
