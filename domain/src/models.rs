use serde::{Deserialize, Serialize};

/// A scored fragment of source text returned by the retrieval service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f64,
}

/// Body of a successful retrieval call. Extra fields sent by the service
/// (document ids, metadata) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub scored_chunks: Vec<RetrievedChunk>,
}

impl RetrievalResponse {
    pub fn new(scored_chunks: Vec<RetrievedChunk>) -> Self {
        Self { scored_chunks }
    }

    /// Chunk texts in retrieval order; scores are dropped.
    pub fn texts(&self) -> Vec<String> {
        self.scored_chunks.iter().map(|c| c.text.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub context: Vec<String>,
    pub query: String,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(context: Vec<String>, query: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            context,
            query: query.into(),
            model: model.into(),
        }
    }

    pub fn from_retrieval(
        retrieval: &RetrievalResponse,
        query: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::new(retrieval.texts(), query, model)
    }
}
