use crate::config::{Config, Provider};
use crate::ollama_client::OllamaClient;
use crate::openai_client::OpenAiClient;
use domain::models::GenerationRequest;
use domain::ports::{AnswerStream, Generator};
use shared::types::Result;

/// The generation client selected by configuration.
#[derive(Clone)]
pub enum GenerationBackend {
    OpenAi(OpenAiClient),
    Ollama(OllamaClient),
}

impl GenerationBackend {
    pub fn from_config(config: &Config) -> Self {
        match config.provider {
            Provider::OpenAi => GenerationBackend::OpenAi(OpenAiClient::from_config(config)),
            Provider::Ollama => GenerationBackend::Ollama(OllamaClient::from_config(config)),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            GenerationBackend::OpenAi(_) => Provider::OpenAi,
            GenerationBackend::Ollama(_) => Provider::Ollama,
        }
    }
}

impl Generator for GenerationBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<AnswerStream> {
        match self {
            GenerationBackend::OpenAi(client) => client.generate(request).await,
            GenerationBackend::Ollama(client) => client.generate(request).await,
        }
    }
}
