pub mod config;
pub mod generation;
pub mod ollama_client;
pub mod openai_client;
pub mod retrieval_client;
pub mod stream_decoder;
