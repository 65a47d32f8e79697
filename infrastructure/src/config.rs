use anyhow::anyhow;
use dotenvy::dotenv;
use shared::types::Result;
use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    OpenAi,
    Ollama,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open-ai" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            other => Err(anyhow!(
                "Unknown generation provider '{}' (expected 'openai' or 'ollama')",
                other
            )),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => f.write_str("openai"),
            Provider::Ollama => f.write_str("ollama"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub retrieval_base_url: String,
    pub retrieval_api_key: String,
    pub retrieval_top_k: Option<u32>,
    pub retrieval_rerank: bool,
    pub provider: Provider,
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub ollama_base_url: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retrieval_base_url: "https://api.ragie.ai".to_string(),
            retrieval_api_key: String::new(),
            retrieval_top_k: None,
            retrieval_rerank: true,
            provider: Provider::OpenAi,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: String::new(),
            ollama_base_url: "http://localhost:11434".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

impl Config {
    /// Read `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str, fallback: String| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };

        let retrieval_top_k = match lookup("RETRIEVAL_TOP_K").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u32>()
                    .map_err(|e| anyhow!("Invalid RETRIEVAL_TOP_K '{}': {}", raw, e))?,
            ),
            None => None,
        };
        let retrieval_rerank = match lookup("RETRIEVAL_RERANK") {
            Some(raw) => parse_flag(&raw)?,
            None => defaults.retrieval_rerank,
        };
        let provider = match lookup("GENERATION_PROVIDER").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.parse()?,
            None => defaults.provider,
        };

        Ok(Self {
            retrieval_base_url: get("RETRIEVAL_BASE_URL", defaults.retrieval_base_url),
            retrieval_api_key: get("RETRIEVAL_API_KEY", defaults.retrieval_api_key),
            retrieval_top_k,
            retrieval_rerank,
            provider,
            openai_base_url: get("OPENAI_BASE_URL", defaults.openai_base_url),
            openai_api_key: get("OPENAI_API_KEY", defaults.openai_api_key),
            ollama_base_url: get("OLLAMA_BASE_URL", defaults.ollama_base_url),
            model: get("ASK_MODEL", defaults.model),
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("Invalid boolean '{}'", other)),
    }
}
