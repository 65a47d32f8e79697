use crate::models::GenerationRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

const INSTRUCTIONS: &str = "You are a helpful assistant answering questions about a set of documents. \
Answer using only the information in the context below. \
If the context does not contain the answer, say that you don't know.";

/// System prompt listing every context chunk as a numbered block, followed
/// by the user's question.
pub fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
    let context = if request.context.is_empty() {
        "(no matching documents)".to_string()
    } else {
        request
            .context
            .iter()
            .enumerate()
            .map(|(i, text)| format!("[{}]\n{}", i + 1, text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    vec![
        ChatMessage::system(format!("{}\n\nContext:\n{}", INSTRUCTIONS, context)),
        ChatMessage::user(request.query.clone()),
    ]
}
