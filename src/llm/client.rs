// Synchronous chat-completion boundary
//
// The control loop blocks on each request; the simulation clock is paused
// meanwhile, so no timeout is applied.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::messages::ChatMessage;

/// Errors raised by the chat boundary
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// A chat-style completion capability returning free-form text
pub trait ChatCompletion {
    fn chat(&mut self, model: &str, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Client for an Ollama server's `/api/chat` endpoint
pub struct OllamaClient {
    host: String,
    http: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>) -> Result<Self, LlmError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Option::<Duration>::None)
            .build()?;
        let host = host.into().trim_end_matches('/').to_string();
        info!("Using chat endpoint {}/api/chat", host);
        Ok(Self { host, http })
    }
}

impl ChatCompletion for OllamaClient {
    fn chat(&mut self, model: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };
        debug!("Chat request to {} with {} turns", model, messages.len());

        let response = self
            .http
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let reply: ChatResponse = response.json()?;
        debug!("Chat reply: {:?}", reply.message.content);
        Ok(reply.message.content)
    }
}

/// Canned replies for deterministic tests
#[cfg(test)]
pub(crate) struct ScriptedChat {
    replies: std::collections::VecDeque<String>,
    pub requests: Vec<Vec<ChatMessage>>,
}

#[cfg(test)]
impl ScriptedChat {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            requests: Vec::new(),
        }
    }
}

#[cfg(test)]
impl ChatCompletion for ScriptedChat {
    fn chat(&mut self, _model: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.requests.push(messages.to_vec());
        Ok(self.replies.pop_front().unwrap_or_default())
    }
}
