use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::state::ChatMessage;

/// The two operations the event loop needs from a chat provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Reachability and auth check against the provider.
    async fn probe(&self) -> Result<()>;

    /// One blocking round trip over the full conversation history.
    async fn complete(&self, history: &[ChatMessage]) -> Result<ChatMessage>;
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatBackend for OpenAIClient {
    async fn probe(&self) -> Result<()> {
        let response = self.client
            .get(self.url("models"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ChatError::Connectivity(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChatError::Connectivity(format!(
                "{} returned {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    async fn complete(&self, history: &[ChatMessage]) -> Result<ChatMessage> {
        let request = OpenAIRequest {
            model: &self.model,
            messages: history,
        };
        debug!(messages = history.len(), model = %self.model, "sending chat completion");

        let response = self.client
            .post(self.url("chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Completion(format!("OpenAI API error {}: {}", status, text)));
        }

        let openai_response: OpenAIResponse = response.json().await?;
        openai_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ChatError::Completion("response contained no choices".to_string()))
    }
}
