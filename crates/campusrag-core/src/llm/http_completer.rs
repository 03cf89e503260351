//! HTTP-based text completion using external LLM service

use super::{ChatMessage, CompletionParams, LLMClient, TextCompleter};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Text completer sending each prompt as a single user message
pub struct HttpCompleter {
    client: Arc<dyn LLMClient>,
}

impl HttpCompleter {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let client = super::VLLMClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let client = super::VLLMClient::from_env()?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[async_trait]
impl TextCompleter for HttpCompleter {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt)];
        let response = self.client.chat_completion(messages, params).await?;
        Ok(response.trim().to_string())
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
