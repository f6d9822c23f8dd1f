//! OpenAI-compatible chat completions text generator.
//!
//! Reads `OPENAI_API_KEY` (via async-openai's default config), `OPENAI_BASE_URL` and
//! `OPENAI_MODEL` from the environment.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, trace};

use crate::prompts::Prompt;

use super::{CollabError, TextGenerator};

/// Default model when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Text generator backed by the OpenAI Chat Completions API.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiGenerator {
    /// Build with default config (API key from `OPENAI_API_KEY`).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Build with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Build from `OPENAI_BASE_URL` and `OPENAI_MODEL`.
    pub fn from_env() -> Self {
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let mut config = OpenAIConfig::new();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config = config.with_api_key(key);
        }
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            config = config.with_api_base(base);
        }
        Self::with_config(config, model)
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, CollabError> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(prompt.system.as_str()),
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage::from(prompt.user.as_str()),
        ));

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(messages);
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        let request = args
            .build()
            .map_err(|e| CollabError::Generate(format!("OpenAI request build failed: {}", e)))?;

        debug!(model = %self.model, prompt_chars = prompt.user.len(), "OpenAI chat create");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CollabError::Generate(format!("OpenAI API error: {}", e)))?;
        trace!(response = ?response, "OpenAI response");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CollabError::Generate("OpenAI returned no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(CollabError::Generate("OpenAI returned empty content".to_string()));
        }
        Ok(content.to_string())
    }
}
