use std::time::Duration;

use anyhow::{Result, anyhow};
use async_openai::{
    Client,
    config::{Config, OpenAIConfig},
    types::chat::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use tracing::{debug, warn};

use crate::{
    configs::LlmConfig,
    prompts::{SYSTEM_PROMPT, build_prompt},
};

/// Low randomness keeps translations literal and repeatable.
pub const TEMPERATURE: f32 = 0.2;

/// Outcome of translating one description. Exactly one per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResult {
    Translated(String),
    Failed { placeholder: String, reason: String },
}

impl TranslationResult {
    /// The text that goes into the output sheet.
    pub fn text(&self) -> &str {
        match self {
            TranslationResult::Translated(text) => text,
            TranslationResult::Failed { placeholder, .. } => placeholder,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TranslationResult::Failed { .. })
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Never returns an error: failures collapse into `TranslationResult::Failed`.
    async fn translate(&self, description: &str) -> TranslationResult;
}

pub struct DryRunTranslator;

#[async_trait]
impl Translator for DryRunTranslator {
    async fn translate(&self, description: &str) -> TranslationResult {
        TranslationResult::Translated(format!("[DRY:tr] {}", description))
    }
}

pub struct LlmTranslator<T: Config> {
    pub client: Client<T>,
    pub model: String,
    pub timeout: Duration,
    pub placeholder: String,
}

impl LlmTranslator<OpenAIConfig> {
    pub fn new(llm: &LlmConfig, api_key: &str, placeholder: &str) -> Self {
        // A failed row falls back to the placeholder; the client must not retry it.
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_base(&llm.api_base)
                .with_api_key(api_key.trim()),
        )
        .with_backoff(no_retry);

        Self {
            client,
            model: llm.model.clone(),
            timeout: Duration::from_secs(llm.timeout_secs),
            placeholder: placeholder.to_string(),
        }
    }
}

impl<M> LlmTranslator<M>
where
    M: Config,
{
    async fn complete(&self, description: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessage::from(SYSTEM_PROMPT).into(),
                ChatCompletionRequestUserMessage::from(build_prompt(description)).into(),
            ])
            .temperature(TEMPERATURE)
            .build()
            .map_err(|e| anyhow!("Failed to build API request: {}", e))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow!("LLM API call timed out after {:?}", self.timeout))?
            .map_err(|e| anyhow!("LLM API call failed: {}", e))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or_else(|| anyhow!("LLM returned an empty response"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl<M> Translator for LlmTranslator<M>
where
    M: Config,
{
    async fn translate(&self, description: &str) -> TranslationResult {
        match self.complete(description).await {
            Ok(text) => {
                debug!(chars = text.len(), "translated description");
                TranslationResult::Translated(text)
            }
            Err(e) => {
                let preview: String = description.chars().take(30).collect();
                warn!("Error translating text '{}...': {}", preview, e);
                TranslationResult::Failed {
                    placeholder: self.placeholder.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
