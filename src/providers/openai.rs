use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BatchItem, TranslationProvider, TranslationResult};
use crate::app_config::TranslationConfig;
use crate::credentials::CredentialSupplier;
use crate::errors::ProviderError;
use crate::translation::prompts;

/// Client for chat-completions compatible APIs
pub struct OpenAIClient {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Resolves the bearer secret at call time
    credentials: Arc<dyn CredentialSupplier>,
    /// Service name passed to the supplier
    credential_service: String,
    /// Token limit for single-item calls
    max_tokens: u32,
    /// Token limit for batch calls
    batch_max_tokens: u32,
    /// Sampling temperature
    temperature: f32,
    /// Per-call timeout for single-item calls
    single_timeout: Duration,
    /// Per-call timeout for batch calls
    batch_timeout: Duration,
}

/// Chat-completions request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Maximum number of tokens to generate
    max_tokens: u32,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Chat-completions response
///
/// Both the flat `{"content": ...}` shape of simple proxies and the standard
/// `choices[0].message.content` shape are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Generated text, if the response carries any
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .or_else(|| self.choices.first().map(|c| c.message.content.as_str()))
    }
}

impl ChatRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
            temperature: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl OpenAIClient {
    /// Create a new client with default limits
    pub fn new(endpoint: impl Into<String>, credentials: Arc<dyn CredentialSupplier>) -> Self {
        Self::from_config(&TranslationConfig::default(), credentials).with_endpoint(endpoint)
    }

    /// Create a client from the translation configuration
    pub fn from_config(config: &TranslationConfig, credentials: Arc<dyn CredentialSupplier>) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            credentials,
            credential_service: config.credential_service.clone(),
            max_tokens: config.max_tokens,
            batch_max_tokens: config.batch_max_tokens,
            temperature: config.temperature,
            single_timeout: config.single_timeout(),
            batch_timeout: config.batch_timeout(),
        }
    }

    /// Override the base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override both call timeouts
    pub fn with_timeouts(mut self, single: Duration, batch: Duration) -> Self {
        self.single_timeout = single;
        self.batch_timeout = batch;
        self
    }

    /// Full URL of the chat-completions route
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    async fn secret(&self) -> Result<String, ProviderError> {
        self.credentials
            .get_credential(&self.credential_service)
            .await
            .ok_or_else(|| ProviderError::Unavailable(self.credential_service.clone()))
    }

    /// Send one chat-completions request and return the generated text
    pub async fn complete(&self, request: ChatRequest, timeout: Duration) -> Result<String, ProviderError> {
        let secret = self.secret().await?;
        let url = self.completions_url();

        debug!("POST {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(secret)
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Chat completions API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), &error_text));
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::ResponseMalformed(format!("Failed to parse response: {}", e)))?;

        parsed
            .text()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ResponseMalformed("response has no content field".to_string()))
    }
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("endpoint", &self.endpoint)
            .field("credential_service", &self.credential_service)
            .field("single_timeout", &self.single_timeout)
            .field("batch_timeout", &self.batch_timeout)
            .finish()
    }
}

#[async_trait]
impl TranslationProvider for OpenAIClient {
    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest::new(model, self.max_tokens)
            .add_message("system", prompts::single_system_prompt(target_language, text))
            .add_message("user", text)
            .temperature(self.temperature);

        let translated = self.complete(request, self.single_timeout).await?;

        let missing = prompts::missing_placeholders(text, &translated);
        if !missing.is_empty() {
            warn!(
                "Model {} dropped placeholder(s) {} translating '{}'",
                model,
                missing.join(", "),
                text
            );
        }

        Ok(translated)
    }

    async fn translate_batch(
        &self,
        items: &[BatchItem],
        target_language: &str,
        model: &str,
    ) -> Result<TranslationResult, ProviderError> {
        if items.is_empty() {
            return Ok(TranslationResult::new());
        }

        let request = ChatRequest::new(model, self.batch_max_tokens)
            .add_message("system", prompts::batch_system_prompt(target_language))
            .add_message("user", prompts::encode_batch_payload(items)?)
            .temperature(self.temperature);

        let content = self.complete(request, self.batch_timeout).await?;
        let result = prompts::decode_batch_response(&content, items)?;

        debug!(
            "Batch call to {} returned {}/{} requested keys",
            model,
            result.len(),
            items.len()
        );

        Ok(result)
    }

    async fn check_available(&self) -> Result<(), ProviderError> {
        self.secret().await.map(|_| ())
    }
}
