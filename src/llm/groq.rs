//! HTTP client for Groq's OpenAI-compatible chat completions API.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Generation, GenerationRequest, LlmError, ModelClient, Usage};
use crate::config::{ConfigError, env_or, env_parse};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Clone, Debug)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GroqConfig {
    pub fn new_from_env(timeout: Duration) -> Result<Self, ConfigError> {
        let api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty() && k != "YOUR_GROQ_API_KEY");

        Ok(Self {
            api_key,
            base_url: env_or("GROQ_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("GROQ_MODEL", DEFAULT_MODEL),
            temperature: env_parse("GROQ_TEMPERATURE", Some(DEFAULT_TEMPERATURE))?,
            timeout,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GroqUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
    #[serde(default)]
    prompt_time: Option<f64>,
    #[serde(default)]
    completion_time: Option<f64>,
    #[serde(default)]
    total_time: Option<f64>,
}

impl From<GroqUsage> for Usage {
    fn from(usage: GroqUsage) -> Self {
        Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            prompt_time: usage.prompt_time,
            completion_time: usage.completion_time,
            total_time: usage.total_time,
        }
    }
}

#[derive(Debug)]
pub struct GroqClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(config: &GroqConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::MissingApiKey("GROQ_API_KEY".into()))?;
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client against a custom base URL (for testing with mock servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl ModelClient for GroqClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatCompletionRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(LlmError::RateLimited { retry_after });
        }

        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(LlmError::ApiError {
                status,
                message: body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response has no message content".into()))?;
        let usage: Usage = parsed.usage.unwrap_or_default().into();

        tracing::debug!(
            model = %request.model,
            total_tokens = usage.total_tokens,
            prompt_time = ?usage.prompt_time,
            completion_time = ?usage.completion_time,
            total_time = ?usage.total_time,
            "model generation finished"
        );

        Ok(Generation { content, usage })
    }
}
