use crate::{
    errors::ResolveError,
    providers::ai::{AiProvider, ChatOptions, ChatReply, ChatUsage},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfigBody,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfigBody {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    text: String,
}

#[derive(Deserialize, Debug, Default)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: u32,
}

// --- Generation tuning ---

/// Sampling parameters sent with every request.
///
/// Tunable per deployment through `GEMINI_TEMPERATURE`, `GEMINI_TOP_P`,
/// `GEMINI_TOP_K`, and `GEMINI_MAX_OUTPUT_TOKENS`.
#[derive(Clone, Copy, Debug)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 1000,
        }
    }
}

impl GenerationConfig {
    /// Reads the tuning env vars, keeping defaults for anything unset or
    /// unparseable.
    pub fn from_env() -> Self {
        fn var<T: std::str::FromStr>(key: &str, fallback: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        }
        let defaults = Self::default();
        Self {
            temperature: var("GEMINI_TEMPERATURE", defaults.temperature),
            top_p: var("GEMINI_TOP_P", defaults.top_p),
            top_k: var("GEMINI_TOP_K", defaults.top_k),
            max_output_tokens: var("GEMINI_MAX_OUTPUT_TOKENS", defaults.max_output_tokens),
        }
    }
}

// --- Gemini Provider implementation ---

/// A provider for the Google Gemini API.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider` with tuning read from the env.
    pub fn new(api_url: String, api_key: String) -> Result<Self, ResolveError> {
        if api_key.is_empty() {
            return Err(ResolveError::MissingApiKey);
        }
        let client = ReqwestClient::builder()
            .build()
            .map_err(ResolveError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            generation: GenerationConfig::from_env(),
        })
    }

    /// Replaces the sampling parameters.
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ChatReply, ResolveError> {
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfigBody {
                temperature: self.generation.temperature,
                top_p: self.generation.top_p,
                top_k: self.generation.top_k,
                max_output_tokens: options
                    .max_tokens
                    .unwrap_or(self.generation.max_output_tokens),
            },
        };

        let mut request = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body);
        if let Some(budget) = options.timeout {
            request = request.timeout(budget);
        }

        let response = request.send().await.map_err(|e| match options.timeout {
            Some(budget) if e.is_timeout() => ResolveError::AiTimeout(budget),
            _ => ResolveError::AiRequest(e),
        })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResolveError::AiApi(error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(ResolveError::AiDeserialization)?;

        let message = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();
        let usage = gemini_response.usage_metadata.map(|u| ChatUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ChatReply { message, usage })
    }
}
