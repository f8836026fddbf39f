//! # AI Provider Factory
//!
//! Centralizes the choice between the Gemini provider and an
//! OpenAI-compatible local provider, so every consumer (the CLI, tests)
//! resolves a model name the same way.

use crate::{
    errors::ResolveError,
    providers::ai::{
        gemini::{GeminiProvider, GenerationConfig},
        local::LocalAiProvider,
        AiProvider,
    },
};
use tracing::info;

/// How to reach the generative-AI collaborator.
#[derive(Clone, Debug, Default)]
pub struct AiSettings {
    /// Model name; a `gemini` prefix selects the Gemini provider.
    pub model: String,
    /// Required for Gemini; optional bearer token for local providers.
    pub api_key: Option<String>,
    /// Required for local providers; overrides the derived Gemini URL.
    pub api_url: Option<String>,
}

/// Creates the AI provider an `AiSettings` describes.
///
/// Gemini models derive their endpoint from the model name unless
/// `api_url` overrides it; anything else is treated as an
/// OpenAI-compatible chat-completions endpoint and must carry a URL.
pub fn create_ai_provider(settings: &AiSettings) -> Result<Box<dyn AiProvider>, ResolveError> {
    if settings.model.starts_with("gemini") {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ResolveError::MissingApiKey)?;
        let api_url = settings.api_url.clone().unwrap_or_else(|| {
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                settings.model
            )
        });
        info!(model = %settings.model, "configuring the Gemini provider");
        let provider =
            GeminiProvider::new(api_url, api_key)?.with_generation(GenerationConfig::from_env());
        return Ok(Box::new(provider));
    }

    let api_url = settings.api_url.clone().ok_or_else(|| {
        ResolveError::Configuration(format!(
            "model '{}' needs an api_url pointing at an OpenAI-compatible endpoint",
            settings.model
        ))
    })?;
    info!(model = %settings.model, %api_url, "configuring the local AI provider");
    let provider = LocalAiProvider::new(
        api_url,
        settings.api_key.clone(),
        Some(settings.model.clone()),
    )?;
    Ok(Box::new(provider))
}
