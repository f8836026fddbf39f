use thiserror::Error;

/// Error types for the answer-resolution pipeline.
///
/// Most of these never reach a caller of [`crate::policy::AnswerResolver`]:
/// the policy layer maps provider failures to a degraded branch and keeps
/// going. They surface directly only from provider constructors and from
/// code that drives a provider on its own.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to the AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize the AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI call exceeded its {0:?} budget")]
    AiTimeout(std::time::Duration),
    #[error("Web search request failed: {0}")]
    WebSearchRequest(reqwest::Error),
    #[error("Web search exceeded its {0:?} budget")]
    WebSearchTimeout(std::time::Duration),
    #[error("Knowledge store unavailable: {0}")]
    StoreUnavailable(#[from] turso::Error),
    #[error("API key is missing")]
    MissingApiKey,
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
