pub mod gemini;
pub mod local;

use crate::errors::ResolveError;
use crate::prompts;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// Per-call knobs for a chat completion. `None` means provider default.
#[derive(Clone, Debug, Default)]
pub struct ChatOptions {
    pub max_tokens: Option<u32>,
    pub timeout: Option<Duration>,
}

/// Token accounting reported by the upstream model, when it reports any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completed reply from the model.
#[derive(Clone, Debug)]
pub struct ChatReply {
    pub message: String,
    pub usage: Option<ChatUsage>,
}

/// A trait for the external generative-AI collaborator.
///
/// One call per request, bounded by `ChatOptions::timeout`; the policy
/// layer treats any error as a failed branch and moves on.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Sends a single prompt and returns the model's reply.
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ChatReply, ResolveError>;

    /// Rewrites a stored answer for tone, keeping the facts. The default
    /// implementation wraps [`chat`](Self::chat) with the canonical
    /// enhancement prompt.
    async fn enhance_answer(
        &self,
        question: &str,
        base_answer: &str,
        context: Option<&str>,
        options: &ChatOptions,
    ) -> Result<String, ResolveError> {
        let prompt = prompts::enhance_prompt(question, base_answer, context);
        Ok(self.chat(&prompt, options).await?.message)
    }
}

dyn_clone::clone_trait_object!(AiProvider);
