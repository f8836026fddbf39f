//! # Answer Resolution Policy
//!
//! The decision layer on top of retrieval. A stored answer is the ground
//! truth: when one is found, the AI may only rewrite it for tone, never
//! replace it. On a miss the policy degrades through a web-search fallback
//! and free-form AI generation before apologizing. Every external call is
//! a single bounded attempt; failures fall through to the next branch and
//! never surface as raw errors.

use crate::normalize::normalize;
use crate::prompts::{self, TERMINAL_APOLOGY};
use crate::providers::ai::{AiProvider, ChatOptions};
use crate::providers::db::storage::{ContactLookup, EntrySearch, KeywordCatalog, SettingsRead};
use crate::providers::web::WebSearchProvider;
use crate::retrieval::RetrievalEngine;
use crate::session::ConversationStore;
use crate::types::{AnswerSource, ChatRole, Contact, ResolvedAnswer, RetrievalMatch};
use crate::ResolveError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(8);

/// Tuning for the resolver's external calls.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Deadline for each AI call (enhancement and generation alike).
    pub ai_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ai_timeout: DEFAULT_AI_TIMEOUT,
        }
    }
}

/// Resolves one message per call into a [`ResolvedAnswer`].
///
/// The AI and web-search collaborators are optional; a missing
/// collaborator simply skips its branch, so a deployment without an API
/// key still answers from the knowledge base.
#[derive(Debug)]
pub struct AnswerResolver<P> {
    engine: RetrievalEngine<P>,
    store: Arc<P>,
    sessions: Arc<ConversationStore>,
    ai: Option<Box<dyn AiProvider>>,
    web: Option<Box<dyn WebSearchProvider>>,
    config: ResolverConfig,
}

impl<P> AnswerResolver<P>
where
    P: EntrySearch + KeywordCatalog + SettingsRead + ContactLookup,
{
    pub fn new(
        engine: RetrievalEngine<P>,
        store: Arc<P>,
        sessions: Arc<ConversationStore>,
        ai: Option<Box<dyn AiProvider>>,
        web: Option<Box<dyn WebSearchProvider>>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            engine,
            store,
            sessions,
            ai,
            web,
            config,
        }
    }

    pub fn sessions(&self) -> &ConversationStore {
        &self.sessions
    }

    /// Runs the full decision sequence for one message.
    ///
    /// `category` is an optional contextual hint forwarded to the AI
    /// prompts, typically the topic the frontend was browsing.
    pub async fn resolve(
        &self,
        message: &str,
        session_id: &str,
        category: Option<&str>,
    ) -> ResolvedAnswer {
        let message = normalize(message);
        debug!(session_id, "resolving message");

        if let Some(found) = self.engine.search(&message).await {
            return self.database_branch(&message, found, category, session_id).await;
        }

        if let Some(answer) = self.web_branch(&message, session_id).await {
            return answer;
        }

        if let Some(answer) = self.ai_branch(&message, category, session_id).await {
            return answer;
        }

        info!(session_id, "every branch failed, returning the terminal apology");
        self.respond(
            session_id,
            false,
            AnswerSource::Unanswered,
            TERMINAL_APOLOGY.to_string(),
        )
    }

    /// Branch 1: a stored answer, optionally rewritten for tone.
    async fn database_branch(
        &self,
        message: &str,
        found: RetrievalMatch,
        category: Option<&str>,
        session_id: &str,
    ) -> ResolvedAnswer {
        info!(
            entry_id = found.entry_id,
            strategy = %found.strategy,
            "answering from the knowledge base"
        );

        let mut text = match self.enhance(message, &found.body, category).await {
            Ok(enhanced) if !enhanced.trim().is_empty() => enhanced,
            Ok(_) => found.body.clone(),
            Err(error) => {
                warn!(%error, "enhancement failed, returning the stored answer verbatim");
                found.body.clone()
            }
        };

        if let Some(point) = found.coords {
            if !self.engine.detector().has_coordinate_shape(&text) {
                text.push_str(&prompts::coordinate_line(point.lat, point.lng));
            }
        }

        let mut answer = self.respond(session_id, true, AnswerSource::Database, text);
        answer.database_title = Some(found.title);
        answer.database_answer = Some(found.body);
        answer.database_lat = found.coords.map(|p| p.lat);
        answer.database_lng = found.coords.map(|p| p.lng);
        answer.contacts = self.contacts().await;
        answer
    }

    async fn enhance(
        &self,
        question: &str,
        base_answer: &str,
        category: Option<&str>,
    ) -> Result<String, ResolveError> {
        let Some(ai) = &self.ai else {
            return Ok(base_answer.to_string());
        };
        let options = ChatOptions {
            max_tokens: None,
            timeout: Some(self.config.ai_timeout),
        };
        match tokio::time::timeout(
            self.config.ai_timeout,
            ai.enhance_answer(question, base_answer, category, &options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ResolveError::AiTimeout(self.config.ai_timeout)),
        }
    }

    /// Branch 2: apologize but cite the top external search result.
    async fn web_branch(&self, message: &str, session_id: &str) -> Option<ResolvedAnswer> {
        let web = self.web.as_ref()?;
        let hit = match web.top_result(message).await {
            Ok(Some(hit)) => hit,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "web-search fallback failed");
                return None;
            }
        };

        info!(link = %hit.link, "answering with the web-search fallback");
        let mut answer = self.respond(
            session_id,
            true,
            AnswerSource::GoogleFallback,
            prompts::web_fallback_message(&hit.link, &hit.snippet),
        );
        answer.google_link = Some(hit.link);
        answer.contacts = self.contacts().await;
        Some(answer)
    }

    /// Branch 3: free-form generation over the session history. The only
    /// branch that records the exchange, so follow-up questions can lean
    /// on it.
    async fn ai_branch(
        &self,
        message: &str,
        category: Option<&str>,
        session_id: &str,
    ) -> Option<ResolvedAnswer> {
        let ai = self.ai.as_ref()?;

        let history = self.sessions.history(session_id);
        let prompt = prompts::conversation_prompt(message, &history, category);
        let options = ChatOptions {
            max_tokens: None,
            timeout: Some(self.config.ai_timeout),
        };

        let reply = match tokio::time::timeout(self.config.ai_timeout, ai.chat(&prompt, &options))
            .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(error)) => {
                warn!(%error, "ai generation failed");
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.config.ai_timeout, "ai generation timed out");
                return None;
            }
        };
        if reply.message.trim().is_empty() {
            warn!("ai generation returned an empty message");
            return None;
        }
        if let Some(usage) = reply.usage {
            debug!(total_tokens = usage.total_tokens, "generation token usage");
        }

        info!(session_id, "answering with free-form generation");
        self.sessions.append(session_id, ChatRole::User, message);
        self.sessions
            .append(session_id, ChatRole::Assistant, reply.message.clone());

        let mut answer = self.respond(session_id, true, AnswerSource::Ai, reply.message);
        answer.contacts = self.contacts().await;
        Some(answer)
    }

    async fn contacts(&self) -> Vec<Contact> {
        match self.store.contacts().await {
            Ok(contacts) => contacts,
            Err(error) => {
                warn!(%error, "contact lookup failed");
                Vec::new()
            }
        }
    }

    fn respond(
        &self,
        session_id: &str,
        success: bool,
        source: AnswerSource,
        message: String,
    ) -> ResolvedAnswer {
        ResolvedAnswer {
            success,
            message,
            source,
            database_title: None,
            database_answer: None,
            database_lat: None,
            database_lng: None,
            google_link: None,
            contacts: Vec::new(),
            message_count: self.sessions.history(session_id).len(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
