//! # Retrieval Engine
//!
//! Ordered, short-circuiting search over the knowledge base. Strategies
//! run from most to least precise: navigation entries for location
//! questions, an exact keyword match on the whole message, a word-by-word
//! keyword fallback, and finally a raw substring scan. The first strategy
//! that produces an entry wins; store failures degrade to "not found" so
//! a flaky database read never turns into a user-facing error.

use crate::index::KeywordIndex;
use crate::location::LocationDetector;
use crate::providers::db::storage::{EntrySearch, KeywordCatalog, ScoredEntry, SettingsRead};
use crate::types::{RetrievalMatch, SearchStrategy};
use crate::ResolveError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tuning for the word-by-word fallback.
#[derive(Clone, Debug)]
pub struct RetrievalConfig {
    /// Filler words dropped before per-token lookup. Campus slang like
    /// "มอ" matches half the knowledge base, so it never gets to score.
    pub particles: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            particles: vec!["มอ".to_string()],
        }
    }
}

/// Multi-strategy search over the FAQ store.
#[derive(Debug)]
pub struct RetrievalEngine<P> {
    store: Arc<P>,
    index: Arc<KeywordIndex<P>>,
    detector: LocationDetector,
    config: RetrievalConfig,
}

impl<P> RetrievalEngine<P>
where
    P: EntrySearch + KeywordCatalog + SettingsRead,
{
    pub fn new(
        store: Arc<P>,
        index: Arc<KeywordIndex<P>>,
        config: RetrievalConfig,
    ) -> Result<Self, ResolveError> {
        Ok(Self {
            store,
            index,
            detector: LocationDetector::new()?,
            config,
        })
    }

    /// The shared pattern set, for callers that format coordinates.
    pub fn detector(&self) -> &LocationDetector {
        &self.detector
    }

    /// Finds the best stored entry for a normalized message, or `None`
    /// when every strategy comes up empty.
    pub async fn search(&self, message: &str) -> Option<RetrievalMatch> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        if let Some(found) = self.navigation_strategy(message).await {
            return Some(found);
        }

        let negatives = self.index.negative_keywords().await;

        // Whole-message synonym substitution first, so an alternate
        // spelling of a canonical keyword still gets the exact match.
        let query = self
            .index
            .resolve_synonym(message)
            .await
            .unwrap_or_else(|| message.to_string());
        if let Some(found) = self
            .keyword_strategy(&query, &negatives, SearchStrategy::Keyword)
            .await
        {
            return Some(found);
        }

        if let Some(found) = self.word_by_word_strategy(message, &negatives).await {
            return Some(found);
        }

        match self.store.fulltext_match(message).await {
            Ok(Some(scored)) => {
                debug!(entry_id = scored.entry.id, "substring strategy matched");
                return Some(self.into_match(scored, SearchStrategy::Substring));
            }
            Ok(None) => {}
            Err(error) => warn!(%error, "substring query failed"),
        }

        debug!(message, "no strategy matched");
        None
    }

    /// Strategy 1: when the message reads as a navigation question, pick
    /// the newest entry that actually carries a map link or a coordinate
    /// pair inside the serviceable bounding box.
    async fn navigation_strategy(&self, message: &str) -> Option<RetrievalMatch> {
        let location_keywords = self.index.location_keywords().await;
        if !self.detector.is_location_query(message, &location_keywords) {
            return None;
        }

        let candidates = match self.store.navigation_candidates(&location_keywords).await {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(%error, "navigation candidate query failed");
                return None;
            }
        };

        for entry in candidates {
            let coords = self
                .detector
                .extract_coords(&entry.body)
                .or_else(|| self.detector.extract_coords(&entry.title));
            if coords.is_some() || self.detector.has_map_link(&entry.body) {
                debug!(entry_id = entry.id, "navigation strategy matched");
                return Some(RetrievalMatch {
                    entry_id: entry.id,
                    title: entry.title,
                    body: entry.body,
                    keywords: Vec::new(),
                    coords,
                    strategy: SearchStrategy::Navigation,
                });
            }
        }
        None
    }

    /// Strategy 3: split on whitespace and retry the keyword match per
    /// token, skipping single characters, particles, and negative words.
    /// The first token that matches wins outright.
    async fn word_by_word_strategy(
        &self,
        message: &str,
        negatives: &[String],
    ) -> Option<RetrievalMatch> {
        for token in message.split_whitespace() {
            if token.chars().count() <= 1 {
                continue;
            }
            if self.config.particles.iter().any(|p| p == token) {
                continue;
            }
            if self.index.is_negative(token).await {
                continue;
            }

            let token = self
                .index
                .resolve_synonym(token)
                .await
                .unwrap_or_else(|| token.to_string());
            if let Some(found) = self
                .keyword_strategy(&token, negatives, SearchStrategy::WordByWord)
                .await
            {
                return Some(found);
            }
        }
        None
    }

    async fn keyword_strategy(
        &self,
        token: &str,
        negatives: &[String],
        strategy: SearchStrategy,
    ) -> Option<RetrievalMatch> {
        match self.store.keyword_match(token, negatives).await {
            Ok(Some(scored)) => {
                debug!(
                    entry_id = scored.entry.id,
                    keyword_count = scored.keyword_count,
                    %strategy,
                    "keyword strategy matched"
                );
                Some(self.into_match(scored, strategy))
            }
            Ok(None) => None,
            Err(error) => {
                warn!(%error, token, "keyword query failed");
                None
            }
        }
    }

    fn into_match(&self, scored: ScoredEntry, strategy: SearchStrategy) -> RetrievalMatch {
        let coords = self
            .detector
            .extract_coords(&scored.entry.body)
            .or_else(|| self.detector.extract_coords(&scored.entry.title));
        RetrievalMatch {
            entry_id: scored.entry.id,
            title: scored.entry.title,
            body: scored.entry.body,
            keywords: scored.keywords,
            coords,
            strategy,
        }
    }
}
