use crate::errors::ResolveError;
use crate::types::{Contact, EntryRef, FaqEntry};
use async_trait::async_trait;
use std::fmt::Debug;

/// An entry returned by a keyword-scored query, with the keywords that
/// matched and how many distinct ones did.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredEntry {
    pub entry: FaqEntry,
    pub keywords: Vec<String>,
    pub keyword_count: i64,
}

/// The read-only entry queries behind the retrieval strategies.
///
/// Writes to these tables belong to external admin tooling; this crate
/// never mutates the knowledge base.
#[async_trait]
pub trait EntrySearch: Send + Sync + Debug {
    /// Candidates for the navigation strategy: titles filtered by
    /// `title_terms` (skipped when empty), bodies pre-filtered for map
    /// links or decimal pairs, newest first. The caller validates the
    /// candidates against the real URL/coordinate patterns.
    async fn navigation_candidates(
        &self,
        title_terms: &[String],
    ) -> Result<Vec<FaqEntry>, ResolveError>;

    /// Top entry joined to keywords containing `token`, ranked by distinct
    /// matching keyword count. Keywords in `negatives` never score.
    async fn keyword_match(
        &self,
        token: &str,
        negatives: &[String],
    ) -> Result<Option<ScoredEntry>, ResolveError>;

    /// Top entry whose title-plus-body contains `message`, store-default
    /// ordering.
    async fn fulltext_match(&self, message: &str) -> Result<Option<ScoredEntry>, ResolveError>;
}

/// Read access to the keyword, synonym, and negative-keyword tables.
#[async_trait]
pub trait KeywordCatalog: Send + Sync + Debug {
    async fn negative_keywords(&self) -> Result<Vec<String>, ResolveError>;

    /// Canonical keyword text for an alternate input word, if an active
    /// synonym mapping exists. Highest similarity wins.
    async fn resolve_synonym(&self, token: &str) -> Result<Option<String>, ResolveError>;

    /// Entries associated with keywords containing `token`.
    async fn entries_for_keyword(&self, token: &str) -> Result<Vec<EntryRef>, ResolveError>;
}

/// Read access to the generic key/value settings table.
#[async_trait]
pub trait SettingsRead: Send + Sync + Debug {
    async fn setting(&self, key: &str) -> Result<Option<String>, ResolveError>;
}

/// Best-effort contact rows shown alongside positive answers.
#[async_trait]
pub trait ContactLookup: Send + Sync + Debug {
    async fn contacts(&self) -> Result<Vec<Contact>, ResolveError>;
}
