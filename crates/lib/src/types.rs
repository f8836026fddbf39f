use serde::{Deserialize, Serialize};
use std::fmt;

/// A question/answer record from the knowledge base.
///
/// Owned by external admin tooling; this crate only reads them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: i64,
    pub title: String,
    pub body: String,
}

/// A lightweight reference to an entry, as returned by keyword lookups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryRef {
    pub id: i64,
    pub title: String,
}

/// A validated coordinate pair inside the serviceable bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// The retrieval strategy that produced a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    Navigation,
    Keyword,
    WordByWord,
    Substring,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigation => "navigation",
            Self::Keyword => "keyword",
            Self::WordByWord => "word-by-word",
            Self::Substring => "substring",
        };
        write!(f, "{name}")
    }
}

/// The best match the retrieval pipeline found for one message.
///
/// Transient: recomputed per request, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub entry_id: i64,
    pub title: String,
    pub body: String,
    pub keywords: Vec<String>,
    pub coords: Option<GeoPoint>,
    pub strategy: SearchStrategy,
}

/// Who authored a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a conversation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// A contact row surfaced alongside positive answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub organization: String,
    pub category: String,
    pub contact: String,
}

/// Which layer of the policy produced the final message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerSource {
    Database,
    GoogleFallback,
    Ai,
    Unanswered,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Database => "database",
            Self::GoogleFallback => "google-fallback",
            Self::Ai => "ai",
            Self::Unanswered => "unanswered",
        };
        write!(f, "{name}")
    }
}

/// The structured result handed back to whatever transport called us.
///
/// Serialized camelCase because the upstream consumers expect the shape the
/// production service returned.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAnswer {
    pub success: bool,
    pub message: String,
    pub source: AnswerSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_link: Option<String>,
    pub contacts: Vec<Contact>,
    pub message_count: usize,
    pub timestamp: String,
}
