//! # Thai University FAQ Answer Resolution
//!
//! This crate matches incoming Thai-language chat messages against a curated
//! FAQ knowledge base and decides how to answer: trust the stored answer
//! (optionally rewritten for tone by a configurable AI provider), fall back
//! to a web search, escalate to free-form AI generation over the session
//! history, or apologize.

pub mod errors;
pub mod index;
pub mod location;
pub mod normalize;
pub mod policy;
pub mod prompts;
pub mod providers;
pub mod retrieval;
pub mod session;
pub mod types;

pub use errors::ResolveError;
pub use index::KeywordIndex;
pub use location::LocationDetector;
pub use policy::{AnswerResolver, ResolverConfig};
pub use retrieval::{RetrievalConfig, RetrievalEngine};
pub use session::{spawn_sweeper, ConversationStore, StoreStats};
pub use types::{
    AnswerSource, ChatRole, ChatTurn, Contact, GeoPoint, ResolvedAnswer, RetrievalMatch,
    SearchStrategy,
};
