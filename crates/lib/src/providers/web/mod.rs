pub mod google;

use crate::errors::ResolveError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The single best hit a web search returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebHit {
    pub link: String,
    pub snippet: String,
}

/// A trait for the best-effort web-search fallback.
///
/// The underlying result-page format is not a stable contract, so the
/// pipeline only ever talks to this seam; swapping the scraper for a real
/// search API touches nothing else.
#[async_trait]
pub trait WebSearchProvider: Send + Sync + Debug + DynClone {
    /// Returns the top organic result for `query`, if one can be found.
    async fn top_result(&self, query: &str) -> Result<Option<WebHit>, ResolveError>;
}

dyn_clone::clone_trait_object!(WebSearchProvider);
