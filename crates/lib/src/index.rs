//! # Keyword Index
//!
//! A read-through view over the keyword, synonym, and negative-keyword
//! tables. The negative-keyword and location-keyword sets are cached in
//! process memory with a TTL and refreshed lazily; a store failure during
//! refresh degrades to the empty set so retrieval keeps working with
//! reduced precision instead of erroring.

use crate::errors::ResolveError;
use crate::providers::db::storage::{KeywordCatalog, SettingsRead};
use crate::types::EntryRef;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How long a cached keyword set stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Env var and settings-store key carrying the location trigger keywords.
pub const LOCATION_KEYWORDS_KEY: &str = "LOCATION_QUERY_KEYWORDS";

struct Cached<T> {
    value: T,
    loaded_at: Instant,
}

impl<T> Cached<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            loaded_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.loaded_at.elapsed() < ttl
    }
}

impl<T> std::fmt::Debug for Cached<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cached")
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

/// Cached keyword configuration service.
///
/// Construct once with the store handle and share via `Arc`; concurrent
/// refreshes are idempotent (last successful read wins).
#[derive(Debug)]
pub struct KeywordIndex<P> {
    store: Arc<P>,
    ttl: Duration,
    negatives: RwLock<Option<Cached<HashSet<String>>>>,
    location_keywords: RwLock<Option<Cached<Vec<String>>>>,
}

impl<P> KeywordIndex<P>
where
    P: KeywordCatalog + SettingsRead,
{
    pub fn new(store: Arc<P>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            negatives: RwLock::new(None),
            location_keywords: RwLock::new(None),
        }
    }

    /// The negative-keyword set, lowercased. Empty when none are
    /// configured or the store cannot be read.
    pub async fn negative_keywords(&self) -> Vec<String> {
        if let Some(cached) = self.negatives.read().await.as_ref() {
            if cached.is_fresh(self.ttl) {
                return sorted(&cached.value);
            }
        }

        let set: HashSet<String> = match self.store.negative_keywords().await {
            Ok(words) => words.into_iter().map(|w| w.to_lowercase()).collect(),
            Err(error) => {
                warn!(%error, "negative keyword refresh failed, degrading to empty set");
                HashSet::new()
            }
        };
        debug!(count = set.len(), "refreshed negative keyword cache");

        let snapshot = sorted(&set);
        *self.negatives.write().await = Some(Cached::new(set));
        snapshot
    }

    /// Whether a token is excluded from scoring.
    pub async fn is_negative(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        // Refresh through the public path so staleness is handled once.
        if let Some(cached) = self.negatives.read().await.as_ref() {
            if cached.is_fresh(self.ttl) {
                return cached.value.contains(&token);
            }
        }
        self.negative_keywords().await.contains(&token)
    }

    /// Canonical keyword text for an alternate input word. Read-through;
    /// degrades to `None` when the store cannot answer.
    pub async fn resolve_synonym(&self, token: &str) -> Option<String> {
        match self.store.resolve_synonym(token).await {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(%error, token, "synonym lookup failed");
                None
            }
        }
    }

    /// Entries associated with keywords containing `token`. Read-through.
    pub async fn lookup(&self, token: &str) -> Result<Vec<EntryRef>, ResolveError> {
        self.store.entries_for_keyword(token).await
    }

    /// The configured location trigger keywords.
    ///
    /// The `LOCATION_QUERY_KEYWORDS` env var (CSV) takes priority over the
    /// settings-store key of the same name (CSV or JSON array). An empty
    /// result is a valid state, and it is cached like any other.
    pub async fn location_keywords(&self) -> Vec<String> {
        if let Some(cached) = self.location_keywords.read().await.as_ref() {
            if cached.is_fresh(self.ttl) {
                return cached.value.clone();
            }
        }

        let keywords = self.load_location_keywords().await;
        debug!(count = keywords.len(), "refreshed location keyword cache");
        *self.location_keywords.write().await = Some(Cached::new(keywords.clone()));
        keywords
    }

    async fn load_location_keywords(&self) -> Vec<String> {
        if let Ok(raw) = std::env::var(LOCATION_KEYWORDS_KEY) {
            if !raw.trim().is_empty() {
                return parse_keyword_list(&raw);
            }
        }

        match self.store.setting(LOCATION_KEYWORDS_KEY).await {
            Ok(Some(raw)) => parse_keyword_list(&raw),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "location keyword refresh failed, degrading to empty set");
                Vec::new()
            }
        }
    }

    /// Drops both caches. Called by admin tooling after it mutates the
    /// keyword tables, so the next read reloads eagerly.
    pub async fn invalidate(&self) {
        *self.negatives.write().await = None;
        *self.location_keywords.write().await = None;
        debug!("keyword caches invalidated");
    }
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
    let mut words: Vec<String> = set.iter().cloned().collect();
    words.sort();
    words
}

/// Parses a keyword list that may be a JSON array or a CSV string.
fn parse_keyword_list(raw: &str) -> Vec<String> {
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(raw) {
        return items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect();
    }
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    // The process environment is shared, so tests that read or write the
    // location-keyword variable run sequentially.
    static ENV_LOCK: Mutex<()> = Mutex::const_new(());

    #[derive(Debug, Default)]
    struct CountingCatalog {
        negative_loads: AtomicUsize,
        setting_loads: AtomicUsize,
        negatives: Vec<String>,
        setting: Option<String>,
        fail: bool,
    }

    #[async_trait]
    impl KeywordCatalog for CountingCatalog {
        async fn negative_keywords(&self) -> Result<Vec<String>, ResolveError> {
            self.negative_loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ResolveError::Configuration("store down".into()));
            }
            Ok(self.negatives.clone())
        }

        async fn resolve_synonym(&self, _token: &str) -> Result<Option<String>, ResolveError> {
            Ok(None)
        }

        async fn entries_for_keyword(&self, _token: &str) -> Result<Vec<EntryRef>, ResolveError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl SettingsRead for CountingCatalog {
        async fn setting(&self, _key: &str) -> Result<Option<String>, ResolveError> {
            self.setting_loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.setting.clone())
        }
    }

    #[tokio::test]
    async fn negative_set_is_cached_until_ttl() {
        let store = Arc::new(CountingCatalog {
            negatives: vec!["ไม่".to_string(), "HOW".to_string()],
            ..Default::default()
        });
        let index = KeywordIndex::new(store.clone(), Duration::from_millis(60));

        assert!(index.is_negative("ไม่").await);
        assert!(index.is_negative("how").await);
        assert!(!index.is_negative("ตึก").await);
        assert_eq!(store.negative_loads.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(index.is_negative("ไม่").await);
        assert_eq!(store.negative_loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_a_reload() {
        let store = Arc::new(CountingCatalog::default());
        let index = KeywordIndex::new(store.clone(), DEFAULT_CACHE_TTL);

        index.negative_keywords().await;
        index.negative_keywords().await;
        assert_eq!(store.negative_loads.load(Ordering::SeqCst), 1);

        index.invalidate().await;
        index.negative_keywords().await;
        assert_eq!(store.negative_loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty_set() {
        let store = Arc::new(CountingCatalog {
            fail: true,
            ..Default::default()
        });
        let index = KeywordIndex::new(store, DEFAULT_CACHE_TTL);

        assert_eq!(index.negative_keywords().await, Vec::<String>::new());
        assert!(!index.is_negative("อะไร").await);
    }

    #[tokio::test]
    async fn location_keywords_come_from_the_settings_store() {
        let _lock = ENV_LOCK.lock().await;
        std::env::remove_var(LOCATION_KEYWORDS_KEY);
        let store = Arc::new(CountingCatalog {
            setting: Some("ตึก, แผนที่ ,,".to_string()),
            ..Default::default()
        });
        let index = KeywordIndex::new(store.clone(), DEFAULT_CACHE_TTL);

        assert_eq!(index.location_keywords().await, vec!["ตึก", "แผนที่"]);
        index.location_keywords().await;
        assert_eq!(store.setting_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn location_keyword_env_var_wins_over_the_settings_store() {
        let _lock = ENV_LOCK.lock().await;
        let store = Arc::new(CountingCatalog {
            setting: Some("ตึก, แผนที่".to_string()),
            ..Default::default()
        });
        let index = KeywordIndex::new(store.clone(), DEFAULT_CACHE_TTL);

        std::env::set_var(LOCATION_KEYWORDS_KEY, "หอประชุม,ลานจอดรถ");
        let keywords = index.location_keywords().await;
        assert_eq!(keywords, vec!["หอประชุม", "ลานจอดรถ"]);
        // The store was never consulted.
        assert_eq!(store.setting_loads.load(Ordering::SeqCst), 0);

        // A blank override falls through to the settings store.
        std::env::set_var(LOCATION_KEYWORDS_KEY, "   ");
        index.invalidate().await;
        let keywords = index.location_keywords().await;
        std::env::remove_var(LOCATION_KEYWORDS_KEY);
        assert_eq!(keywords, vec!["ตึก", "แผนที่"]);
        assert_eq!(store.setting_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn keyword_lists_parse_as_json_or_csv() {
        assert_eq!(
            parse_keyword_list(r#"["ตึก", " อาคาร "]"#),
            vec!["ตึก", "อาคาร"]
        );
        assert_eq!(parse_keyword_list("ที่ตั้ง,นำทาง"), vec!["ที่ตั้ง", "นำทาง"]);
        assert_eq!(parse_keyword_list(""), Vec::<String>::new());
        assert_eq!(parse_keyword_list("[]"), Vec::<String>::new());
    }
}
