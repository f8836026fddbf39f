//! Wires the loaded configuration into a ready-to-use resolver.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use faqbot::index::{KeywordIndex, DEFAULT_CACHE_TTL};
use faqbot::policy::{AnswerResolver, ResolverConfig, DEFAULT_AI_TIMEOUT};
use faqbot::providers::db::sqlite::SqliteProvider;
use faqbot::providers::factory::{create_ai_provider, AiSettings};
use faqbot::providers::web::google::GoogleScrapeSearch;
use faqbot::providers::web::WebSearchProvider;
use faqbot::retrieval::{RetrievalConfig, RetrievalEngine};
use faqbot::session::ConversationStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a command handler needs: the resolver plus the session store
/// handle the sweeper task is spawned from.
pub struct App {
    pub resolver: AnswerResolver<SqliteProvider>,
    pub sessions: Arc<ConversationStore>,
}

pub async fn build_app(config: &AppConfig) -> Result<App> {
    let store = Arc::new(
        SqliteProvider::new(&config.db_url)
            .await
            .with_context(|| format!("opening knowledge base at '{}'", config.db_url))?,
    );
    store.initialize_schema().await?;

    let index = Arc::new(KeywordIndex::new(store.clone(), DEFAULT_CACHE_TTL));
    let engine = RetrievalEngine::new(store.clone(), index, RetrievalConfig::default())?;

    let ai = match &config.ai {
        Some(section) => {
            info!(model = %section.model, "ai collaborator configured");
            Some(create_ai_provider(&AiSettings {
                model: section.model.clone(),
                api_key: section.api_key.clone(),
                api_url: section.api_url.clone(),
            })?)
        }
        None => {
            info!("no ai collaborator configured, answering from the knowledge base only");
            None
        }
    };

    let web: Option<Box<dyn WebSearchProvider>> = if config.web.enabled {
        Some(Box::new(GoogleScrapeSearch::new(
            config.web.base_url.clone(),
            Duration::from_secs(config.web.timeout_secs),
        )?))
    } else {
        None
    };

    let sessions = Arc::new(ConversationStore::new(
        config.session.max_history,
        Duration::from_secs(config.session.idle_timeout_secs),
    ));

    let ai_timeout = config
        .ai
        .as_ref()
        .map(|section| Duration::from_secs(section.timeout_secs))
        .unwrap_or(DEFAULT_AI_TIMEOUT);
    let resolver = AnswerResolver::new(
        engine,
        store,
        sessions.clone(),
        ai,
        web,
        ResolverConfig { ai_timeout },
    );

    Ok(App { resolver, sessions })
}
