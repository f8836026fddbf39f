//! Integration tests for the multi-strategy retrieval pipeline.

mod common;

use anyhow::Result;
use common::{seeded_provider, setup_tracing};
use faqbot::index::{KeywordIndex, DEFAULT_CACHE_TTL};
use faqbot::providers::db::sqlite::SqliteProvider;
use faqbot::retrieval::{RetrievalConfig, RetrievalEngine};
use faqbot::types::SearchStrategy;
use std::sync::Arc;

async fn engine() -> Result<RetrievalEngine<SqliteProvider>> {
    let provider = Arc::new(seeded_provider().await);
    let index = Arc::new(KeywordIndex::new(provider.clone(), DEFAULT_CACHE_TTL));
    Ok(RetrievalEngine::new(
        provider,
        index,
        RetrievalConfig::default(),
    )?)
}

#[tokio::test]
async fn exact_keyword_match_wins_over_substring() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    // "หอพัก" is both a keyword and a title substring; the keyword
    // strategy must claim it first.
    let found = engine.search("หอพัก").await.expect("a match");
    assert_eq!(found.entry_id, 2);
    assert_eq!(found.strategy, SearchStrategy::Keyword);
    assert!(found.keywords.contains(&"หอพัก".to_string()));
    Ok(())
}

#[tokio::test]
async fn word_by_word_returns_the_first_matching_token() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    // "ก" is too short, "มอ" is a particle, "มี" matches nothing; the
    // first token that matches is "หอพัก", so "ลงทะเบียน" never runs.
    let found = engine
        .search("ก มอ มี หอพัก ลงทะเบียน")
        .await
        .expect("a match");
    assert_eq!(found.entry_id, 2);
    assert_eq!(found.strategy, SearchStrategy::WordByWord);
    Ok(())
}

#[tokio::test]
async fn navigation_strategy_claims_location_questions() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    let found = engine
        .search("ตึก คณะวิศวกรรมศาสตร์ อยู่ตรงไหน")
        .await
        .expect("a match");

    // Entry 5 is newer and title-matches "ตึก" but carries no real
    // coordinates or map link, so validation falls through to entry 3.
    assert_eq!(found.entry_id, 3);
    assert_eq!(found.strategy, SearchStrategy::Navigation);
    let point = found.coords.expect("coordinates attached");
    assert_eq!(point.lat, 16.422083);
    assert_eq!(point.lng, 101.152533);
    Ok(())
}

#[tokio::test]
async fn location_keywords_match_word_boundaries_only() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    // "ตึกเรียนรวม" glues the location keyword to the rest of the word,
    // so the navigation strategy stays quiet and the per-word fallback
    // answers from the "วิศวะ" token instead.
    let found = engine.search("วิศวะ ตึกเรียนรวม").await.expect("a match");
    assert_eq!(found.entry_id, 3);
    assert_eq!(found.strategy, SearchStrategy::WordByWord);
    Ok(())
}

#[tokio::test]
async fn coordinates_attach_only_inside_the_bounding_box() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    let found = engine.search("วิศวะ").await.expect("a match");
    assert_eq!(found.entry_id, 3);
    assert!(found.coords.is_some());

    // Entry 6's Tokyo pair lies outside the serviceable box.
    let found = engine.search("โตเกียว").await.expect("a match");
    assert_eq!(found.entry_id, 6);
    assert!(found.coords.is_none());
    Ok(())
}

#[tokio::test]
async fn synonyms_substitute_before_keyword_matching() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    let found = engine.search("reg").await.expect("a match");
    assert_eq!(found.entry_id, 1);
    assert_eq!(found.strategy, SearchStrategy::Keyword);
    Ok(())
}

#[tokio::test]
async fn inactive_synonyms_do_not_resolve() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    assert!(engine.search("dorm").await.is_none());
    Ok(())
}

#[tokio::test]
async fn substring_scan_is_the_last_resort() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    let found = engine.search("reg.university").await.expect("a match");
    assert_eq!(found.entry_id, 1);
    assert_eq!(found.strategy, SearchStrategy::Substring);
    Ok(())
}

#[tokio::test]
async fn blank_and_unknown_messages_return_none() -> Result<()> {
    setup_tracing();
    let engine = engine().await?;

    assert!(engine.search("   ").await.is_none());
    assert!(engine.search("สวัสดีครับ").await.is_none());
    Ok(())
}
