//! Integration tests for the answer-resolution policy.

mod common;

use anyhow::Result;
use common::{
    seeded_provider, setup_tracing, FailingAiProvider, FailingWebSearch, MockAiProvider,
    MockWebSearch, SlowAiProvider,
};
use faqbot::index::{KeywordIndex, DEFAULT_CACHE_TTL};
use faqbot::policy::{AnswerResolver, ResolverConfig};
use faqbot::prompts::TERMINAL_APOLOGY;
use faqbot::providers::ai::AiProvider;
use faqbot::providers::db::sqlite::SqliteProvider;
use faqbot::providers::web::{WebHit, WebSearchProvider};
use faqbot::retrieval::{RetrievalConfig, RetrievalEngine};
use faqbot::session::ConversationStore;
use faqbot::types::AnswerSource;
use std::sync::Arc;
use std::time::Duration;

fn resolver_with_store(
    store: Arc<SqliteProvider>,
    ai: Option<Box<dyn AiProvider>>,
    web: Option<Box<dyn WebSearchProvider>>,
) -> AnswerResolver<SqliteProvider> {
    let index = Arc::new(KeywordIndex::new(store.clone(), DEFAULT_CACHE_TTL));
    let engine =
        RetrievalEngine::new(store.clone(), index, RetrievalConfig::default()).expect("engine");
    AnswerResolver::new(
        engine,
        store,
        Arc::new(ConversationStore::default()),
        ai,
        web,
        ResolverConfig {
            ai_timeout: Duration::from_millis(250),
        },
    )
}

async fn resolver(
    ai: Option<Box<dyn AiProvider>>,
    web: Option<Box<dyn WebSearchProvider>>,
) -> AnswerResolver<SqliteProvider> {
    resolver_with_store(Arc::new(seeded_provider().await), ai, web)
}

#[tokio::test]
async fn database_answers_keep_the_database_source_tag() -> Result<()> {
    setup_tracing();
    let ai = MockAiProvider::new(vec!["คำตอบที่ปรับปรุงแล้วค่ะ".to_string()]);
    let resolver = resolver(Some(Box::new(ai.clone())), None).await;

    let answer = resolver.resolve("หอพัก", "s1", None).await;

    assert!(answer.success);
    assert_eq!(answer.source, AnswerSource::Database);
    assert_eq!(answer.message, "คำตอบที่ปรับปรุงแล้วค่ะ");
    assert_eq!(answer.database_title.as_deref(), Some("หอพักนักศึกษา"));
    assert_eq!(
        answer.database_answer.as_deref(),
        Some("หอพักนักศึกษามีสองโซน เปิดรับสมัครก่อนเปิดภาคการศึกษาหนึ่งเดือน")
    );
    assert_eq!(answer.contacts.len(), 2);

    // The enhancement prompt carried the stored answer as ground truth.
    let prompts = ai.call_history.read().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("หอพักนักศึกษามีสองโซน"));
    Ok(())
}

#[tokio::test]
async fn enhancement_failure_returns_the_stored_answer_verbatim() -> Result<()> {
    setup_tracing();
    let resolver = resolver(Some(Box::new(FailingAiProvider)), None).await;

    let answer = resolver.resolve("หอพัก", "s1", None).await;

    assert!(answer.success);
    assert_eq!(answer.source, AnswerSource::Database);
    assert_eq!(
        answer.message,
        "หอพักนักศึกษามีสองโซน เปิดรับสมัครก่อนเปิดภาคการศึกษาหนึ่งเดือน"
    );
    Ok(())
}

#[tokio::test]
async fn slow_enhancement_times_out_to_the_stored_answer() -> Result<()> {
    setup_tracing();
    let slow = SlowAiProvider {
        delay: Duration::from_secs(2),
    };
    let resolver = resolver(Some(Box::new(slow)), None).await;

    let answer = resolver.resolve("หอพัก", "s1", None).await;

    assert!(answer.success);
    assert_eq!(answer.source, AnswerSource::Database);
    assert_eq!(
        answer.message,
        "หอพักนักศึกษามีสองโซน เปิดรับสมัครก่อนเปิดภาคการศึกษาหนึ่งเดือน"
    );
    Ok(())
}

#[tokio::test]
async fn coordinate_line_is_appended_when_the_text_lacks_one() -> Result<()> {
    setup_tracing();
    let ai = MockAiProvider::new(vec![
        "อาคารคณะวิศวกรรมศาสตร์อยู่ใกล้ประตูหน้ามหาวิทยาลัยค่ะ".to_string()
    ]);
    let resolver = resolver(Some(Box::new(ai)), None).await;

    let answer = resolver.resolve("วิศวะ", "s1", None).await;

    assert_eq!(answer.source, AnswerSource::Database);
    assert_eq!(
        answer.message,
        "อาคารคณะวิศวกรรมศาสตร์อยู่ใกล้ประตูหน้ามหาวิทยาลัยค่ะ\n\n\u{1F4CD} พิกัด: 16.422083, 101.152533"
    );
    assert_eq!(answer.database_lat, Some(16.422083));
    assert_eq!(answer.database_lng, Some(101.152533));
    Ok(())
}

#[tokio::test]
async fn coordinate_line_is_not_duplicated() -> Result<()> {
    setup_tracing();
    let ai = MockAiProvider::new(vec!["พิกัดอาคารคือ 16.422083, 101.152533 ค่ะ".to_string()]);
    let resolver = resolver(Some(Box::new(ai)), None).await;

    let answer = resolver.resolve("วิศวะ", "s1", None).await;

    // The rewritten text already carries a coordinate-shaped substring.
    assert_eq!(answer.message, "พิกัดอาคารคือ 16.422083, 101.152533 ค่ะ");
    assert_eq!(answer.database_lat, Some(16.422083));
    Ok(())
}

#[tokio::test]
async fn web_fallback_answers_when_the_database_misses() -> Result<()> {
    setup_tracing();
    let web = MockWebSearch::new(vec![Some(WebHit {
        link: "https://example.ac.th/faq".to_string(),
        snippet: "รายละเอียดเพิ่มเติม".to_string(),
    })]);
    let resolver = resolver(None, Some(Box::new(web.clone()))).await;

    let answer = resolver.resolve("สวัสดีครับ", "s1", None).await;

    assert!(answer.success);
    assert_eq!(answer.source, AnswerSource::GoogleFallback);
    assert_eq!(answer.google_link.as_deref(), Some("https://example.ac.th/faq"));
    assert!(answer.message.contains("ไม่พบคำตอบในฐานข้อมูลของเรา"));
    assert!(answer
        .message
        .contains(r#"<a href="https://example.ac.th/faq""#));
    assert!(answer.message.contains("— รายละเอียดเพิ่มเติม"));
    assert_eq!(answer.contacts.len(), 2);
    assert_eq!(*web.queries.read().unwrap(), vec!["สวัสดีครับ".to_string()]);

    // The wire shape stays camelCase with the kebab-case source tag.
    let value = serde_json::to_value(&answer)?;
    assert_eq!(value["source"], "google-fallback");
    assert!(value["messageCount"].is_number());
    assert!(value.get("databaseTitle").is_none());
    Ok(())
}

#[tokio::test]
async fn ai_generation_threads_the_session_history() -> Result<()> {
    setup_tracing();
    let ai = MockAiProvider::new(vec![
        "หอพักมีสองโซนค่ะ".to_string(),
        "โซนในเปิดรับสมัครก่อนค่ะ".to_string(),
    ]);
    let web = MockWebSearch::new(vec![None, None]);
    let resolver = resolver(Some(Box::new(ai.clone())), Some(Box::new(web))).await;

    let first = resolver.resolve("สวัสดีครับ", "s1", Some("หอพัก")).await;
    assert!(first.success);
    assert_eq!(first.source, AnswerSource::Ai);
    assert_eq!(first.message, "หอพักมีสองโซนค่ะ");
    assert_eq!(first.message_count, 2);

    let second = resolver.resolve("ขอบคุณครับ", "s1", None).await;
    assert_eq!(second.source, AnswerSource::Ai);
    assert_eq!(second.message_count, 4);

    let prompts = ai.call_history.read().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("หมวดหมู่ที่เกี่ยวข้อง: หอพัก"));
    assert!(prompts[1].contains("บทสนทนาก่อนหน้า"));
    assert!(prompts[1].contains("ผู้ใช้: สวัสดีครับ"));
    assert!(prompts[1].contains("ผู้ช่วย: หอพักมีสองโซนค่ะ"));
    Ok(())
}

#[tokio::test]
async fn terminal_apology_when_every_branch_fails() -> Result<()> {
    setup_tracing();
    let resolver = resolver(
        Some(Box::new(FailingAiProvider)),
        Some(Box::new(FailingWebSearch)),
    )
    .await;

    let answer = resolver.resolve("สวัสดีครับ", "s1", None).await;

    assert!(!answer.success);
    assert_eq!(answer.source, AnswerSource::Unanswered);
    assert_eq!(answer.message, TERMINAL_APOLOGY);
    assert!(answer.contacts.is_empty());
    assert_eq!(answer.message_count, 0);
    Ok(())
}

#[tokio::test]
async fn missing_collaborators_skip_to_the_terminal_apology() -> Result<()> {
    setup_tracing();
    let resolver = resolver(None, None).await;

    let answer = resolver.resolve("สวัสดีครับ", "s1", None).await;

    assert!(!answer.success);
    assert_eq!(answer.source, AnswerSource::Unanswered);
    Ok(())
}

#[tokio::test]
async fn contact_lookup_failure_never_blocks_the_answer() -> Result<()> {
    setup_tracing();
    let store = seeded_provider().await;
    store.initialize_with_data("DROP TABLE category_contacts").await?;
    let resolver = resolver_with_store(Arc::new(store), None, None);

    let answer = resolver.resolve("หอพัก", "s1", None).await;

    assert!(answer.success);
    assert_eq!(answer.source, AnswerSource::Database);
    assert_eq!(
        answer.message,
        "หอพักนักศึกษามีสองโซน เปิดรับสมัครก่อนเปิดภาคการศึกษาหนึ่งเดือน"
    );
    assert!(answer.contacts.is_empty());
    Ok(())
}
