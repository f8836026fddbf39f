#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared fixtures for the integration tests: a seeded in-memory knowledge
//! base and scripted AI / web-search collaborators, so tests are isolated
//! and repeatable.

use async_trait::async_trait;
use dotenvy::dotenv;
use faqbot::errors::ResolveError;
use faqbot::providers::ai::{AiProvider, ChatOptions, ChatReply};
use faqbot::providers::db::sqlite::SqliteProvider;
use faqbot::providers::web::{WebHit, WebSearchProvider};
use std::sync::{Arc, Once, RwLock};
use std::time::Duration;

#[cfg(test)]
static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
#[cfg(test)]
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

/// A small knowledge base in the shape admin tooling would produce.
pub const SEED_SQL: &str = "
    INSERT INTO qa_entries (id, title, body) VALUES
      (1, 'การลงทะเบียนเรียน', 'ลงทะเบียนเรียนได้ที่ระบบ reg.university.ac.th ภายในสัปดาห์แรกของภาคการศึกษา'),
      (2, 'หอพักนักศึกษา', 'หอพักนักศึกษามีสองโซน เปิดรับสมัครก่อนเปิดภาคการศึกษาหนึ่งเดือน'),
      (3, 'ตึกคณะวิศวกรรมศาสตร์', 'ตึกคณะวิศวกรรมศาสตร์อยู่ที่ 16.422083, 101.152533 ดูเส้นทางได้ที่ https://maps.app.goo.gl/abc123'),
      (4, 'ค่าเทอมและทุนการศึกษา', 'สอบถามค่าเทอมได้ที่กองคลัง และสอบถามทุนการศึกษาได้ที่กองพัฒนานักศึกษา'),
      (5, 'ตึกสำนักงานอธิการบดี', 'เปิดทำการจันทร์ถึงศุกร์ เวลา 08.30 น. ชั้น 1, 2 และ 3'),
      (6, 'วิทยาเขตต่างประเทศ', 'วิทยาเขตโตเกียวตั้งอยู่ที่ 35.689487, 139.691711 ประเทศญี่ปุ่น');

    INSERT INTO keywords (id, text) VALUES
      (1, 'ลงทะเบียนเรียน'),
      (2, 'หอพัก'),
      (3, 'วิศวะ'),
      (4, 'ทุนการศึกษา'),
      (5, 'ค่าเทอม'),
      (6, 'ทุนวิจัย'),
      (7, 'ทุนหอพัก'),
      (8, 'ไหม'),
      (9, 'โตเกียว');

    INSERT INTO entry_keywords (entry_id, keyword_id) VALUES
      (1, 1), (1, 8),
      (2, 2), (2, 7),
      (3, 3),
      (4, 4), (4, 5), (4, 6),
      (6, 9);

    INSERT INTO keyword_synonyms (input_word, target_keyword_id, similarity, is_active) VALUES
      ('reg', 1, 1.0, 1),
      ('dorm', 2, 0.9, 0),
      ('scholarship', 4, 0.8, 1),
      ('scholarship', 5, 0.3, 1);

    INSERT INTO negative_keywords (word) VALUES ('อะไร'), ('ไหม');

    INSERT INTO app_settings (key, value) VALUES
      ('LOCATION_QUERY_KEYWORDS', '[\"ตึก\", \"แผนที่\", \"ที่ตั้ง\"]');

    INSERT INTO category_contacts (organization, category, contact) VALUES
      ('กองคลัง', 'ค่าเทอม', 'โทร 042-091-234'),
      ('กองทะเบียนและประมวลผล', 'ลงทะเบียน', 'โทร 042-091-111');
";

/// Creates a fresh in-memory provider with the seed knowledge base.
pub async fn seeded_provider() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("in-memory database");
    provider.initialize_schema().await.expect("schema");
    provider.initialize_with_data(SEED_SQL).await.expect("seed");
    provider
}

// --- Mock AI Provider for Logic Testing ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<String>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn chat(&self, prompt: &str, _options: &ChatOptions) -> Result<ChatReply, ResolveError> {
        self.call_history.write().unwrap().push(prompt.to_string());

        if let Some(message) = self.responses.write().unwrap().pop() {
            Ok(ChatReply {
                message,
                usage: None,
            })
        } else {
            Ok(ChatReply {
                message: "Default mock response".to_string(),
                usage: None,
            })
        }
    }
}

/// An AI collaborator whose every call fails with an upstream error.
#[derive(Clone, Debug)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn chat(&self, _prompt: &str, _options: &ChatOptions) -> Result<ChatReply, ResolveError> {
        Err(ResolveError::AiApi("mock upstream failure".to_string()))
    }
}

/// An AI collaborator that answers only after `delay`, for deadline tests.
#[derive(Clone, Debug)]
pub struct SlowAiProvider {
    pub delay: Duration,
}

#[async_trait]
impl AiProvider for SlowAiProvider {
    async fn chat(&self, _prompt: &str, _options: &ChatOptions) -> Result<ChatReply, ResolveError> {
        tokio::time::sleep(self.delay).await;
        Ok(ChatReply {
            message: "คำตอบที่มาช้าเกินไป".to_string(),
            usage: None,
        })
    }
}

// --- Mock Web Search for Logic Testing ---

#[derive(Clone, Debug)]
pub struct MockWebSearch {
    pub queries: Arc<RwLock<Vec<String>>>,
    pub results: Arc<RwLock<Vec<Option<WebHit>>>>,
}

impl MockWebSearch {
    pub fn new(results: Vec<Option<WebHit>>) -> Self {
        Self {
            queries: Arc::new(RwLock::new(Vec::new())),
            results: Arc::new(RwLock::new(results.into_iter().rev().collect())),
        }
    }
}

#[async_trait]
impl WebSearchProvider for MockWebSearch {
    async fn top_result(&self, query: &str) -> Result<Option<WebHit>, ResolveError> {
        self.queries.write().unwrap().push(query.to_string());
        Ok(self.results.write().unwrap().pop().flatten())
    }
}

/// A web-search collaborator whose every call fails.
#[derive(Clone, Debug)]
pub struct FailingWebSearch;

#[async_trait]
impl WebSearchProvider for FailingWebSearch {
    async fn top_result(&self, _query: &str) -> Result<Option<WebHit>, ResolveError> {
        Err(ResolveError::WebSearchTimeout(Duration::from_secs(4)))
    }
}
