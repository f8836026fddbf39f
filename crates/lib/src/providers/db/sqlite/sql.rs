//! # SQLite Specific SQL
//!
//! Centralizes DDL and query strings for the SQLite provider, isolating
//! database-specific syntax from the retrieval logic.

/// Schema of the knowledge base as this crate reads it. Admin tooling owns
/// the content; these statements only guarantee the tables exist.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS qa_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        body TEXT NOT NULL DEFAULT ''
    );",
    "CREATE TABLE IF NOT EXISTS keywords (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL UNIQUE
    );",
    "CREATE TABLE IF NOT EXISTS entry_keywords (
        entry_id INTEGER NOT NULL,
        keyword_id INTEGER NOT NULL,
        PRIMARY KEY (entry_id, keyword_id)
    );",
    "CREATE TABLE IF NOT EXISTS keyword_synonyms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        input_word TEXT NOT NULL,
        target_keyword_id INTEGER NOT NULL,
        similarity REAL NOT NULL DEFAULT 1.0,
        is_active INTEGER NOT NULL DEFAULT 1
    );",
    "CREATE TABLE IF NOT EXISTS negative_keywords (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL UNIQUE
    );",
    "CREATE TABLE IF NOT EXISTS app_settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS category_contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        organization TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        contact TEXT NOT NULL DEFAULT ''
    );",
    "CREATE INDEX IF NOT EXISTS idx_entry_keywords_keyword ON entry_keywords (keyword_id);",
    "CREATE INDEX IF NOT EXISTS idx_keyword_synonyms_input ON keyword_synonyms (input_word);",
];

/// Ranked keyword match: distinct matching keywords per entry, best first.
/// The first parameter is the `%token%` pattern; `negative_placeholders`
/// excludes the negative set from scoring when non-empty.
pub fn keyword_match(negative_placeholders: &str) -> String {
    let exclusion = if negative_placeholders.is_empty() {
        String::new()
    } else {
        format!("AND LOWER(k.text) NOT IN ({negative_placeholders})")
    };
    format!(
        "SELECT qa.id, qa.title, qa.body, COUNT(DISTINCT k.id) AS keyword_count
         FROM qa_entries qa
         JOIN entry_keywords ek ON qa.id = ek.entry_id
         JOIN keywords k ON ek.keyword_id = k.id
         WHERE LOWER(k.text) LIKE ? {exclusion}
         GROUP BY qa.id
         ORDER BY keyword_count DESC
         LIMIT 1;"
    )
}

/// Distinct keyword texts of one entry, optionally restricted to those
/// containing the matched token and excluding the negative set.
pub fn keywords_of_entry(with_token_filter: bool, negative_placeholders: &str) -> String {
    let token_filter = if with_token_filter {
        "AND LOWER(k.text) LIKE ?"
    } else {
        ""
    };
    let exclusion = if negative_placeholders.is_empty() {
        String::new()
    } else {
        format!("AND LOWER(k.text) NOT IN ({negative_placeholders})")
    };
    format!(
        "SELECT DISTINCT k.text
         FROM keywords k
         JOIN entry_keywords ek ON k.id = ek.keyword_id
         WHERE ek.entry_id = ? {token_filter} {exclusion}
         ORDER BY k.text;"
    )
}

/// Navigation candidates: optional title filter plus a rough body
/// pre-filter for map links or decimal pairs. Final validation happens in
/// Rust against the real patterns; the LIMIT keeps the candidate set small.
pub fn navigation_candidates(title_placeholders: &str) -> String {
    let title_filter = if title_placeholders.is_empty() {
        String::new()
    } else {
        format!("({title_placeholders}) AND")
    };
    format!(
        "SELECT qa.id, qa.title, qa.body
         FROM qa_entries qa
         WHERE {title_filter} (
             qa.body LIKE '%maps.app.goo.gl%'
             OR qa.body LIKE '%maps.google%'
             OR qa.body LIKE '%goo.gl/maps%'
             OR qa.body LIKE '%google.com/maps%'
             OR (qa.body LIKE '%.%' AND qa.body LIKE '%,%')
         )
         ORDER BY qa.id DESC
         LIMIT 20;"
    )
}

/// Full-message substring match over title and body, store-default order.
pub const FULLTEXT_MATCH: &str = "SELECT qa.id, qa.title, qa.body
     FROM qa_entries qa
     WHERE LOWER(qa.title || ' ' || qa.body) LIKE ?
     LIMIT 1;";

pub const NEGATIVE_KEYWORDS: &str = "SELECT word FROM negative_keywords ORDER BY word;";

/// Active synonym with the highest similarity for an input word.
pub const RESOLVE_SYNONYM: &str = "SELECT k.text
     FROM keyword_synonyms s
     JOIN keywords k ON s.target_keyword_id = k.id
     WHERE s.is_active = 1 AND LOWER(s.input_word) = ?
     ORDER BY s.similarity DESC
     LIMIT 1;";

pub const ENTRIES_FOR_KEYWORD: &str = "SELECT DISTINCT qa.id, qa.title
     FROM qa_entries qa
     JOIN entry_keywords ek ON qa.id = ek.entry_id
     JOIN keywords k ON ek.keyword_id = k.id
     WHERE LOWER(k.text) LIKE ?
     ORDER BY qa.id;";

pub const READ_SETTING: &str = "SELECT value FROM app_settings WHERE key = ? LIMIT 1;";

pub const LIST_CONTACTS: &str = "SELECT organization, category, contact
     FROM category_contacts
     ORDER BY organization, category;";

/// A small demonstration knowledge base for `faqbot init --demo` and local
/// experiments. Explicit ids plus `OR IGNORE` keep re-seeding idempotent.
pub const DEMO_SEED_SQL: &str = "
INSERT OR IGNORE INTO qa_entries (id, title, body) VALUES
    (1, 'การลงทะเบียนเรียนล่าช้า', 'นักศึกษาสามารถลงทะเบียนเรียนล่าช้าได้ภายในสองสัปดาห์แรกของภาคการศึกษา ผ่านระบบ reg.university.ac.th โดยมีค่าปรับวันละ 50 บาท');
INSERT OR IGNORE INTO qa_entries (id, title, body) VALUES
    (2, 'หอพักนักศึกษา', 'หอพักภายในมหาวิทยาลัยเปิดรับสมัครก่อนเปิดภาคการศึกษาหนึ่งเดือน ติดต่อกองพัฒนานักศึกษาเพื่อจองห้องพัก');
INSERT OR IGNORE INTO qa_entries (id, title, body) VALUES
    (3, 'ที่ตั้งอาคารสำนักงานอธิการบดี', 'อาคารสำนักงานอธิการบดีอยู่ที่ 16.246825, 103.251846 ดูเส้นทางได้ที่ https://maps.app.goo.gl/Xk2mQ9');
INSERT OR IGNORE INTO qa_entries (id, title, body) VALUES
    (4, 'ทุนการศึกษาสำหรับนักศึกษาใหม่', 'มหาวิทยาลัยมีทุนการศึกษาหลายประเภท ทั้งทุนเรียนดีและทุนขาดแคลน สอบถามได้ที่กองกิจการนักศึกษา');
INSERT OR IGNORE INTO qa_entries (id, title, body) VALUES
    (5, 'ปฏิทินการศึกษา', 'ภาคการศึกษาที่ 1 เปิดเรียนวันที่ 2025-06-16 และสอบปลายภาควันที่ 2025-10-20');
INSERT OR IGNORE INTO keywords (id, text) VALUES (1, 'ลงทะเบียน');
INSERT OR IGNORE INTO keywords (id, text) VALUES (2, 'หอพัก');
INSERT OR IGNORE INTO keywords (id, text) VALUES (3, 'อธิการบดี');
INSERT OR IGNORE INTO keywords (id, text) VALUES (4, 'ทุนการศึกษา');
INSERT OR IGNORE INTO keywords (id, text) VALUES (5, 'ปฏิทินการศึกษา');
INSERT OR IGNORE INTO keywords (id, text) VALUES (6, 'ค่าปรับ');
INSERT OR IGNORE INTO entry_keywords (entry_id, keyword_id) VALUES (1, 1);
INSERT OR IGNORE INTO entry_keywords (entry_id, keyword_id) VALUES (1, 6);
INSERT OR IGNORE INTO entry_keywords (entry_id, keyword_id) VALUES (2, 2);
INSERT OR IGNORE INTO entry_keywords (entry_id, keyword_id) VALUES (3, 3);
INSERT OR IGNORE INTO entry_keywords (entry_id, keyword_id) VALUES (4, 4);
INSERT OR IGNORE INTO entry_keywords (entry_id, keyword_id) VALUES (5, 5);
INSERT OR IGNORE INTO keyword_synonyms (id, input_word, target_keyword_id, similarity, is_active) VALUES (1, 'reg', 1, 1.0, 1);
INSERT OR IGNORE INTO keyword_synonyms (id, input_word, target_keyword_id, similarity, is_active) VALUES (2, 'dorm', 2, 0.9, 1);
INSERT OR IGNORE INTO keyword_synonyms (id, input_word, target_keyword_id, similarity, is_active) VALUES (3, 'scholarship', 4, 0.8, 1);
INSERT OR IGNORE INTO negative_keywords (id, word) VALUES (1, 'อะไร');
INSERT OR IGNORE INTO negative_keywords (id, word) VALUES (2, 'ไหม');
INSERT OR IGNORE INTO app_settings (key, value) VALUES
    ('LOCATION_QUERY_KEYWORDS', '[\"ตึก\", \"อาคาร\", \"แผนที่\", \"ที่ตั้ง\"]');
INSERT OR IGNORE INTO category_contacts (id, organization, category, contact) VALUES
    (1, 'กองทะเบียนและประมวลผล', 'ลงทะเบียน', '043-754-333 ต่อ 1201');
INSERT OR IGNORE INTO category_contacts (id, organization, category, contact) VALUES
    (2, 'กองพัฒนานักศึกษา', 'หอพัก', 'dorm@university.ac.th');
";
