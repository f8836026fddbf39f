use crate::{
    errors::ResolveError,
    providers::db::storage::{
        ContactLookup, EntrySearch, KeywordCatalog, ScoredEntry, SettingsRead,
    },
    types::{Contact, EntryRef, FaqEntry},
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::debug;
use turso::{Database, Value as TursoValue};

mod sql;

pub use sql::ALL_TABLE_CREATION_SQL;

/// A provider for the knowledge base stored in a local SQLite database.
///
/// Holds a `Database` instance, which manages a connection pool. Clones
/// share the same underlying database, so one in-memory instance can back
/// several components (or several test actors) at once.
#[derive(Clone)]
pub struct SqliteProvider {
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// Use ":memory:" for a unique, isolated in-memory database. To share
    /// an in-memory database across components, create one provider and
    /// `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, ResolveError> {
        let db = turso::Builder::new_local(db_path).build().await?;

        // WAL helps concurrent readers on file-backed databases and is a
        // no-op in memory. PRAGMA returns a row, so `query` it.
        let conn = db.connect()?;
        conn.query("PRAGMA journal_mode=WAL;", ()).await?;

        Ok(Self { db })
    }

    /// Ensures the knowledge-base tables exist. Idempotent; safe to call on
    /// every startup.
    pub async fn initialize_schema(&self) -> Result<(), ResolveError> {
        let conn = self.db.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    /// Executes multiple semicolon-separated statements. Used by tests and
    /// the CLI to seed data.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), ResolveError> {
        let conn = self.db.connect()?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    /// Seeds a small demonstration knowledge base. Safe to re-run.
    pub async fn seed_demo_data(&self) -> Result<(), ResolveError> {
        self.initialize_with_data(sql::DEMO_SEED_SQL).await
    }

    /// Reads keyword texts for one entry, optionally restricted to keywords
    /// containing `token`, always excluding the negative set.
    async fn keywords_of_entry(
        &self,
        entry_id: i64,
        token: Option<&str>,
        negatives: &[String],
    ) -> Result<Vec<String>, ResolveError> {
        let conn = self.db.connect()?;
        let placeholders = negative_placeholders(negatives);
        let query = sql::keywords_of_entry(token.is_some(), &placeholders);

        let mut params: Vec<TursoValue> = vec![entry_id.into()];
        if let Some(token) = token {
            params.push(like_pattern(token).into());
        }
        params.extend(lowercased(negatives));

        let mut rows = conn.query(&query, params).await?;
        let mut keywords = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Ok(TursoValue::Text(text)) = row.get_value(0) {
                keywords.push(text);
            }
        }
        Ok(keywords)
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

fn like_pattern(token: &str) -> String {
    format!("%{}%", token.to_lowercase())
}

fn lowercased(words: &[String]) -> Vec<TursoValue> {
    words.iter().map(|w| w.to_lowercase().into()).collect()
}

fn negative_placeholders(negatives: &[String]) -> String {
    negatives.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
}

fn row_text(row: &turso::Row, index: usize) -> Result<String, ResolveError> {
    Ok(match row.get_value(index)? {
        TursoValue::Text(s) => s,
        _ => String::new(),
    })
}

fn row_i64(row: &turso::Row, index: usize) -> Result<i64, ResolveError> {
    Ok(match row.get_value(index)? {
        TursoValue::Integer(i) => i,
        _ => 0,
    })
}

fn row_entry(row: &turso::Row) -> Result<FaqEntry, ResolveError> {
    Ok(FaqEntry {
        id: row_i64(row, 0)?,
        title: row_text(row, 1)?,
        body: row_text(row, 2)?,
    })
}

#[async_trait]
impl EntrySearch for SqliteProvider {
    async fn navigation_candidates(
        &self,
        title_terms: &[String],
    ) -> Result<Vec<FaqEntry>, ResolveError> {
        let conn = self.db.connect()?;

        let title_filter = title_terms
            .iter()
            .map(|_| "LOWER(qa.title) LIKE ?")
            .collect::<Vec<_>>()
            .join(" OR ");
        let query = sql::navigation_candidates(&title_filter);
        let params: Vec<TursoValue> = title_terms
            .iter()
            .map(|term| like_pattern(term).into())
            .collect();

        debug!(terms = ?title_terms, "running navigation candidate query");
        let mut rows = if params.is_empty() {
            conn.query(&query, ()).await?
        } else {
            conn.query(&query, params).await?
        };

        let mut candidates = Vec::new();
        while let Some(row) = rows.next().await? {
            candidates.push(row_entry(&row)?);
        }
        Ok(candidates)
    }

    async fn keyword_match(
        &self,
        token: &str,
        negatives: &[String],
    ) -> Result<Option<ScoredEntry>, ResolveError> {
        let conn = self.db.connect()?;
        let query = sql::keyword_match(&negative_placeholders(negatives));

        let mut params: Vec<TursoValue> = vec![like_pattern(token).into()];
        params.extend(lowercased(negatives));

        let mut rows = conn.query(&query, params).await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let entry = row_entry(&row)?;
        let keyword_count = row_i64(&row, 3)?;
        let keywords = self
            .keywords_of_entry(entry.id, Some(token), negatives)
            .await?;
        Ok(Some(ScoredEntry {
            entry,
            keywords,
            keyword_count,
        }))
    }

    async fn fulltext_match(&self, message: &str) -> Result<Option<ScoredEntry>, ResolveError> {
        let conn = self.db.connect()?;

        let mut rows = conn
            .query(
                sql::FULLTEXT_MATCH,
                vec![TursoValue::Text(like_pattern(message))],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let entry = row_entry(&row)?;
        let keywords = self.keywords_of_entry(entry.id, None, &[]).await?;
        let keyword_count = keywords.len() as i64;
        Ok(Some(ScoredEntry {
            entry,
            keywords,
            keyword_count,
        }))
    }
}

#[async_trait]
impl KeywordCatalog for SqliteProvider {
    async fn negative_keywords(&self) -> Result<Vec<String>, ResolveError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::NEGATIVE_KEYWORDS, ()).await?;
        let mut words = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Ok(TursoValue::Text(word)) = row.get_value(0) {
                words.push(word);
            }
        }
        Ok(words)
    }

    async fn resolve_synonym(&self, token: &str) -> Result<Option<String>, ResolveError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                sql::RESOLVE_SYNONYM,
                vec![TursoValue::Text(token.to_lowercase())],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_text(&row, 0)?)),
            None => Ok(None),
        }
    }

    async fn entries_for_keyword(&self, token: &str) -> Result<Vec<EntryRef>, ResolveError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                sql::ENTRIES_FOR_KEYWORD,
                vec![TursoValue::Text(like_pattern(token))],
            )
            .await?;
        let mut refs = Vec::new();
        while let Some(row) = rows.next().await? {
            refs.push(EntryRef {
                id: row_i64(&row, 0)?,
                title: row_text(&row, 1)?,
            });
        }
        Ok(refs)
    }
}

#[async_trait]
impl SettingsRead for SqliteProvider {
    async fn setting(&self, key: &str) -> Result<Option<String>, ResolveError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(sql::READ_SETTING, vec![TursoValue::Text(key.to_string())])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_text(&row, 0)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ContactLookup for SqliteProvider {
    async fn contacts(&self) -> Result<Vec<Contact>, ResolveError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::LIST_CONTACTS, ()).await?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next().await? {
            contacts.push(Contact {
                organization: row_text(&row, 0)?,
                category: row_text(&row, 1)?,
                contact: row_text(&row, 2)?,
            });
        }
        Ok(contacts)
    }
}
