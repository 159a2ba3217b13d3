//! Article and sentiment storage
//!
//! SQLite-backed persistence for deduplicated articles and their
//! sentiment history. One database holds both tables; deleting an
//! article cascades to its sentiments. Timestamps are stored as epoch
//! milliseconds.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use pulse_core::{Article, Sentiment, SentimentLabel};

/// SQLite-backed store for articles and sentiments
pub struct NewsStorage {
    conn: Mutex<Connection>,
}

impl NewsStorage {
    /// Open (or create) the database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Io(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(&db_path).map_err(StorageError::Database)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;

        info!("Initialized news storage at: {}", db_path.as_ref().display());
        Ok(storage)
    }

    /// Create an in-memory store (useful for testing).
    pub fn new_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::Database)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                title TEXT,
                url TEXT UNIQUE,
                summary TEXT,
                content TEXT,
                source TEXT,
                category TEXT,
                published_at INTEGER NOT NULL,
                fetched_at INTEGER NOT NULL,
                image_url TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_articles_fetched
            ON articles(fetched_at DESC);

            CREATE TABLE IF NOT EXISTS sentiments (
                id TEXT PRIMARY KEY,
                article_id TEXT NOT NULL
                    REFERENCES articles(id) ON DELETE CASCADE,
                label TEXT NOT NULL,
                score REAL NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sentiments_article
            ON sentiments(article_id, created_at DESC);
            "#,
        )
        .map_err(StorageError::Database)?;

        Ok(())
    }

    /// Save an article, assigning an identity on first save.
    ///
    /// Idempotent for an existing identity: re-saving updates the row in
    /// place (a plain REPLACE would delete-and-reinsert, cascading away
    /// the article's sentiments).
    pub fn save_article(&self, article: &Article) -> Result<Article, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut saved = article.clone();
        if saved.id.is_nil() {
            saved.id = Uuid::new_v4();
        }

        conn.execute(
            r#"
            INSERT INTO articles
                (id, title, url, summary, content, source, category, published_at, fetched_at, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                url = excluded.url,
                summary = excluded.summary,
                content = excluded.content,
                source = excluded.source,
                category = excluded.category,
                published_at = excluded.published_at,
                fetched_at = excluded.fetched_at,
                image_url = excluded.image_url
            "#,
            params![
                saved.id.to_string(),
                saved.title,
                saved.url,
                saved.summary,
                saved.content,
                saved.source,
                saved.category,
                saved.published_at.timestamp_millis(),
                saved.fetched_at.timestamp_millis(),
                saved.image_url,
            ],
        )
        .map_err(StorageError::Database)?;

        Ok(saved)
    }

    /// Look up an article by exact URL.
    pub fn find_article_by_url(&self, url: &str) -> Result<Option<Article>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM articles WHERE url = ?1",
                ARTICLE_COLUMNS
            ))
            .map_err(StorageError::Database)?;

        stmt.query_row(params![url], article_from_row)
            .optional()
            .map_err(StorageError::Database)
    }

    /// Look up an article by identity.
    pub fn find_article_by_id(&self, id: Uuid) -> Result<Option<Article>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM articles WHERE id = ?1",
                ARTICLE_COLUMNS
            ))
            .map_err(StorageError::Database)?;

        stmt.query_row(params![id.to_string()], article_from_row)
            .optional()
            .map_err(StorageError::Database)
    }

    /// All stored articles.
    pub fn list_articles(&self) -> Result<Vec<Article>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM articles", ARTICLE_COLUMNS))
            .map_err(StorageError::Database)?;

        let articles = stmt
            .query_map([], article_from_row)
            .map_err(StorageError::Database)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(articles)
    }

    /// The most recently fetched articles, newest first.
    pub fn list_recent_articles(&self, count: usize) -> Result<Vec<Article>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM articles ORDER BY fetched_at DESC LIMIT ?1",
                ARTICLE_COLUMNS
            ))
            .map_err(StorageError::Database)?;

        let articles = stmt
            .query_map(params![count as i64], article_from_row)
            .map_err(StorageError::Database)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(articles)
    }

    /// Number of stored articles.
    pub fn count_articles(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
            .map_err(StorageError::Database)?;

        Ok(count as usize)
    }

    /// Delete an article (cascades to its sentiments). Administrative
    /// path; the ingestion pipeline never deletes.
    pub fn delete_article(&self, id: Uuid) -> Result<bool, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let deleted = conn
            .execute("DELETE FROM articles WHERE id = ?1", params![id.to_string()])
            .map_err(StorageError::Database)?;

        Ok(deleted > 0)
    }

    /// Save a sentiment row, assigning an identity on first save.
    /// Re-saving an existing identity updates the row in place.
    pub fn save_sentiment(&self, sentiment: &Sentiment) -> Result<Sentiment, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut saved = sentiment.clone();
        if saved.id.is_nil() {
            saved.id = Uuid::new_v4();
        }

        conn.execute(
            r#"
            INSERT INTO sentiments (id, article_id, label, score, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                label = excluded.label,
                score = excluded.score,
                created_at = excluded.created_at
            "#,
            params![
                saved.id.to_string(),
                saved.article_id.to_string(),
                saved.label.as_str(),
                saved.score,
                saved.created_at.timestamp_millis(),
            ],
        )
        .map_err(StorageError::Database)?;

        Ok(saved)
    }

    /// The most recently created sentiment for an article, if any.
    pub fn latest_sentiment_for_article(
        &self,
        article_id: Uuid,
    ) -> Result<Option<Sentiment>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn
            .prepare(
                r#"
                SELECT id, article_id, label, score, created_at
                FROM sentiments
                WHERE article_id = ?1
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                "#,
            )
            .map_err(StorageError::Database)?;

        stmt.query_row(params![article_id.to_string()], sentiment_from_row)
            .optional()
            .map_err(StorageError::Database)
    }

    /// All sentiments for an article, newest first.
    pub fn sentiments_for_article(
        &self,
        article_id: Uuid,
    ) -> Result<Vec<Sentiment>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn
            .prepare(
                r#"
                SELECT id, article_id, label, score, created_at
                FROM sentiments
                WHERE article_id = ?1
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .map_err(StorageError::Database)?;

        let sentiments = stmt
            .query_map(params![article_id.to_string()], sentiment_from_row)
            .map_err(StorageError::Database)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(sentiments)
    }
}

const ARTICLE_COLUMNS: &str =
    "id, title, url, summary, content, source, category, published_at, fetched_at, image_url";

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let id: String = row.get(0)?;
    let published_at: i64 = row.get(7)?;
    let fetched_at: i64 = row.get(8)?;

    Ok(Article {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        title: row.get(1)?,
        url: row.get(2)?,
        summary: row.get(3)?,
        content: row.get(4)?,
        source: row.get(5)?,
        category: row.get(6)?,
        published_at: millis_to_datetime(published_at),
        fetched_at: millis_to_datetime(fetched_at),
        image_url: row.get(9)?,
    })
}

fn sentiment_from_row(row: &Row<'_>) -> rusqlite::Result<Sentiment> {
    let id: String = row.get(0)?;
    let article_id: String = row.get(1)?;
    let label: String = row.get(2)?;
    let created_at: i64 = row.get(4)?;

    Ok(Sentiment {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        article_id: Uuid::parse_str(&article_id).unwrap_or_default(),
        label: SentimentLabel::from_stored(&label),
        score: row.get(3)?,
        created_at: millis_to_datetime(created_at),
    })
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to acquire lock")]
    LockError,
}
