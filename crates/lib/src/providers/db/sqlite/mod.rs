//! # SQLite Article Store
//!
//! A turso-backed implementation of [`ArticleStore`]. Use `":memory:"` for
//! an isolated in-memory database; clone the store to share one database
//! across tasks.

pub mod sql;

use crate::providers::db::store::{ArticleStore, StoreError};
use crate::types::{AppSettings, Article, Author};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::info;
use turso::{params, Connection, Database, Value as TursoValue};

const SETTINGS_KEY: &str = "app";
const SCHEMA_VERSION_KEY: &str = "schema_version";

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path`.
    pub async fn new(db_path: &str) -> Result<Self, StoreError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { db })
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        self.db
            .connect()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    /// Ensures all tables exist and the schema version is recorded. Safe to
    /// call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| StoreError::Operation(e.to_string()))?;
        }
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)",
            params![SCHEMA_VERSION_KEY, sql::SCHEMA_VERSION],
        )
        .await
        .map_err(|e| StoreError::Operation(e.to_string()))?;
        info!("article store schema initialized (v{})", sql::SCHEMA_VERSION);
        Ok(())
    }

    async fn document_by_id(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        let query = format!("SELECT document FROM {table} WHERE id = ?");
        let mut rows = conn
            .query(&query, params![id])
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;
        match rows
            .next()
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?
        {
            Some(row) => match row
                .get_value(0)
                .map_err(|e| StoreError::Operation(e.to_string()))?
            {
                TursoValue::Text(document) => Ok(Some(document)),
                _ => Err(StoreError::TypeConversion),
            },
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn save_article(&self, article: &Article) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let document = serde_json::to_string(article)?;
        conn.execute(
            "INSERT INTO articles (id, status, target_keyword, created_at, updated_at, document)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 status = excluded.status,
                 target_keyword = excluded.target_keyword,
                 updated_at = excluded.updated_at,
                 document = excluded.document",
            params![
                article.id.clone(),
                article.status.as_str(),
                article.request.target_keyword.clone(),
                article.created_at.to_rfc3339(),
                article.updated_at.to_rfc3339(),
                document
            ],
        )
        .await
        .map_err(|e| StoreError::Operation(e.to_string()))?;
        Ok(())
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        match self.document_by_id("articles", id).await? {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query("SELECT document FROM articles ORDER BY updated_at DESC", ())
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;
        let mut articles = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?
        {
            match row
                .get_value(0)
                .map_err(|e| StoreError::Operation(e.to_string()))?
            {
                TursoValue::Text(document) => articles.push(serde_json::from_str(&document)?),
                _ => return Err(StoreError::TypeConversion),
            }
        }
        Ok(articles)
    }

    async fn delete_article(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM articles WHERE id = ?", params![id])
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;
        Ok(())
    }

    async fn save_author(&self, author: &Author) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let document = serde_json::to_string(author)?;
        conn.execute(
            "INSERT INTO authors (id, name, document) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, document = excluded.document",
            params![author.id.clone(), author.name.clone(), document],
        )
        .await
        .map_err(|e| StoreError::Operation(e.to_string()))?;
        Ok(())
    }

    async fn get_author(&self, id: &str) -> Result<Option<Author>, StoreError> {
        match self.document_by_id("authors", id).await? {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    async fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query("SELECT document FROM authors ORDER BY name", ())
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;
        let mut authors = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?
        {
            match row
                .get_value(0)
                .map_err(|e| StoreError::Operation(e.to_string()))?
            {
                TursoValue::Text(document) => authors.push(serde_json::from_str(&document)?),
                _ => return Err(StoreError::TypeConversion),
            }
        }
        Ok(authors)
    }

    async fn load_settings(&self) -> Result<AppSettings, StoreError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT value FROM settings WHERE key = ?",
                params![SETTINGS_KEY],
            )
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;
        match rows
            .next()
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?
        {
            Some(row) => match row
                .get_value(0)
                .map_err(|e| StoreError::Operation(e.to_string()))?
            {
                TursoValue::Text(value) => Ok(serde_json::from_str(&value)?),
                _ => Err(StoreError::TypeConversion),
            },
            None => Ok(AppSettings::default()),
        }
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let value = serde_json::to_string(settings)?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SETTINGS_KEY, value],
        )
        .await
        .map_err(|e| StoreError::Operation(e.to_string()))?;
        Ok(())
    }
}
