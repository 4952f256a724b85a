//! # Storage Boundary
//!
//! The persistence trait the pipeline and server work against. The concrete
//! implementation is the turso-backed [`super::sqlite::SqliteStore`]; tests
//! use the same implementation against an in-memory database.

use crate::types::{AppSettings, Article, Author};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage connection error: {0}")]
    Connection(String),
    #[error("Storage operation failed: {0}")]
    Operation(String),
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to convert database value: expected text, found other type.")]
    TypeConversion,
}

/// Persistence for articles, authors and settings.
#[async_trait]
pub trait ArticleStore: Send + Sync + Debug {
    async fn save_article(&self, article: &Article) -> Result<(), StoreError>;
    async fn get_article(&self, id: &str) -> Result<Option<Article>, StoreError>;
    async fn list_articles(&self) -> Result<Vec<Article>, StoreError>;
    async fn delete_article(&self, id: &str) -> Result<(), StoreError>;

    async fn save_author(&self, author: &Author) -> Result<(), StoreError>;
    async fn get_author(&self, id: &str) -> Result<Option<Author>, StoreError>;
    async fn list_authors(&self) -> Result<Vec<Author>, StoreError>;

    async fn load_settings(&self) -> Result<AppSettings, StoreError>;
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError>;
}
