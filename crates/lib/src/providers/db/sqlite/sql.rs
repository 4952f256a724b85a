//! # SQLite Schema
//!
//! Centralizes the DDL for the article store. Records are kept as JSON
//! documents next to a few indexed columns; the document is the source of
//! truth, the columns exist for listing and filtering.

/// Bumped whenever the table shapes change; recorded in the settings table
/// at initialization so migrations have something to look at.
pub const SCHEMA_VERSION: &str = "1";

pub const CREATE_ARTICLES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        status TEXT NOT NULL,
        target_keyword TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        document TEXT NOT NULL
    );
";

pub const CREATE_ARTICLES_UPDATED_INDEX: &str = "
    CREATE INDEX IF NOT EXISTS idx_articles_updated_at ON articles (updated_at);
";

pub const CREATE_AUTHORS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS authors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        document TEXT NOT NULL
    );
";

pub const CREATE_SETTINGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// All idempotent creation statements, in execution order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_ARTICLES_TABLE,
    CREATE_ARTICLES_UPDATED_INDEX,
    CREATE_AUTHORS_TABLE,
    CREATE_SETTINGS_TABLE,
];
