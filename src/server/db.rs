//! SQLite pool setup and schema migrations.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Executor;
use std::time::Duration;
use tracing::info;

/// Open the SQLite pool. Writes serialize inside SQLite anyway; the pool
/// size mostly governs concurrent readers.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .max_lifetime(Duration::from_secs(1800))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
        .with_context(|| format!("opening database at {database_url}"))
}

const CREATE_PERSONAS: &str = r#"
CREATE TABLE IF NOT EXISTS personas (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    system_prompt TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Singleton row: the CHECK pins the id so a second row can never appear.
const CREATE_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    id TEXT PRIMARY KEY CHECK (id = '1'),
    temperature REAL NOT NULL,
    max_tokens INTEGER NOT NULL,
    rotation_interval INTEGER NOT NULL,
    model_name TEXT NOT NULL,
    selected_persona_id TEXT REFERENCES personas(id),
    last_rotation DATETIME
);
"#;

const CREATE_CONVERSATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    persona_id TEXT REFERENCES personas(id),
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    persona_id TEXT REFERENCES personas(id),
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Append-only log of persona rotations applied to a conversation.
const CREATE_PERSONA_CHANGES: &str = r#"
CREATE TABLE IF NOT EXISTS persona_changes (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    from_persona_id TEXT REFERENCES personas(id),
    to_persona_id TEXT NOT NULL REFERENCES personas(id),
    changed_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Free-form admin key/value rows (base instructions, UI copy).
const CREATE_ADMIN_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS admin_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    description TEXT,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_personas_is_active ON personas(is_active);
CREATE INDEX IF NOT EXISTS idx_conversations_created_at ON conversations(created_at);
CREATE INDEX IF NOT EXISTS idx_conversations_username ON conversations(username);
CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id);
CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
CREATE INDEX IF NOT EXISTS idx_messages_persona_id ON messages(persona_id);
CREATE INDEX IF NOT EXISTS idx_persona_changes_conversation_id ON persona_changes(conversation_id);
"#;

/// Runs all required migrations for the SQLite backend.
/// Safe to call at every startup (idempotent).
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    pool.execute(CREATE_PERSONAS).await?;
    pool.execute(CREATE_SETTINGS).await?;
    pool.execute(CREATE_CONVERSATIONS).await?;
    pool.execute(CREATE_MESSAGES).await?;
    pool.execute(CREATE_PERSONA_CHANGES).await?;
    pool.execute(CREATE_ADMIN_SETTINGS).await?;
    pool.execute(CREATE_INDICES).await?;

    info!("Migrations complete");
    Ok(())
}
