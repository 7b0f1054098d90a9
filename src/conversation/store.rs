// src/conversation/store.rs

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::conversation::types::{
    Conversation, ConversationDetail, ConversationFilter, Message, MessageView, PersonaChange,
    PersonaChangeView, Role,
};
use crate::persona::PersonaRef;

#[derive(Clone)]
pub struct ConversationStore {
    pub pool: SqlitePool,
}

impl ConversationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---- Conversations ----

    pub async fn create(
        &self,
        username: String,
        persona_id: Option<String>,
    ) -> Result<Conversation> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO conversations (id, username, persona_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&username)
        .bind(&persona_id)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(Conversation {
            id,
            username,
            persona_id,
            created_at: now,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT id, username, persona_id, created_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_conversation).transpose()
    }

    pub async fn set_persona(&self, id: &str, persona_id: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE conversations SET persona_id = ? WHERE id = ?")
            .bind(persona_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Page of conversations matching the filter, newest first.
    pub async fn list(
        &self,
        filter: &ConversationFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Conversation>, i64)> {
        let start = filter.start.map(|d| d.naive_utc());
        let end = filter.end.map(|d| d.naive_utc());
        let offset = (page.max(1) - 1) * page_size;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM conversations
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
              AND (?3 IS NULL OR username LIKE '%' || ?3 || '%')
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(&filter.search)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, username, persona_id, created_at FROM conversations
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
              AND (?3 IS NULL OR username LIKE '%' || ?3 || '%')
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(&filter.search)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let conversations = rows
            .into_iter()
            .map(row_to_conversation)
            .collect::<Result<Vec<_>>>()?;

        Ok((conversations, total))
    }

    /// Conversation with messages and persona changes joined with persona
    /// names; optional date window narrows the embedded rows (export).
    pub async fn detail(
        &self,
        conversation: Conversation,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<ConversationDetail> {
        let messages = self.message_views(&conversation.id, start, end).await?;
        let persona_changes = self.change_views(&conversation.id, start, end).await?;

        Ok(ConversationDetail {
            id: conversation.id,
            username: conversation.username,
            persona_id: conversation.persona_id,
            created_at: conversation.created_at,
            messages,
            persona_changes,
        })
    }

    async fn message_views(
        &self,
        conversation_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageView>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.role, m.content, m.created_at, m.persona_id, p.name AS persona_name
            FROM messages m
            LEFT JOIN personas p ON p.id = m.persona_id
            WHERE m.conversation_id = ?1
              AND (?2 IS NULL OR m.created_at >= ?2)
              AND (?3 IS NULL OR m.created_at <= ?3)
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(conversation_id)
        .bind(start.map(|d| d.naive_utc()))
        .bind(end.map(|d| d.naive_utc()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let created_at: NaiveDateTime = row.get("created_at");
                let role: String = row.get("role");
                let persona = persona_ref(
                    row.get::<Option<String>, _>("persona_id"),
                    row.get::<Option<String>, _>("persona_name"),
                );
                Ok(MessageView {
                    id: row.get("id"),
                    role: Role::from_str(&role)?,
                    content: row.get("content"),
                    created_at: Utc.from_utc_datetime(&created_at),
                    persona,
                })
            })
            .collect()
    }

    async fn change_views(
        &self,
        conversation_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<PersonaChangeView>> {
        let rows = sqlx::query(
            r#"
            SELECT c.changed_at, fp.name AS from_name, tp.name AS to_name
            FROM persona_changes c
            LEFT JOIN personas fp ON fp.id = c.from_persona_id
            LEFT JOIN personas tp ON tp.id = c.to_persona_id
            WHERE c.conversation_id = ?1
              AND (?2 IS NULL OR c.changed_at >= ?2)
              AND (?3 IS NULL OR c.changed_at <= ?3)
            ORDER BY c.changed_at ASC
            "#,
        )
        .bind(conversation_id)
        .bind(start.map(|d| d.naive_utc()))
        .bind(end.map(|d| d.naive_utc()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let changed_at: NaiveDateTime = row.get("changed_at");
                let from = row
                    .get::<Option<String>, _>("from_name")
                    .unwrap_or_else(|| "none".to_string());
                let to = row
                    .get::<Option<String>, _>("to_name")
                    .unwrap_or_else(|| "Unknown".to_string());
                Ok(PersonaChangeView {
                    timestamp: Utc.from_utc_datetime(&changed_at),
                    from,
                    to,
                })
            })
            .collect()
    }

    /// Delete messages, persona changes, then conversations in the window.
    pub async fn clear(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let start = start.map(|d| d.naive_utc());
        let end = end.map(|d| d.naive_utc());

        sqlx::query(
            r#"
            DELETE FROM messages WHERE conversation_id IN (
                SELECT id FROM conversations
                WHERE (?1 IS NULL OR created_at >= ?1)
                  AND (?2 IS NULL OR created_at <= ?2)
            )
            "#,
        )
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM persona_changes WHERE conversation_id IN (
                SELECT id FROM conversations
                WHERE (?1 IS NULL OR created_at >= ?1)
                  AND (?2 IS NULL OR created_at <= ?2)
            )
            "#,
        )
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM conversations
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ---- Messages ----

    pub async fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: String,
        persona_id: Option<String>,
    ) -> Result<Message> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, persona_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(&content)
        .bind(&persona_id)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(Message {
            id,
            conversation_id: conversation_id.to_string(),
            role,
            content,
            persona_id,
            created_at: now,
        })
    }

    /// Full message history, oldest first.
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, persona_id, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_message).collect()
    }

    // ---- Persona changes ----

    pub async fn record_persona_change(
        &self,
        conversation_id: &str,
        from_persona_id: Option<&str>,
        to_persona_id: &str,
    ) -> Result<PersonaChange> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO persona_changes (id, conversation_id, from_persona_id, to_persona_id, changed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(from_persona_id)
        .bind(to_persona_id)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(PersonaChange {
            id,
            conversation_id: conversation_id.to_string(),
            from_persona_id: from_persona_id.map(str::to_string),
            to_persona_id: to_persona_id.to_string(),
            changed_at: now,
        })
    }

    pub async fn persona_changes(&self, conversation_id: &str) -> Result<Vec<PersonaChangeView>> {
        self.change_views(conversation_id, None, None).await
    }
}

fn persona_ref(id: Option<String>, name: Option<String>) -> Option<PersonaRef> {
    id.map(|id| PersonaRef {
        id,
        name: name.unwrap_or_else(|| "Unknown".to_string()),
    })
}

fn row_to_conversation(row: sqlx::sqlite::SqliteRow) -> Result<Conversation> {
    let created_at: NaiveDateTime = row.get("created_at");

    Ok(Conversation {
        id: row.get("id"),
        username: row.get("username"),
        persona_id: row.get("persona_id"),
        created_at: Utc.from_utc_datetime(&created_at),
    })
}

fn row_to_message(row: sqlx::sqlite::SqliteRow) -> Result<Message> {
    let created_at: NaiveDateTime = row.get("created_at");
    let role: String = row.get("role");

    Ok(Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        role: Role::from_str(&role)?,
        content: row.get("content"),
        persona_id: row.get("persona_id"),
        created_at: Utc.from_utc_datetime(&created_at),
    })
}
