// src/conversation/stats.rs
//! Aggregate queries over conversations and messages, backing the admin
//! stats and dashboard endpoints. Day/hour bucketing happens in SQL; the
//! handlers zero-fill the gaps.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;

use crate::conversation::ConversationStore;

/// Assistant-message count per persona name.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaUsage {
    pub name: String,
    pub usage: i64,
}

/// Count for one day ("YYYY-MM-DD") or hour ("YYYY-MM-DDTHH:00") bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BucketCount {
    pub date: String,
    pub count: i64,
}

impl ConversationStore {
    pub async fn count_conversations(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM conversations
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(start.map(|d| d.naive_utc()))
        .bind(end.map(|d| d.naive_utc()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_distinct_users(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT username) FROM conversations
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(start.map(|d| d.naive_utc()))
        .bind(end.map(|d| d.naive_utc()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_messages(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(start.map(|d| d.naive_utc()))
        .bind(end.map(|d| d.naive_utc()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Message counts grouped by day within the window.
    pub async fn messages_by_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BucketCount>> {
        let rows = sqlx::query(
            r#"
            SELECT date(created_at) AS day, COUNT(*) AS n
            FROM messages
            WHERE created_at >= ?1 AND created_at <= ?2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(start.naive_utc())
        .bind(end.naive_utc())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BucketCount {
                date: row.get("day"),
                count: row.get("n"),
            })
            .collect())
    }

    /// Assistant messages per persona within the window, most used first.
    pub async fn persona_usage(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PersonaUsage>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(p.name, 'Unknown') AS name, COUNT(*) AS n
            FROM messages m
            LEFT JOIN personas p ON p.id = m.persona_id
            WHERE m.role = 'assistant'
              AND m.persona_id IS NOT NULL
              AND m.created_at >= ?1 AND m.created_at <= ?2
            GROUP BY name
            ORDER BY n DESC
            "#,
        )
        .bind(start.naive_utc())
        .bind(end.naive_utc())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PersonaUsage {
                name: row.get("name"),
                usage: row.get("n"),
            })
            .collect())
    }

    /// Conversation counts per hour bucket since `since`.
    pub async fn conversations_by_hour(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<BucketCount>> {
        let rows = sqlx::query(
            r#"
            SELECT strftime('%Y-%m-%dT%H:00', created_at) AS hour, COUNT(*) AS n
            FROM conversations
            WHERE created_at >= ?1
            GROUP BY hour
            ORDER BY hour ASC
            "#,
        )
        .bind(since.naive_utc())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BucketCount {
                date: row.get("hour"),
                count: row.get("n"),
            })
            .collect())
    }
}
