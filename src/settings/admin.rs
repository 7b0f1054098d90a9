// src/settings/admin.rs
//! Keyed admin text rows: prompt guidelines, participant-facing copy.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AdminSettingsStore {
    pub pool: SqlitePool,
}

impl AdminSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<AdminSetting>> {
        let row = sqlx::query(
            "SELECT key, value, description, updated_at FROM admin_settings WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_setting).transpose()
    }

    /// Stored value for `key`, or `default` when the row has never been
    /// written. Does not create the row.
    pub async fn value_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get(key)
            .await?
            .map(|setting| setting.value)
            .unwrap_or_else(|| default.to_string()))
    }

    /// Row for `key`, seeded with `default` on first read.
    pub async fn get_or_seed(
        &self,
        key: &str,
        default: &str,
        description: &str,
    ) -> Result<AdminSetting> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO admin_settings (key, value, description, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(key)
        .bind(default)
        .bind(description)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        self.get(key)
            .await?
            .ok_or_else(|| anyhow!("admin setting '{key}' missing after seed"))
    }

    pub async fn upsert(&self, key: &str, value: &str, description: &str) -> Result<AdminSetting> {
        sqlx::query(
            r#"
            INSERT INTO admin_settings (key, value, description, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        self.get(key)
            .await?
            .ok_or_else(|| anyhow!("admin setting '{key}' missing after upsert"))
    }
}

fn row_to_setting(row: sqlx::sqlite::SqliteRow) -> Result<AdminSetting> {
    let updated_at: NaiveDateTime = row.get("updated_at");
    Ok(AdminSetting {
        key: row.get("key"),
        value: row.get("value"),
        description: row.get("description"),
        updated_at: Utc.from_utc_datetime(&updated_at),
    })
}
